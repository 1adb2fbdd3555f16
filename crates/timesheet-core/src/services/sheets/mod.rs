//! Spreadsheet destinations
//!
//! A destination only needs to report where the next row goes and to
//! append rows. `publish_report` uses both to place the data rows and a
//! totals row whose formula points at them.

pub mod excel;
pub mod google;

pub use excel::ExcelDestination;
pub use google::{GoogleSheetsConfig, GoogleSheetsDestination};

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{SummaryRow, TotalsRow};
use crate::services::summary::totals_row;

/// Column titles of the destination sheet
pub const HEADER: [&str; 3] = ["Dia", "Atividade", "Horas trabalhadas"];

/// A single cell to write
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    /// Formula evaluated by the spreadsheet, e.g. `=SUM(C2:C9)`
    Formula(String),
}

/// One row of cells, in `HEADER` column order
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub cells: Vec<CellValue>,
}

impl From<&SummaryRow> for SheetRow {
    fn from(row: &SummaryRow) -> Self {
        Self {
            cells: vec![
                CellValue::Text(row.day.clone()),
                CellValue::Text(row.activity.clone()),
                CellValue::Number(row.hours_fraction),
            ],
        }
    }
}

impl From<&TotalsRow> for SheetRow {
    fn from(row: &TotalsRow) -> Self {
        Self {
            cells: vec![
                CellValue::Text(row.label.clone()),
                CellValue::Text(row.activity.clone()),
                CellValue::Formula(row.formula.clone()),
            ],
        }
    }
}

/// Append-only spreadsheet target
#[async_trait]
pub trait SheetDestination: Send + Sync {
    /// Human-readable name used in logs and error messages
    fn destination_name(&self) -> &'static str;

    /// 1-based row number the next appended row will land on
    async fn next_writable_row(&self) -> Result<u32>;

    /// Append rows after the last used row
    async fn append_rows(&self, rows: &[SheetRow]) -> Result<()>;
}

/// Where a published report ended up
#[derive(Debug, Clone, PartialEq)]
pub struct PublishOutcome {
    pub first_row: u32,
    pub last_row: u32,
    pub totals: TotalsRow,
}

/// Append the summary rows followed by a totals row
///
/// Nothing is written for an empty report.
pub async fn publish_report(
    destination: &dyn SheetDestination,
    rows: &[SummaryRow],
) -> Result<Option<PublishOutcome>> {
    if rows.is_empty() {
        log::info!(
            "[sheets] no rows to write to {}",
            destination.destination_name()
        );
        return Ok(None);
    }

    let first_row = destination.next_writable_row().await?;
    let totals = totals_row(rows, first_row).ok_or_else(|| {
        Error::validation(format!(
            "Cannot build totals row: '{}' is not a DD/MM/YYYY date",
            rows[0].day
        ))
    })?;

    let mut sheet_rows: Vec<SheetRow> = rows.iter().map(SheetRow::from).collect();
    sheet_rows.push(SheetRow::from(&totals));

    destination.append_rows(&sheet_rows).await?;

    let last_row = first_row + rows.len() as u32 - 1;
    log::info!(
        "[sheets] wrote rows {}-{} and totals to {}",
        first_row,
        last_row,
        destination.destination_name()
    );

    Ok(Some(PublishOutcome {
        first_row,
        last_row,
        totals,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Destination that records appended rows
    struct MockDestination {
        next_row: u32,
        appended: Arc<Mutex<Vec<SheetRow>>>,
    }

    impl MockDestination {
        fn new(next_row: u32) -> Self {
            Self {
                next_row,
                appended: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl SheetDestination for MockDestination {
        fn destination_name(&self) -> &'static str {
            "mock"
        }

        async fn next_writable_row(&self) -> Result<u32> {
            Ok(self.next_row)
        }

        async fn append_rows(&self, rows: &[SheetRow]) -> Result<()> {
            self.appended.lock().unwrap().extend_from_slice(rows);
            Ok(())
        }
    }

    fn row(day: &str, activity: &str, hours: f64) -> SummaryRow {
        SummaryRow {
            day: day.to_string(),
            activity: activity.to_string(),
            hours_fraction: hours / 24.0,
        }
    }

    #[tokio::test]
    async fn test_publish_appends_rows_and_totals() {
        let destination = MockDestination::new(41);
        let appended = destination.appended.clone();
        let rows = vec![
            row("02/02/2024", "A:[1] x", 8.0),
            row("05/02/2024", "A:[1] x\nB:[2] y", 6.0),
        ];

        let outcome = publish_report(&destination, &rows).await.unwrap().unwrap();

        assert_eq!(outcome.first_row, 41);
        assert_eq!(outcome.last_row, 42);
        assert_eq!(outcome.totals.formula, "=SUM(C41:C42)");

        let appended = appended.lock().unwrap();
        assert_eq!(appended.len(), 3);
        assert_eq!(appended[0].cells[0], CellValue::Text("02/02/2024".to_string()));
        assert_eq!(appended[1].cells[2], CellValue::Number(0.25));
        assert_eq!(
            appended[2].cells,
            vec![
                CellValue::Text("Total Fevereiro:".to_string()),
                CellValue::Text(String::new()),
                CellValue::Formula("=SUM(C41:C42)".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_publish_empty_report_writes_nothing() {
        let destination = MockDestination::new(2);
        let appended = destination.appended.clone();

        let outcome = publish_report(&destination, &[]).await.unwrap();

        assert!(outcome.is_none());
        assert!(appended.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_rejects_rows_without_month() {
        let destination = MockDestination::new(2);
        let appended = destination.appended.clone();

        let err = publish_report(&destination, &[row("sometime", "A:[1] x", 1.0)])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert!(appended.lock().unwrap().is_empty());
    }

    #[test]
    fn test_cell_values_serialize_plain() {
        let cells = vec![
            CellValue::Text("01/01/2024".to_string()),
            CellValue::Number(0.5),
            CellValue::Formula("=SUM(C2:C3)".to_string()),
        ];
        let json = serde_json::to_string(&cells).unwrap();
        assert_eq!(json, r#"["01/01/2024",0.5,"=SUM(C2:C3)"]"#);
    }
}
