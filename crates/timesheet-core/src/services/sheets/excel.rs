//! Excel destination
//!
//! Writes the report to a fresh `.xlsx` workbook instead of a shared sheet.

use async_trait::async_trait;
use rust_xlsxwriter::{Format, FormatAlign, Workbook};
use std::path::{Path, PathBuf};

use super::{CellValue, SheetDestination, SheetRow, HEADER};
use crate::error::Result;

/// Hours are day fractions; this shows them as elapsed hours
const DURATION_FORMAT: &str = "[h]:mm";

/// Local workbook target
pub struct ExcelDestination {
    path: PathBuf,
    sheet_name: String,
}

impl ExcelDestination {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheet_name: "Worklogs".to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_workbook(&self, rows: &[SheetRow]) -> Result<()> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold().set_align(FormatAlign::Center);
        let text_format = Format::new().set_text_wrap().set_align(FormatAlign::Top);
        let duration_format = Format::new()
            .set_num_format(DURATION_FORMAT)
            .set_align(FormatAlign::Top);

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.sheet_name)?;

        for (col, title) in HEADER.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *title, &header_format)?;
        }

        for (idx, row) in rows.iter().enumerate() {
            let row_idx = 1 + idx as u32;
            for (col, cell) in row.cells.iter().enumerate() {
                let col = col as u16;
                match cell {
                    CellValue::Text(text) => {
                        worksheet.write_string_with_format(row_idx, col, text, &text_format)?;
                    }
                    CellValue::Number(value) => {
                        worksheet.write_number_with_format(row_idx, col, *value, &duration_format)?;
                    }
                    CellValue::Formula(formula) => {
                        worksheet.write_formula_with_format(
                            row_idx,
                            col,
                            formula.as_str(),
                            &duration_format,
                        )?;
                    }
                }
            }
        }

        worksheet.set_column_width(0, 16)?;
        worksheet.set_column_width(1, 60)?;
        worksheet.set_column_width(2, 18)?;

        workbook.save(&self.path)?;
        Ok(())
    }
}

#[async_trait]
impl SheetDestination for ExcelDestination {
    fn destination_name(&self) -> &'static str {
        "Excel workbook"
    }

    /// The workbook is always new, so data starts right below the header
    async fn next_writable_row(&self) -> Result<u32> {
        Ok(2)
    }

    async fn append_rows(&self, rows: &[SheetRow]) -> Result<()> {
        log::debug!("[excel] writing {} row(s) to {}", rows.len(), self.path.display());
        self.write_workbook(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SummaryRow;
    use crate::services::sheets::publish_report;

    #[tokio::test]
    async fn test_publish_to_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        let destination = ExcelDestination::new(&path);
        let rows = vec![SummaryRow {
            day: "10/06/2024".to_string(),
            activity: "A:[1] x\nB:[2] y".to_string(),
            hours_fraction: 0.3125,
        }];

        let outcome = publish_report(&destination, &rows).await.unwrap().unwrap();

        assert_eq!(outcome.first_row, 2);
        assert_eq!(outcome.totals.label, "Total Junho:");
        assert_eq!(outcome.totals.formula, "=SUM(C2:C2)");
        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
    }

    #[tokio::test]
    async fn test_next_row_is_below_header() {
        let destination = ExcelDestination::new("unused.xlsx");
        assert_eq!(destination.next_writable_row().await.unwrap(), 2);
        assert_eq!(destination.path(), Path::new("unused.xlsx"));
    }
}
