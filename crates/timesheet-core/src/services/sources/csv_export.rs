//! CSV Export Source
//!
//! Reads a worklog export (one row per logged interval) produced by the
//! time-tracking tool. The file is expected to contain a single person's
//! worklogs, so no author filtering happens here.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;

use super::WorklogSource;
use crate::error::{Error, Result};
use crate::models::{RawWorklogEntry, WorkedHours};

pub const COL_PROJECT: &str = "Project Name";
pub const COL_SUMMARY: &str = "Summary";
pub const COL_HOURS: &str = "Hr. Spent";
pub const COL_LOGGED_AT: &str = "Log Date & Time";
pub const COL_TICKET: &str = "Ticket No";

const REQUIRED_COLUMNS: [&str; 5] = [
    COL_PROJECT,
    COL_SUMMARY,
    COL_HOURS,
    COL_LOGGED_AT,
    COL_TICKET,
];

/// Date part of `Log Date & Time`, e.g. `01-Jan-2024`
const EXPORT_DATE_FORMAT: &str = "%d-%b-%Y";

/// The five columns we keep from each row
#[derive(Debug, Deserialize)]
struct ExportRow {
    #[serde(rename = "Project Name")]
    project_name: String,
    #[serde(rename = "Summary")]
    summary: String,
    #[serde(rename = "Hr. Spent")]
    hours: String,
    #[serde(rename = "Log Date & Time")]
    logged_at: String,
    #[serde(rename = "Ticket No")]
    ticket_key: String,
}

/// Worklogs exported to a CSV file
pub struct CsvExportSource {
    contents: String,
}

impl CsvExportSource {
    /// Load the export from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("[csv] reading {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Ok(Self { contents })
    }

    /// Use already-loaded CSV text
    pub fn from_text(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
        }
    }

    fn parse(&self) -> Result<Vec<RawWorklogEntry>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(self.contents.as_bytes());

        let headers = reader.headers()?.clone();
        if let Some(missing) = REQUIRED_COLUMNS
            .into_iter()
            .find(|col| !headers.iter().any(|h| h == *col))
        {
            return Err(Error::validation(format!(
                "CSV is missing required column '{}'",
                missing
            )));
        }

        let mut entries = Vec::new();
        for (idx, record) in reader.deserialize::<ExportRow>().enumerate() {
            let row_number = idx + 1;
            let row = record.map_err(|e| {
                Error::validation(format!("CSV row {} could not be read: {}", row_number, e))
            })?;
            entries.push(row_to_entry(row, row_number)?);
        }

        log::info!("[csv] parsed {} worklog row(s)", entries.len());
        Ok(entries)
    }
}

#[async_trait]
impl WorklogSource for CsvExportSource {
    fn source_name(&self) -> &'static str {
        "CSV export"
    }

    async fn normalize(&self) -> Result<Vec<RawWorklogEntry>> {
        self.parse()
    }
}

fn row_to_entry(row: ExportRow, row_number: usize) -> Result<RawWorklogEntry> {
    let day = parse_log_date(&row.logged_at).ok_or_else(|| {
        Error::validation(format!(
            "CSV row {}: invalid '{}' value '{}' (expected DD-Mon-YYYY)",
            row_number, COL_LOGGED_AT, row.logged_at
        ))
    })?;

    let hours = parse_hours(&row.hours).ok_or_else(|| {
        Error::validation(format!(
            "CSV row {}: invalid '{}' value '{}'",
            row_number, COL_HOURS, row.hours
        ))
    })?;

    Ok(RawWorklogEntry {
        project_name: row.project_name,
        ticket_key: row.ticket_key,
        summary: row.summary,
        day,
        hours,
        author: None,
    })
}

/// Parse the date part of a `DD-Mon-YYYY HH:MM` timestamp
pub fn parse_log_date(value: &str) -> Option<NaiveDate> {
    let date_part = value.split_whitespace().next()?;
    NaiveDate::parse_from_str(date_part, EXPORT_DATE_FORMAT).ok()
}

fn parse_hours(value: &str) -> Option<WorkedHours> {
    let hours: f64 = value.trim().parse().ok()?;
    hours.is_finite().then(|| WorkedHours::from_hours(hours))
}
