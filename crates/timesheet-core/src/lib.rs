//! # timesheet-core
//!
//! Core logic for the monthly timesheet report - shared by the CLI.
//!
//! This crate provides:
//! - Data models (`models` module)
//! - Worklog sources, aggregation and spreadsheet output (`services` module)
//! - Unified error handling (`error` module)

pub mod error;
pub mod models;
pub mod services;

pub use error::{Error, Result};

// Re-export commonly used types from models
pub use models::{DayBucket, RawWorklogEntry, SummaryRow, TaskIdentity, TotalsRow, WorkedHours};

// Re-export commonly used types from services
pub use services::{
    build_source, publish_report, summarize, totals_row, ExcelDestination, GoogleSheetsConfig,
    GoogleSheetsDestination, JiraConfig, PublishOutcome, ReportPeriod, SheetDestination,
    SourceSelection, WorklogSource,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the library version
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_version_format() {
        let parts: Vec<&str> = version().split('.').collect();
        assert_eq!(parts.len(), 3, "Version should be in x.y.z format");
    }
}
