//! Services module

pub mod jira;
pub mod period;
pub mod sheets;
pub mod sources;
pub mod summary;

pub use jira::{JiraClient, JiraConfig, JiraIssue, JiraWorklog};
pub use period::{month_name, ReportPeriod};
pub use sheets::{
    publish_report, CellValue, ExcelDestination, GoogleSheetsConfig, GoogleSheetsDestination,
    PublishOutcome, SheetDestination, SheetRow,
};
pub use sources::{
    build_source, CsvExportSource, JiraWorklogSource, SourceSelection, WorklogSource,
};
pub use summary::{bucket_by_day, build_summary_rows, summarize, totals_row};
