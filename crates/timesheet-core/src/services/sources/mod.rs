//! Worklog Source Abstraction
//!
//! Every place worklogs can come from is normalized into the same flat list
//! of `RawWorklogEntry` values. The aggregation pipeline only ever sees that
//! list, never the source behind it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │ report run                                          │
//! │   let source = build_source(selection)?;            │
//! │   let entries = source.normalize().await?;          │
//! │   summarize(entries)                                │
//! └─────────────────────────────────────────────────────┘
//!          │
//!          ▼
//! ┌─────────────────────────────────────────────────────┐
//! │ trait WorklogSource                                 │
//! │   fn source_name() -> &str                          │
//! │   fn normalize() -> Vec<RawWorklogEntry>            │
//! └─────────────────────────────────────────────────────┘
//!          │
//!     ┌────┴─────┐
//!     ▼          ▼
//! ┌───────┐  ┌──────┐
//! │CSV    │  │ Jira │
//! │export │  │ API  │
//! └───────┘  └──────┘
//! ```

pub mod csv_export;
pub mod jira;
pub mod registry;

pub use csv_export::CsvExportSource;
pub use jira::JiraWorklogSource;
pub use registry::{build_source, SourceSelection};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::RawWorklogEntry;

/// Trait for worklog sources
#[async_trait]
pub trait WorklogSource: Send + Sync {
    /// Human-readable name used in logs and error messages
    fn source_name(&self) -> &'static str;

    /// Produce every entry belonging to the report
    ///
    /// Fails as a whole if any record cannot be read; a partial list would
    /// silently under-report hours.
    async fn normalize(&self) -> Result<Vec<RawWorklogEntry>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkedHours;
    use crate::services::summary::summarize;
    use chrono::NaiveDate;

    struct FixedSource(Vec<RawWorklogEntry>);

    #[async_trait]
    impl WorklogSource for FixedSource {
        fn source_name(&self) -> &'static str {
            "fixed"
        }

        async fn normalize(&self) -> Result<Vec<RawWorklogEntry>> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_pipeline_only_depends_on_trait() {
        let source: Box<dyn WorklogSource> = Box::new(FixedSource(vec![RawWorklogEntry {
            project_name: "P".to_string(),
            ticket_key: "P-1".to_string(),
            summary: "Work".to_string(),
            day: NaiveDate::from_ymd_opt(2024, 2, 12).unwrap(),
            hours: WorkedHours::from_hours(12.0),
            author: None,
        }]));

        let rows = summarize(source.normalize().await.unwrap());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].activity, "P:[P-1] Work");
        assert_eq!(rows[0].hours_fraction, 0.5);
    }
}
