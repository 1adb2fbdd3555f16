//! Source Registry
//!
//! Picks the worklog source for a run: a CSV export when a file was given,
//! the Jira API otherwise.

use std::path::PathBuf;

use super::{CsvExportSource, JiraWorklogSource, WorklogSource};
use crate::error::{Error, Result};
use crate::services::jira::JiraConfig;
use crate::services::period::ReportPeriod;

/// Inputs needed to choose and build a source
#[derive(Debug, Clone)]
pub struct SourceSelection {
    /// CSV export path; takes precedence over Jira when set
    pub file: Option<PathBuf>,
    /// Jira connection, required when no file is given
    pub jira: Option<JiraConfig>,
    /// Period used by the Jira source
    pub period: ReportPeriod,
}

/// Build the source selected by the run's inputs
pub fn build_source(selection: SourceSelection) -> Result<Box<dyn WorklogSource>> {
    if let Some(path) = selection.file {
        log::info!("[sources] using CSV export {}", path.display());
        return Ok(Box::new(CsvExportSource::open(path)?));
    }

    let jira = selection.jira.ok_or_else(|| {
        Error::config("Jira is not configured; pass --file or set the JIRA_* variables")
    })?;
    log::info!(
        "[sources] using Jira at {} for {}/{}",
        jira.base_url,
        selection.period.month(),
        selection.period.year()
    );
    Ok(Box::new(JiraWorklogSource::new(&jira, selection.period)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn period() -> ReportPeriod {
        ReportPeriod::new(2024, 1).unwrap()
    }

    #[test]
    fn test_file_selects_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Project Name,Ticket No,Summary,Hr. Spent,Log Date & Time").unwrap();

        let source = build_source(SourceSelection {
            file: Some(file.path().to_path_buf()),
            jira: Some(JiraConfig::for_org("acme", "a@b.c", "t", "me")),
            period: period(),
        })
        .unwrap();
        assert_eq!(source.source_name(), "CSV export");
    }

    #[test]
    fn test_no_file_selects_jira() {
        let source = build_source(SourceSelection {
            file: None,
            jira: Some(JiraConfig::for_org("acme", "a@b.c", "t", "me")),
            period: period(),
        })
        .unwrap();
        assert_eq!(source.source_name(), "Jira");
    }

    #[test]
    fn test_missing_jira_config_is_error() {
        let result = build_source(SourceSelection {
            file: None,
            jira: None,
            period: period(),
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = build_source(SourceSelection {
            file: Some(PathBuf::from("/definitely/not/here.csv")),
            jira: None,
            period: period(),
        });
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
