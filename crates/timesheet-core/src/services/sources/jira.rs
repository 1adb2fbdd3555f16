//! Jira Worklog Source
//!
//! Pulls one author's worklogs for the report period from Jira Cloud.
//!
//! The search endpoint embeds only a page of worklogs per issue. Issues whose
//! embedded list is truncated get their worklogs re-fetched individually,
//! bounded to the period window. Everything is then filtered again by
//! author and period, since neither response is bounded exactly.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use futures::stream::{self, StreamExt, TryStreamExt};

use super::WorklogSource;
use crate::error::{Error, Result};
use crate::models::{RawWorklogEntry, WorkedHours};
use crate::services::jira::{JiraClient, JiraConfig, JiraIssue, JiraWorklog};
use crate::services::period::ReportPeriod;

const SEARCH_FIELDS: [&str; 3] = ["summary", "worklog", "project"];

/// Overflow fetches allowed in flight at once
const MAX_CONCURRENT_FETCHES: usize = 4;

/// Format of `started` in Jira worklogs, e.g. `2024-01-15T10:00:00.000+0000`
const STARTED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Worklogs of one issue, whichever endpoint they came from
struct IssueWorklogs {
    project: String,
    key: String,
    summary: String,
    worklogs: Vec<JiraWorklog>,
}

impl IssueWorklogs {
    fn inline(issue: JiraIssue) -> Self {
        let project = issue.project_name().to_string();
        let summary = issue.summary().to_string();
        Self {
            project,
            key: issue.key,
            summary,
            worklogs: issue.fields.worklog.map(|w| w.worklogs).unwrap_or_default(),
        }
    }
}

/// Jira Cloud data source
pub struct JiraWorklogSource {
    client: JiraClient,
    account_id: String,
    period: ReportPeriod,
}

impl JiraWorklogSource {
    pub fn new(config: &JiraConfig, period: ReportPeriod) -> Result<Self> {
        Ok(Self {
            client: JiraClient::new(config)?,
            account_id: config.account_id.clone(),
            period,
        })
    }

    /// JQL selecting issues with worklogs by the account inside the period
    pub fn build_jql(&self) -> String {
        format!(
            "(worklogAuthor in (\"{}\")) AND (worklogDate >= \"{}\" and worklogDate <= \"{}\")",
            self.account_id,
            self.period.first_day().format("%Y-%m-%d"),
            self.period.last_day().format("%Y-%m-%d"),
        )
    }

    async fn fetch_overflow(&self, issues: Vec<JiraIssue>) -> Result<Vec<IssueWorklogs>> {
        let started_after = self.period.started_after_millis()?;
        let started_before = self.period.started_before_millis()?;

        stream::iter(issues)
            .map(|issue| async move {
                log::debug!("[jira] re-fetching worklogs of {}", issue.key);
                let worklogs = self
                    .client
                    .get_issue_worklogs(&issue.key, started_after, started_before)
                    .await?;
                Ok::<_, Error>(IssueWorklogs {
                    project: issue.project_name().to_string(),
                    summary: issue.summary().to_string(),
                    key: issue.key,
                    worklogs,
                })
            })
            .buffered(MAX_CONCURRENT_FETCHES)
            .try_collect()
            .await
    }

    fn to_entries(&self, issues: Vec<IssueWorklogs>) -> Result<Vec<RawWorklogEntry>> {
        let mut entries = Vec::new();
        let mut skipped = 0usize;

        for issue in issues {
            for worklog in issue.worklogs {
                if worklog.author_account_id() != Some(self.account_id.as_str()) {
                    skipped += 1;
                    continue;
                }

                let day = started_local_date(&worklog.started)?;
                if !self.period.contains(day) {
                    skipped += 1;
                    continue;
                }

                entries.push(RawWorklogEntry {
                    project_name: issue.project.clone(),
                    ticket_key: issue.key.clone(),
                    summary: issue.summary.clone(),
                    day,
                    hours: WorkedHours::from_seconds(worklog.time_spent_seconds),
                    author: Some(self.account_id.clone()),
                });
            }
        }

        log::info!(
            "[jira] {} worklog(s) in {}/{}, {} filtered out",
            entries.len(),
            self.period.month(),
            self.period.year(),
            skipped
        );
        Ok(entries)
    }
}

#[async_trait]
impl WorklogSource for JiraWorklogSource {
    fn source_name(&self) -> &'static str {
        "Jira"
    }

    async fn normalize(&self) -> Result<Vec<RawWorklogEntry>> {
        let jql = self.build_jql();
        log::debug!("[jira] searching: {}", jql);

        let issues = self.client.search_issues(&jql, &SEARCH_FIELDS).await?;
        let (overflowing, complete): (Vec<_>, Vec<_>) =
            issues.into_iter().partition(JiraIssue::has_worklog_overflow);

        log::info!(
            "[jira] {} issue(s), {} with truncated worklogs",
            overflowing.len() + complete.len(),
            overflowing.len()
        );

        let mut all = self.fetch_overflow(overflowing).await?;
        all.extend(complete.into_iter().map(IssueWorklogs::inline));

        self.to_entries(all)
    }
}

/// Calendar date of a worklog start, in the local timezone
pub fn started_local_date(started: &str) -> Result<NaiveDate> {
    parse_started(started)
        .map(|dt| dt.with_timezone(&Local).date_naive())
        .ok_or_else(|| Error::validation(format!("Invalid worklog start time '{}'", started)))
}

fn parse_started(started: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(started, STARTED_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(started))
        .ok()
}
