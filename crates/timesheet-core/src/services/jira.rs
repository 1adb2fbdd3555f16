//! Jira REST API client
//!
//! Read-only client for the two endpoints the tracker source needs:
//! issue search with embedded worklogs, and the per-issue worklog list
//! used when the embedded list was truncated.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::{header, Client, Response};
use serde::{de::DeserializeOwned, Deserialize};

use crate::error::{Error, Result};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Issues requested per search page
const SEARCH_PAGE_SIZE: u32 = 100;

/// Cap for the per-issue worklog endpoint
pub const WORKLOG_MAX_RESULTS: u32 = 5000;

/// Connection settings for Jira Cloud
#[derive(Debug, Clone)]
pub struct JiraConfig {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    /// Account whose worklogs are reported
    pub account_id: String,
}

impl JiraConfig {
    pub fn new(base_url: &str, email: &str, api_token: &str, account_id: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            email: email.to_string(),
            api_token: api_token.to_string(),
            account_id: account_id.to_string(),
        }
    }

    /// Config for an Atlassian Cloud organization (`https://<org>.atlassian.net`)
    pub fn for_org(org: &str, email: &str, api_token: &str, account_id: &str) -> Self {
        Self::new(
            &format!("https://{}.atlassian.net", org),
            email,
            api_token,
            account_id,
        )
    }
}

/// Search results page
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub start_at: u32,
    #[serde(default)]
    pub max_results: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub issues: Vec<JiraIssue>,
}

/// Jira issue with the fields requested by the search
#[derive(Debug, Clone, Deserialize)]
pub struct JiraIssue {
    #[serde(default)]
    pub id: String,
    pub key: String,
    pub fields: JiraIssueFields,
}

impl JiraIssue {
    pub fn project_name(&self) -> &str {
        self.fields.project.as_ref().map(|p| p.name.as_str()).unwrap_or_default()
    }

    pub fn summary(&self) -> &str {
        self.fields.summary.as_deref().unwrap_or_default()
    }

    /// Whether the embedded worklog list is truncated
    pub fn has_worklog_overflow(&self) -> bool {
        self.fields
            .worklog
            .as_ref()
            .map(|w| w.total > w.max_results)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JiraIssueFields {
    pub summary: Option<String>,
    pub project: Option<JiraProject>,
    pub worklog: Option<WorklogPage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JiraProject {
    pub name: String,
}

/// A (possibly partial) list of worklogs
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklogPage {
    #[serde(default)]
    pub start_at: u32,
    #[serde(default)]
    pub max_results: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub worklogs: Vec<JiraWorklog>,
}

/// A single worklog as returned by Jira
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraWorklog {
    pub id: Option<String>,
    pub author: Option<JiraUser>,
    /// e.g. `2024-01-15T10:00:00.000+0000`
    pub started: String,
    #[serde(default)]
    pub time_spent_seconds: i64,
}

impl JiraWorklog {
    pub fn author_account_id(&self) -> Option<&str> {
        self.author.as_ref()?.account_id.as_deref()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraUser {
    pub account_id: Option<String>,
    pub display_name: Option<String>,
}

/// Jira REST API client
#[derive(Clone)]
pub struct JiraClient {
    base_url: String,
    client: Client,
}

impl JiraClient {
    /// Create a client authenticated with HTTP Basic (email + API token)
    pub fn new(config: &JiraConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let credentials = format!("{}:{}", config.email, config.api_token);
        let encoded = BASE64.encode(credentials.as_bytes());
        let auth_value = header::HeaderValue::from_str(&format!("Basic {}", encoded))
            .map_err(|e| Error::config(format!("Invalid Jira credentials: {}", e)))?;
        headers.insert(header::AUTHORIZATION, auth_value);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self { base_url, client })
    }

    /// Run a JQL search, following pagination until every issue is read
    pub async fn search_issues(&self, jql: &str, fields: &[&str]) -> Result<Vec<JiraIssue>> {
        let url = format!("{}/rest/api/2/search", self.base_url);
        let fields = fields.join(",");
        let mut issues = Vec::new();
        let mut start_at: u32 = 0;

        let page_size = SEARCH_PAGE_SIZE.to_string();

        loop {
            let offset = start_at.to_string();
            let response = self
                .client
                .get(&url)
                .query(&[
                    ("jql", jql),
                    ("fields", fields.as_str()),
                    ("startAt", offset.as_str()),
                    ("maxResults", page_size.as_str()),
                ])
                .send()
                .await?;

            let page: SearchResponse = parse_json(response).await?;
            let received = page.issues.len() as u32;
            issues.extend(page.issues);

            log::debug!(
                "[jira] search page at {}: {} issue(s), total {}",
                start_at,
                received,
                page.total
            );

            start_at += received;
            if received == 0 || start_at >= page.total {
                break;
            }
        }

        Ok(issues)
    }

    /// Fetch worklogs of one issue started inside `[started_after, started_before)`
    pub async fn get_issue_worklogs(
        &self,
        issue_key: &str,
        started_after_millis: i64,
        started_before_millis: i64,
    ) -> Result<Vec<JiraWorklog>> {
        let url = format!("{}/rest/api/2/issue/{}/worklog", self.base_url, issue_key);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("startAt", "0".to_string()),
                ("maxResults", WORKLOG_MAX_RESULTS.to_string()),
                ("startedAfter", started_after_millis.to_string()),
                ("startedBefore", started_before_millis.to_string()),
            ])
            .send()
            .await?;

        let page: WorklogPage = parse_json(response).await?;
        Ok(page.worklogs)
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(Error::upstream("Jira", status, text));
    }
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn config(base_url: &str) -> JiraConfig {
        JiraConfig {
            base_url: base_url.to_string(),
            email: "dev@example.com".to_string(),
            api_token: "secret".to_string(),
            account_id: "acc-1".to_string(),
        }
    }

    #[test]
    fn test_for_org_builds_cloud_url() {
        let cfg = JiraConfig::for_org("acme", "a@b.c", "t", "id");
        assert_eq!(cfg.base_url, "https://acme.atlassian.net");
    }

    #[test]
    fn test_overflow_detection() {
        let issue: JiraIssue = serde_json::from_value(serde_json::json!({
            "id": "10001",
            "key": "ABC-1",
            "fields": {
                "summary": "Big one",
                "project": { "name": "Alpha" },
                "worklog": { "startAt": 0, "maxResults": 20, "total": 45, "worklogs": [] }
            }
        }))
        .unwrap();
        assert!(issue.has_worklog_overflow());
        assert_eq!(issue.project_name(), "Alpha");
        assert_eq!(issue.summary(), "Big one");
    }

    #[tokio::test]
    async fn test_search_sends_basic_auth_and_paginates() {
        let mut server = mockito::Server::new_async().await;
        let expected_auth = format!("Basic {}", BASE64.encode("dev@example.com:secret"));

        let first = server
            .mock("GET", "/rest/api/2/search")
            .match_header("authorization", expected_auth.as_str())
            .match_query(Matcher::UrlEncoded("startAt".into(), "0".into()))
            .with_status(200)
            .with_body(
                r#"{"startAt":0,"maxResults":1,"total":2,"issues":[
                    {"id":"1","key":"ABC-1","fields":{"summary":"one"}}]}"#,
            )
            .create_async()
            .await;
        let second = server
            .mock("GET", "/rest/api/2/search")
            .match_query(Matcher::UrlEncoded("startAt".into(), "1".into()))
            .with_status(200)
            .with_body(
                r#"{"startAt":1,"maxResults":1,"total":2,"issues":[
                    {"id":"2","key":"ABC-2","fields":{"summary":"two"}}]}"#,
            )
            .create_async()
            .await;

        let client = JiraClient::new(&config(&server.url())).unwrap();
        let issues = client.search_issues("project = ABC", &["summary"]).await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        let keys: Vec<_> = issues.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["ABC-1", "ABC-2"]);
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/api/2/search")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("Unauthorized")
            .create_async()
            .await;

        let client = JiraClient::new(&config(&server.url())).unwrap();
        let err = client.search_issues("x", &["summary"]).await.unwrap_err();
        assert!(matches!(err, Error::Upstream { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_issue_worklogs_window() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/2/issue/ABC-7/worklog")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("maxResults".into(), "5000".into()),
                Matcher::UrlEncoded("startedAfter".into(), "1000".into()),
                Matcher::UrlEncoded("startedBefore".into(), "2000".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"startAt":0,"maxResults":5000,"total":1,"worklogs":[
                    {"id":"9","author":{"accountId":"acc-1","displayName":"Dev"},
                     "started":"2024-01-15T10:00:00.000+0000","timeSpentSeconds":3600}]}"#,
            )
            .create_async()
            .await;

        let client = JiraClient::new(&config(&server.url())).unwrap();
        let worklogs = client.get_issue_worklogs("ABC-7", 1000, 2000).await.unwrap();

        mock.assert_async().await;
        assert_eq!(worklogs.len(), 1);
        assert_eq!(worklogs[0].author_account_id(), Some("acc-1"));
        assert_eq!(worklogs[0].time_spent_seconds, 3600);
    }
}
