//! Connection settings
//!
//! Every setting can come from a flag or its environment variable. Nothing
//! is required up front; each path checks only what it uses.

use anyhow::{bail, Result};
use clap::Args;
use timesheet_core::{GoogleSheetsConfig, JiraConfig};

#[derive(Args, Debug, Clone, Default)]
pub struct JiraArgs {
    /// Jira Cloud organization, as in <org>.atlassian.net
    #[arg(long = "jira-org", env = "JIRA_ORG")]
    pub org: Option<String>,

    /// Full Jira base URL, overrides --jira-org
    #[arg(long = "jira-base-url", env = "JIRA_BASE_URL")]
    pub base_url: Option<String>,

    /// Account email used for API authentication
    #[arg(long = "jira-email", env = "JIRA_EMAIL")]
    pub email: Option<String>,

    /// Jira API token
    #[arg(long = "jira-token", env = "JIRA_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Account id whose worklogs are reported
    #[arg(long = "jira-account-id", env = "JIRA_ACCOUNT_ID")]
    pub account_id: Option<String>,
}

impl JiraArgs {
    fn is_empty(&self) -> bool {
        self.org.is_none()
            && self.base_url.is_none()
            && self.email.is_none()
            && self.token.is_none()
            && self.account_id.is_none()
    }

    /// Jira config, `None` when no Jira setting is present at all
    pub fn to_config(&self) -> Result<Option<JiraConfig>> {
        if self.is_empty() {
            return Ok(None);
        }

        match (
            (&self.base_url, &self.org),
            &self.email,
            &self.token,
            &self.account_id,
        ) {
            ((Some(base_url), _), Some(email), Some(token), Some(account_id)) => {
                Ok(Some(JiraConfig::new(base_url, email, token, account_id)))
            }
            ((None, Some(org)), Some(email), Some(token), Some(account_id)) => {
                Ok(Some(JiraConfig::for_org(org, email, token, account_id)))
            }
            ((base_url, org), email, token, account_id) => bail!(
                "Incomplete Jira settings, missing: {}",
                missing(&[
                    ("JIRA_ORG or JIRA_BASE_URL", base_url.is_some() || org.is_some()),
                    ("JIRA_EMAIL", email.is_some()),
                    ("JIRA_TOKEN", token.is_some()),
                    ("JIRA_ACCOUNT_ID", account_id.is_some()),
                ])
            ),
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct GoogleArgs {
    /// Service account email
    #[arg(long = "google-service-account-email", env = "GOOGLE_SERVICE_ACCOUNT_EMAIL")]
    pub service_account_email: Option<String>,

    /// Service account private key (PEM, literal \n accepted)
    #[arg(long = "google-private-key", env = "GOOGLE_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Spreadsheet id from the document URL
    #[arg(long = "google-spreadsheet-id", env = "GOOGLE_SPREADSHEET_ID")]
    pub spreadsheet_id: Option<String>,

    /// Numeric id (gid) of the target tab
    #[arg(long = "google-sheet-id", env = "GOOGLE_SHEET_ID")]
    pub sheet_id: Option<i64>,
}

impl GoogleArgs {
    pub fn to_config(&self) -> Result<GoogleSheetsConfig> {
        match (
            &self.service_account_email,
            &self.private_key,
            &self.spreadsheet_id,
            self.sheet_id,
        ) {
            (Some(email), Some(key), Some(spreadsheet_id), Some(sheet_id)) => {
                Ok(GoogleSheetsConfig {
                    service_account_email: email.clone(),
                    private_key: key.clone(),
                    spreadsheet_id: spreadsheet_id.clone(),
                    sheet_id,
                })
            }
            (email, key, spreadsheet_id, sheet_id) => bail!(
                "Google Sheets is not configured, missing: {}",
                missing(&[
                    ("GOOGLE_SERVICE_ACCOUNT_EMAIL", email.is_some()),
                    ("GOOGLE_PRIVATE_KEY", key.is_some()),
                    ("GOOGLE_SPREADSHEET_ID", spreadsheet_id.is_some()),
                    ("GOOGLE_SHEET_ID", sheet_id.is_some()),
                ])
            ),
        }
    }
}

fn missing(settings: &[(&str, bool)]) -> String {
    settings
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}
