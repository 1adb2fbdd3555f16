//! Unified error handling for timesheet-core

use thiserror::Error;

/// Core error type for timesheet-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Excel error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Service account token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("{service} API error {status}: {body}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for timesheet-core
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// Create an error for a non-success response from a remote API
    pub fn upstream(
        service: &'static str,
        status: reqwest::StatusCode,
        body: impl Into<String>,
    ) -> Self {
        Error::Upstream {
            service,
            status: status.as_u16(),
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("JIRA_ORG is not set");
        assert_eq!(err.to_string(), "Configuration error: JIRA_ORG is not set");
    }

    #[test]
    fn test_upstream_display() {
        let err = Error::upstream("Jira", reqwest::StatusCode::UNAUTHORIZED, "bad token");
        assert_eq!(err.to_string(), "Jira API error 401: bad token");
    }
}
