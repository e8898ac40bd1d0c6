use reqwest::StatusCode;
use thiserror::Error;

use crate::console;

/// Why a single check failed. Errors never cross a check boundary: the probe
/// runners turn them into a failed outcome and move on.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("cannot connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("failed to build URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("unexpected status {status}")]
    UnexpectedStatus { status: StatusCode, body: String },
    #[error("failed to decode response: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },
    #[error("no authentication token available")]
    MissingToken,
    #[error("created record has no id")]
    MissingRecordId,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("user {email} not found")]
    UserNotFound { email: String },
    #[error("unexpected row found for {email}")]
    UnexpectedRow { email: String },
    #[error("health_records row count changed from {before} to {after}")]
    RowCountChanged { before: i64, after: i64 },
}

impl ProbeError {
    /// Response body received alongside the failure, if there was one.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            ProbeError::UnexpectedStatus { body, .. } | ProbeError::Decode { body, .. } => {
                Some(body.as_str())
            }
            _ => None,
        }
    }

    pub fn is_connect(&self) -> bool {
        matches!(self, ProbeError::Connect { .. } | ProbeError::Timeout { .. })
    }
}

/// Reports a failed check on the console and collapses the result to an
/// `Option`.
pub fn settle<T>(label: &str, result: Result<T, ProbeError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(check = label, err = format!("{:?}", e), "check failed");
            console::fail(format!("{}: {}", label, e));
            if let Some(body) = e.response_body() {
                console::note(format!("Response: {}", body));
            }
            None
        }
    }
}
