use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors raised by the matching engine and the service clients.
///
/// Only the synchronizer decides what a failure means for the whole run:
/// `QuotaExceeded` degrades it, `Transient` and `Rejected` skip a single
/// track or video, and `Fatal` aborts. `RateLimited` never leaves the search client; it is
/// turned into `QuotaExceeded` once retries are exhausted.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Destination quota exhausted after {attempts} attempts")]
    QuotaExceeded { attempts: u32 },

    #[error("Rate limited by destination service")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Transient error: {0}")]
    Transient(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Fatal error: {0}")]
    Fatal(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SyncError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::Fatal(_))
    }

    /// Classifies a non-success HTTP status.
    ///
    /// `reason` is the first error reason reported in the response body, if
    /// any. YouTube signals quota problems with 403 and a reason such as
    /// `quotaExceeded`, so a 403 is only fatal when the reason says otherwise.
    pub fn from_status(status: StatusCode, reason: Option<&str>, retry_after: Option<Duration>) -> Self {
        match status {
            StatusCode::TOO_MANY_REQUESTS => SyncError::RateLimited { retry_after },
            StatusCode::FORBIDDEN if reason.is_some_and(is_quota_reason) => {
                SyncError::RateLimited { retry_after }
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SyncError::Fatal(format!(
                "{} ({}). Run spytcli auth again.",
                status,
                reason.unwrap_or("no reason given")
            )),
            StatusCode::CONFLICT | StatusCode::REQUEST_TIMEOUT => {
                SyncError::Transient(status.to_string())
            }
            s if s.is_server_error() => SyncError::Transient(s.to_string()),
            s if s.is_client_error() => SyncError::Rejected(match reason {
                Some(reason) => format!("{} ({})", s, reason),
                None => s.to_string(),
            }),
            s => SyncError::Fatal(format!("Unexpected response {}", s)),
        }
    }
}

/// A failed `PlaylistWriter::insert_tracks` call.
///
/// The first `inserted` ids of the batch were added before `error` occurred.
#[derive(Debug, Error)]
#[error("{error} (after {inserted} insertions)")]
pub struct InsertFailure {
    pub inserted: usize,
    pub error: SyncError,
}

impl From<SyncError> for InsertFailure {
    fn from(error: SyncError) -> Self {
        InsertFailure { inserted: 0, error }
    }
}

fn is_quota_reason(reason: &str) -> bool {
    matches!(
        reason,
        "quotaExceeded" | "rateLimitExceeded" | "userRateLimitExceeded" | "dailyLimitExceeded"
    )
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return SyncError::from_status(status, None, None);
        }
        if err.is_builder() {
            return SyncError::Fatal(err.to_string());
        }
        SyncError::Transient(err.to_string())
    }
}
