use model::error::ModelError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Non-success response from the feed server.
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    #[error("Feed not found: {url}")]
    NotFound { url: String },

    /// The server refused access (private or restricted resource).
    #[error("Access to {url} is forbidden")]
    Forbidden { url: String },

    /// HTTP 429, with the pause the server asked for when it named one.
    #[error("Rate limited by the feed server (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: Option<Duration> },

    #[error("Failed to decode page: {0}")]
    Decode(#[from] DecodeError),

    #[error("Invalid feed locator: {0}")]
    InvalidLocator(String),

    #[error("Giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: usize,
        last: Box<FetchError>,
    },

    /// Failure reported by a custom source.
    #[error("Source error: {0}")]
    Source(String),
}

impl FetchError {
    /// Whether repeating the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Network(_) | FetchError::Timeout { .. } => true,
            FetchError::RateLimited { .. } => true,
            FetchError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Pause the server asked for before the next attempt.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            FetchError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout { timeout: None }
        } else {
            FetchError::Network(err)
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Feed API version mismatch: expected {expected}, got {found}")]
    VersionMismatch { expected: String, found: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl DecodeError {
    pub fn missing(field: impl Into<String>) -> Self {
        DecodeError::MissingField(field.into())
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        DecodeError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
