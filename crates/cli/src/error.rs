use connectors::error::FetchError;
use stream_core::StreamError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid feed selection: {0}")]
    InvalidFeed(String),

    #[error("Invalid query parameter '{0}' (expected KEY=VALUE)")]
    InvalidQuery(String),

    #[error("Failed to set up the feed source: {0}")]
    Source(#[from] FetchError),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
