use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// Page size or result ceiling outside what the protocol allows.
    #[error("Invalid stream limits: {0}")]
    InvalidLimits(String),

    #[error("Invalid feed timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },
}
