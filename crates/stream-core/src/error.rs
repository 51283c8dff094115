use connectors::error::FetchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Index {index} is out of range (bound: {bound})")]
    OutOfRange { index: usize, bound: usize },

    #[error("Negative indexing is not supported: {0}")]
    NegativeIndex(isize),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Page fetch failure, passed through as the source reported it.
    #[error("Page fetch failed: {0}")]
    Transport(#[from] FetchError),
}

impl StreamError {
    /// Whether the index itself was unusable, past the end or below zero.
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            StreamError::OutOfRange { .. } | StreamError::NegativeIndex(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_index_counts_as_out_of_range() {
        assert!(StreamError::NegativeIndex(-1).is_out_of_range());
        assert!(StreamError::OutOfRange { index: 5, bound: 5 }.is_out_of_range());
        assert!(!StreamError::InvalidArgument("start past stop".into()).is_out_of_range());
        assert!(!StreamError::Transport(FetchError::Source("reset".into())).is_out_of_range());
    }
}
