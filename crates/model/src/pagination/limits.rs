use crate::error::ModelError;
use serde::{Deserialize, Serialize};

/// Largest page the server hands out per call.
pub const MAX_PAGE_SIZE: usize = 50;

/// Number of results reachable through start-index paging, no matter how
/// large the collection really is.
pub const MAX_RESULTS: usize = 1000;

/// Protocol limits a stream pages under.
///
/// These are protocol constants, not tunables: override them only when the
/// remote API contract changes (or in tests with small fixtures).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamLimits {
    page_size: usize,
    max_results: usize,
}

impl StreamLimits {
    pub fn new(page_size: usize, max_results: usize) -> Result<Self, ModelError> {
        if page_size == 0 {
            return Err(ModelError::InvalidLimits(
                "page size must be at least 1".into(),
            ));
        }
        if max_results < page_size {
            return Err(ModelError::InvalidLimits(format!(
                "result ceiling {max_results} is smaller than page size {page_size}"
            )));
        }
        Ok(StreamLimits {
            page_size,
            max_results,
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }
}

impl Default for StreamLimits {
    fn default() -> Self {
        StreamLimits {
            page_size: MAX_PAGE_SIZE,
            max_results: MAX_RESULTS,
        }
    }
}
