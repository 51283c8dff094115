use crate::{
    core::identifiers::Locator,
    feeds::info::FeedInfo,
    pagination::query::QueryParams,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 1-based index of the first result on the requested page.
pub const START_INDEX_PARAM: &str = "start-index";

/// Number of results requested for the page.
pub const MAX_RESULTS_PARAM: &str = "max-results";

/// A single page request handed to a feed source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub locator: Locator,
    /// Base parameters of the feed (search terms, filters, ...).
    pub query: QueryParams,
    /// Server-side, 1-based position of the first record.
    pub start_index: usize,
    pub max_results: usize,
    /// Caller-supplied timeout, forwarded untouched to the transport.
    pub timeout: Option<Duration>,
}

impl PageRequest {
    /// Builds a request from a 0-based collection offset.
    pub fn at_offset(locator: Locator, query: QueryParams, offset: usize, size: usize) -> Self {
        PageRequest {
            locator,
            query,
            start_index: offset + 1,
            max_results: size,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// 0-based offset of the first requested record.
    pub fn offset(&self) -> usize {
        self.start_index.saturating_sub(1)
    }

    /// Full parameter set for the wire: base parameters plus paging.
    pub fn query_pairs(&self) -> QueryParams {
        self.query
            .clone()
            .with(START_INDEX_PARAM, self.start_index)
            .with(MAX_RESULTS_PARAM, self.max_results)
    }
}

/// One decoded page of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse<R> {
    pub records: Vec<R>,
    /// Total size of the collection, when the server reports it.
    pub total_count: Option<usize>,
    /// Feed-level metadata carried by the page envelope.
    pub info: Option<FeedInfo>,
}

impl<R> PageResponse<R> {
    pub fn new(records: Vec<R>) -> Self {
        PageResponse {
            records,
            total_count: None,
            info: None,
        }
    }

    pub fn with_total_count(mut self, total: Option<usize>) -> Self {
        self.total_count = total;
        self
    }

    pub fn with_info(mut self, info: FeedInfo) -> Self {
        self.info = Some(info);
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A page shorter than requested means the collection ran out.
    pub fn is_short(&self, requested: usize) -> bool {
        self.records.len() < requested
    }

    pub fn map<T, F: FnMut(R) -> T>(self, f: F) -> PageResponse<T> {
        PageResponse {
            records: self.records.into_iter().map(f).collect(),
            total_count: self.total_count,
            info: self.info,
        }
    }
}
