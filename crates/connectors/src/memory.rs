use crate::{error::FetchError, source::FeedSource};
use async_trait::async_trait;
use model::{
    feeds::FeedInfo,
    pagination::{PageRequest, PageResponse},
};
use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicUsize, Ordering},
};
use tracing::debug;

/// Feed source over an in-memory collection.
///
/// Honours the same paging contract as a remote feed: 1-based start index,
/// short pages at the end, an optional total count hint and an optional cap
/// on how many records the "server" lets a client reach. Every request is
/// logged so callers can assert on the fetch pattern.
pub struct MemorySource<R> {
    records: Vec<R>,
    reported_total: Option<usize>,
    server_cap: Option<usize>,
    info: Option<FeedInfo>,
    pending_failures: AtomicUsize,
    requests: Mutex<Vec<PageRequest>>,
}

impl<R: Clone + Send + Sync> MemorySource<R> {
    pub fn new(records: Vec<R>) -> Self {
        MemorySource {
            records,
            reported_total: None,
            server_cap: None,
            info: None,
            pending_failures: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Reports the real collection size with every page.
    pub fn with_total_hint(self) -> Self {
        let total = self.records.len();
        self.with_reported_total(total)
    }

    /// Reports an arbitrary total with every page.
    pub fn with_reported_total(mut self, total: usize) -> Self {
        self.reported_total = Some(total);
        self
    }

    /// Records at or past `cap` are never returned.
    pub fn with_server_cap(mut self, cap: usize) -> Self {
        self.server_cap = Some(cap);
        self
    }

    pub fn with_info(mut self, info: FeedInfo) -> Self {
        self.info = Some(info);
        self
    }

    /// Makes the next `n` fetches fail.
    pub fn fail_next(&self, n: usize) {
        self.pending_failures.store(n, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Requests received so far, failed ones included.
    pub fn requests(&self) -> Vec<PageRequest> {
        self.log().clone()
    }

    pub fn request_count(&self) -> usize {
        self.log().len()
    }

    fn log(&self) -> std::sync::MutexGuard<'_, Vec<PageRequest>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_failure(&self) -> bool {
        self.pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl<R: Clone + Send + Sync> FeedSource for MemorySource<R> {
    type Record = R;

    async fn fetch(&self, request: &PageRequest) -> Result<PageResponse<R>, FetchError> {
        self.log().push(request.clone());

        if request.start_index < 1 || request.max_results < 1 {
            return Err(FetchError::Http {
                status: 400,
                message: format!(
                    "Invalid page: start-index={}, max-results={}",
                    request.start_index, request.max_results
                ),
            });
        }

        if self.take_failure() {
            return Err(FetchError::Source("injected failure".into()));
        }

        let reachable = self
            .server_cap
            .map_or(self.records.len(), |cap| cap.min(self.records.len()));
        let start = request.offset().min(reachable);
        let end = start.saturating_add(request.max_results).min(reachable);

        debug!(
            "Serving records [{}, {}) of {} from memory",
            start,
            end,
            self.records.len()
        );

        let mut page =
            PageResponse::new(self.records[start..end].to_vec()).with_total_count(self.reported_total);
        if let Some(info) = &self.info {
            page = page.with_info(info.clone());
        }
        Ok(page)
    }
}
