use crate::{error::StreamError, state::FrontierState};
use connectors::{error::FetchError, source::FeedSource};
use futures::{Stream, stream};
use model::{
    core::identifiers::Locator,
    feeds::FeedInfo,
    pagination::{PageRequest, PageResponse, QueryParams, StreamLimits},
};
use std::{
    ops::{Bound, RangeBounds},
    time::Duration,
};
use tracing::debug;

/// A lazily filled, indexable view over a remote paginated collection.
///
/// Records are cached in collection order from index 0 up to the
/// *frontier*; once written, a cached record never changes. Anything the
/// cache cannot answer is fetched from the source, either by growing the
/// cache a page at a time or, for far-away indices, by a direct fetch that
/// leaves the cache alone.
///
/// Every data operation takes `&mut self`. Share a stream between tasks
/// behind a lock.
pub struct FeedStream<S: FeedSource> {
    source: S,
    locator: Locator,
    query: QueryParams,
    limits: StreamLimits,
    timeout: Option<Duration>,
    cache: Vec<S::Record>,
    count: Option<usize>,
    /// A short page was seen at the frontier.
    exhausted: bool,
    info: Option<FeedInfo>,
}

impl<S: FeedSource> FeedStream<S> {
    pub fn new(source: S, locator: impl Into<Locator>, query: QueryParams) -> Self {
        FeedStream {
            source,
            locator: locator.into(),
            query,
            limits: StreamLimits::default(),
            timeout: None,
            cache: Vec::new(),
            count: None,
            exhausted: false,
            info: None,
        }
    }

    pub fn with_limits(mut self, limits: StreamLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Timeout handed to the source with every page request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    pub fn limits(&self) -> StreamLimits {
        self.limits
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Records cached so far, in collection order.
    pub fn cached(&self) -> &[S::Record] {
        &self.cache
    }

    /// Index one past the last cached record.
    pub fn frontier(&self) -> usize {
        self.cache.len()
    }

    /// Collection size, if a fetch has revealed it.
    pub fn known_count(&self) -> Option<usize> {
        self.count
    }

    pub fn state(&self) -> FrontierState {
        FrontierState::classify(self.cache.len(), self.count, self.limits.max_results())
    }

    /// Feed metadata carried by the most recent page.
    pub fn info(&self) -> Option<&FeedInfo> {
        self.info.as_ref()
    }

    /// Exclusive upper bound on addressable indices.
    fn bound(&self) -> usize {
        let ceiling = self.limits.max_results();
        self.count.map_or(ceiling, |count| count.min(ceiling))
    }

    async fn fetch_page(
        &mut self,
        offset: usize,
        size: usize,
    ) -> Result<PageResponse<S::Record>, FetchError> {
        let request =
            PageRequest::at_offset(self.locator.clone(), self.query.clone(), offset, size)
                .with_timeout(self.timeout);

        debug!(
            "Fetching {} records at start-index {} from {}",
            size, request.start_index, self.locator
        );
        let mut page = self.source.fetch(&request).await?;
        debug!("Received {} records (total: {:?})", page.len(), page.total_count);

        if let Some(total) = page.total_count
            && !self.exhausted
        {
            self.count = Some(total.max(self.cache.len()));
        }
        if let Some(info) = page.info.take() {
            self.info = Some(info);
        }
        Ok(page)
    }

    /// Fetches and appends up to `n` records at the frontier.
    ///
    /// Clamped to the ceiling and the known count. Records are only appended
    /// once every page of the call has arrived, so a failed fetch leaves the
    /// cache as it was. Returns the number of records appended.
    pub async fn fill_cache(&mut self, n: usize) -> Result<usize, StreamError> {
        let frontier = self.cache.len();
        let page_size = self.limits.page_size();
        let target = frontier.saturating_add(n).min(self.bound());
        if self.exhausted || target <= frontier {
            return Ok(0);
        }

        let mut pending = Vec::with_capacity(target - frontier);
        let mut offset = frontier;
        let mut short = false;

        while offset < target.min(self.bound()) {
            let size = (target - offset).min(page_size);
            let page = self.fetch_page(offset, size).await?;
            let is_short = page.is_short(size);

            offset += page.len().min(size);
            pending.extend(page.records.into_iter().take(size));
            if is_short {
                short = true;
                break;
            }
        }

        // a hint that arrived mid-call may lower the bound
        pending.truncate(self.bound().saturating_sub(frontier));
        let appended = pending.len();
        self.cache.extend(pending);

        if short {
            self.exhausted = true;
            self.count = Some(self.cache.len());
        }

        debug!(
            "Cache grew by {} to {} records ({})",
            appended,
            self.cache.len(),
            self.state()
        );
        Ok(appended)
    }
}

impl<S> FeedStream<S>
where
    S: FeedSource,
    S::Record: Clone,
{
    /// Total number of records in the collection.
    ///
    /// Without a count hint from the server this walks the collection page by
    /// page until it runs short or hits the ceiling, in which case the
    /// ceiling is returned (and not remembered as the true size). A known
    /// hint is returned as is, even when it exceeds the ceiling.
    pub async fn count(&mut self) -> Result<usize, StreamError> {
        let page_size = self.limits.page_size();
        let ceiling = self.limits.max_results();

        while self.count.is_none() && self.cache.len() < ceiling {
            if self.fill_cache(page_size).await? == 0 {
                break;
            }
        }
        Ok(self.count.unwrap_or(ceiling))
    }

    /// Record at `index`.
    ///
    /// Indices within one page of the frontier grow the cache; anything
    /// further out is fetched on its own and not cached. A negative index is
    /// reported as [`StreamError::NegativeIndex`], which
    /// [`is_out_of_range`](StreamError::is_out_of_range) also accepts.
    pub async fn get(&mut self, index: isize) -> Result<S::Record, StreamError> {
        let index = non_negative(index)?;
        let bound = self.bound();
        if index >= bound {
            return Err(StreamError::OutOfRange { index, bound });
        }

        if let Some(record) = self.cache.get(index) {
            return Ok(record.clone());
        }

        let page_size = self.limits.page_size();
        if index < self.cache.len() + page_size {
            self.fill_cache(page_size).await?;
            return self
                .cache
                .get(index)
                .cloned()
                .ok_or(StreamError::OutOfRange {
                    index,
                    bound: self.bound(),
                });
        }

        self.point_lookup(index).await
    }

    async fn point_lookup(&mut self, index: usize) -> Result<S::Record, StreamError> {
        debug!("Point lookup of {} (frontier at {})", index, self.cache.len());

        let page = self.fetch_page(index, 1).await?;
        page.records
            .into_iter()
            .next()
            .ok_or(StreamError::OutOfRange {
                index,
                bound: self.bound(),
            })
    }

    /// Records in `[start, stop)`.
    ///
    /// `stop` is clamped to the ceiling and the known count, so indices past
    /// either are silently left out. A collection that ends early yields a
    /// shorter result, not an error.
    pub async fn slice(&mut self, start: isize, stop: isize) -> Result<Vec<S::Record>, StreamError> {
        let start = non_negative(start)?;
        let stop = non_negative(stop)?;
        if start > stop {
            return Err(StreamError::InvalidArgument(format!(
                "slice start {start} is past its stop {stop}"
            )));
        }
        self.slice_within(start, stop).await
    }

    /// [`slice`](Self::slice) for Rust range syntax; an open end means the
    /// ceiling.
    pub async fn range(
        &mut self,
        range: impl RangeBounds<usize>,
    ) -> Result<Vec<S::Record>, StreamError> {
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let stop = match range.end_bound() {
            Bound::Included(&e) => e.saturating_add(1),
            Bound::Excluded(&e) => e,
            Bound::Unbounded => self.limits.max_results(),
        };
        if start > stop {
            return Err(StreamError::InvalidArgument(format!(
                "range start {start} is past its end {stop}"
            )));
        }
        self.slice_within(start, stop).await
    }

    async fn slice_within(
        &mut self,
        start: usize,
        stop: usize,
    ) -> Result<Vec<S::Record>, StreamError> {
        let stop = stop.min(self.bound());
        if start >= stop {
            return Ok(Vec::new());
        }

        let frontier = self.cache.len();
        if stop <= frontier {
            return Ok(self.cache[start..stop].to_vec());
        }

        if start <= frontier + self.limits.page_size() {
            self.fill_cache(stop - frontier).await?;
            let end = stop.min(self.cache.len());
            return Ok(self
                .cache
                .get(start..end)
                .map(<[_]>::to_vec)
                .unwrap_or_default());
        }

        self.fetch_range(start, stop).await
    }

    /// Fetches `[start, stop)` page by page without touching the cache.
    async fn fetch_range(
        &mut self,
        start: usize,
        stop: usize,
    ) -> Result<Vec<S::Record>, StreamError> {
        debug!("Direct fetch of [{}, {}) (frontier at {})", start, stop, self.cache.len());

        let page_size = self.limits.page_size();
        let mut records = Vec::with_capacity(stop - start);
        let mut offset = start;

        while offset < stop.min(self.bound()) {
            let size = (stop - offset).min(page_size);
            let page = self.fetch_page(offset, size).await?;
            let is_short = page.is_short(size);

            offset += page.len().min(size);
            records.extend(page.records.into_iter().take(size));
            if is_short {
                break;
            }
        }

        records.truncate(self.bound().saturating_sub(start));
        Ok(records)
    }

    /// Iterates the collection from the start, growing the cache one page at
    /// a time.
    ///
    /// Each call starts over at index 0. Records already cached are served
    /// from the cache; the stream ends at the known count, the ceiling or the
    /// first short page. A fetch error is yielded once and ends the stream.
    pub fn iter(&mut self) -> impl Stream<Item = Result<S::Record, StreamError>> + '_ {
        stream::try_unfold((self, 0usize), |(feed, index)| async move {
            if index >= feed.bound() {
                return Ok::<_, StreamError>(None);
            }
            if index >= feed.cache.len() {
                let page_size = feed.limits.page_size();
                if feed.fill_cache(page_size).await? == 0 {
                    return Ok(None);
                }
            }
            Ok(feed
                .cache
                .get(index)
                .cloned()
                .map(|record| (record, (feed, index + 1))))
        })
    }
}

fn non_negative(index: isize) -> Result<usize, StreamError> {
    usize::try_from(index).map_err(|_| StreamError::NegativeIndex(index))
}
