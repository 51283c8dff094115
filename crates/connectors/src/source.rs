use crate::error::FetchError;
use async_trait::async_trait;
use model::pagination::{PageRequest, PageResponse};
use std::sync::Arc;

/// The page fetcher a feed stream pulls from.
///
/// Implementations must treat every call as independent and idempotent:
/// the stream may ask for the same page twice (point lookups bypass its
/// cache). A well-formed empty page is a valid answer meaning "nothing more
/// here"; only transport-level trouble is an `Err`. Retries, timeouts and
/// cancellation all live on this side of the boundary.
#[async_trait]
pub trait FeedSource: Send + Sync {
    type Record: Send;

    async fn fetch(&self, request: &PageRequest) -> Result<PageResponse<Self::Record>, FetchError>;
}

#[async_trait]
impl<S: FeedSource + ?Sized> FeedSource for Arc<S> {
    type Record = S::Record;

    async fn fetch(&self, request: &PageRequest) -> Result<PageResponse<Self::Record>, FetchError> {
        (**self).fetch(request).await
    }
}
