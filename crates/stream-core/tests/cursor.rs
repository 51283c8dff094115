use async_trait::async_trait;
use connectors::{error::FetchError, memory::MemorySource, source::FeedSource};
use futures::{StreamExt, TryStreamExt};
use model::{
    feeds::{FeedInfo, Link},
    pagination::{MAX_RESULTS, PageRequest, PageResponse, QueryParams},
};
use std::{sync::Arc, time::Duration};
use stream_core::{FeedStream, FrontierState, StreamError};

type Numbers = Arc<MemorySource<u32>>;

fn numbers(n: u32) -> MemorySource<u32> {
    MemorySource::new((0..n).collect())
}

fn open(source: &Numbers) -> FeedStream<Numbers> {
    FeedStream::new(
        Arc::clone(source),
        "http://gdata.youtube.com/feeds/api/videos",
        QueryParams::new().with("q", "cats"),
    )
}

/// (start-index, max-results) of every request the source saw.
fn calls(source: &Numbers) -> Vec<(usize, usize)> {
    source
        .requests()
        .iter()
        .map(|r| (r.start_index, r.max_results))
        .collect()
}

/// Fails every request that starts at or after `fail_from` (0-based).
struct FailingTail {
    inner: MemorySource<u32>,
    fail_from: usize,
}

#[async_trait]
impl FeedSource for FailingTail {
    type Record = u32;

    async fn fetch(&self, request: &PageRequest) -> Result<PageResponse<u32>, FetchError> {
        if request.offset() >= self.fail_from {
            return Err(FetchError::Source("connection reset".into()));
        }
        self.inner.fetch(request).await
    }
}

#[tokio::test]
async fn test_get_is_stable() {
    let source = Arc::new(numbers(200));
    let mut feed = open(&source);

    let first = feed.get(17).await.unwrap();
    let again = feed.get(17).await.unwrap();
    assert_eq!(first, 17);
    assert_eq!(first, again);
    assert_eq!(source.request_count(), 1);
}

#[tokio::test]
async fn test_get_past_ceiling_is_out_of_range() {
    let source = Arc::new(numbers(3000).with_total_hint());
    let mut feed = open(&source);

    let err = feed.get(MAX_RESULTS as isize).await.unwrap_err();
    assert!(matches!(
        err,
        StreamError::OutOfRange {
            index: 1000,
            bound: 1000
        }
    ));
    assert!(feed.get(5000).await.unwrap_err().is_out_of_range());
    assert_eq!(source.request_count(), 0);
}

#[tokio::test]
async fn test_slice_matches_iteration_prefix() {
    let source = Arc::new(numbers(180));
    let mut feed = open(&source);
    let all: Vec<u32> = feed.iter().try_collect().await.unwrap();

    let fresh = Arc::new(numbers(180));
    let mut other = open(&fresh);
    for n in [0, 1, 49, 50, 51, 120, 180] {
        let slice = other.slice(0, n).await.unwrap();
        assert_eq!(slice, all[..n as usize], "prefix of {n}");
    }
}

#[tokio::test]
async fn test_short_page_fixes_count() {
    let source = Arc::new(numbers(73));
    let mut feed = open(&source);

    // the short page shows up at offset 50 with 23 records
    assert_eq!(feed.count().await.unwrap(), 73);
    assert_eq!(calls(&source), vec![(1, 50), (51, 50)]);
    assert_eq!(feed.state(), FrontierState::FullyFilled);

    assert!(feed.get(73).await.unwrap_err().is_out_of_range());
    assert_eq!(feed.slice(70, 80).await.unwrap(), vec![70, 71, 72]);
    assert!(feed.slice(73, 90).await.unwrap().is_empty());
    assert_eq!(source.request_count(), 2);
}

#[tokio::test]
async fn test_count_with_hint_takes_one_fetch() {
    let source = Arc::new(numbers(120).with_total_hint());
    let mut feed = open(&source);

    assert_eq!(feed.count().await.unwrap(), 120);
    assert_eq!(calls(&source), vec![(1, 50)]);
    assert_eq!(feed.frontier(), 50);

    // memoized
    assert_eq!(feed.count().await.unwrap(), 120);
    assert_eq!(source.request_count(), 1);
}

#[tokio::test]
async fn test_count_without_hint_walks_pages() {
    let source = Arc::new(numbers(120));
    let mut feed = open(&source);

    assert_eq!(feed.count().await.unwrap(), 120);
    assert_eq!(calls(&source), vec![(1, 50), (51, 50), (101, 50)]);
    assert_eq!(feed.known_count(), Some(120));
}

#[tokio::test]
async fn test_count_stops_at_ceiling_without_hint() {
    let source = Arc::new(numbers(2500));
    let mut feed = open(&source);

    assert_eq!(feed.count().await.unwrap(), MAX_RESULTS);
    assert_eq!(source.request_count(), MAX_RESULTS / 50);
    assert_eq!(feed.known_count(), None);
    assert_eq!(feed.state(), FrontierState::CeilingReached);

    // nothing left to fetch, nothing is fetched
    assert_eq!(feed.count().await.unwrap(), MAX_RESULTS);
    assert_eq!(source.request_count(), MAX_RESULTS / 50);
}

#[tokio::test]
async fn test_hint_above_ceiling_is_reported() {
    let source = Arc::new(numbers(1200).with_reported_total(5000));
    let mut feed = open(&source);

    assert_eq!(feed.count().await.unwrap(), 5000);
    assert_eq!(source.request_count(), 1);
    assert!(feed.get(1000).await.unwrap_err().is_out_of_range());
}

#[tokio::test]
async fn test_near_get_fills_one_page() {
    let source = Arc::new(numbers(2000));
    let mut feed = open(&source);

    assert_eq!(feed.get(10).await.unwrap(), 10);
    assert_eq!(calls(&source), vec![(1, 50)]);
    assert_eq!(feed.frontier(), 50);

    // still within one page of the frontier
    assert_eq!(feed.get(75).await.unwrap(), 75);
    assert_eq!(calls(&source)[1], (51, 50));
    assert_eq!(feed.frontier(), 100);
}

#[tokio::test]
async fn test_far_get_is_point_lookup() {
    let source = Arc::new(numbers(2000));
    let mut feed = open(&source);
    feed.get(0).await.unwrap();

    assert_eq!(feed.get(130).await.unwrap(), 130);
    assert_eq!(calls(&source), vec![(1, 50), (131, 1)]);
    assert_eq!(feed.frontier(), 50);

    // lookups bypass the cache, so a repeat fetches again
    assert_eq!(feed.get(130).await.unwrap(), 130);
    assert_eq!(source.request_count(), 3);
}

#[tokio::test]
async fn test_point_lookup_past_end() {
    let source = Arc::new(numbers(100));
    let mut feed = open(&source);

    assert!(feed.get(500).await.unwrap_err().is_out_of_range());
    assert_eq!(calls(&source), vec![(501, 1)]);
    assert_eq!(feed.frontier(), 0);
}

#[tokio::test]
async fn test_slice_across_ceiling_is_clamped() {
    let source = Arc::new(numbers(2000).with_total_hint().with_server_cap(1000));
    let mut feed = open(&source);

    let records = feed.slice(995, 1005).await.unwrap();
    assert_eq!(records, vec![995, 996, 997, 998, 999]);
    assert_eq!(calls(&source), vec![(996, 5)]);
    assert_eq!(feed.frontier(), 0);
}

#[tokio::test]
async fn test_far_slice_pages_directly() {
    let source = Arc::new(numbers(400));
    let mut feed = open(&source);

    let records = feed.slice(200, 320).await.unwrap();
    assert_eq!(records, (200..320).collect::<Vec<_>>());
    assert_eq!(calls(&source), vec![(201, 50), (251, 50), (301, 20)]);
    assert_eq!(feed.frontier(), 0);
}

#[tokio::test]
async fn test_far_slice_stops_on_short_page() {
    let source = Arc::new(numbers(260));
    let mut feed = open(&source);

    let records = feed.slice(200, 400).await.unwrap();
    assert_eq!(records.len(), 60);
    assert_eq!(calls(&source), vec![(201, 50), (251, 50)]);
}

#[tokio::test]
async fn test_fill_cache_never_refetches() {
    let source = Arc::new(numbers(100));
    let mut feed = open(&source);

    assert_eq!(feed.fill_cache(30).await.unwrap(), 30);
    assert_eq!(feed.fill_cache(30).await.unwrap(), 30);
    // one page asked for, a short one came back
    assert_eq!(feed.fill_cache(80).await.unwrap(), 40);
    assert_eq!(feed.fill_cache(10).await.unwrap(), 0);

    assert_eq!(calls(&source), vec![(1, 30), (31, 30), (61, 50)]);
    assert_eq!(feed.cached(), (0..100).collect::<Vec<_>>().as_slice());
}

#[tokio::test]
async fn test_slice_just_past_frontier_grows_cache() {
    let source = Arc::new(numbers(400));
    let mut feed = open(&source);
    feed.fill_cache(50).await.unwrap();

    let records = feed.slice(80, 120).await.unwrap();
    assert_eq!(records, (80..120).collect::<Vec<_>>());
    assert_eq!(calls(&source), vec![(1, 50), (51, 50), (101, 20)]);
    assert_eq!(feed.frontier(), 120);

    // now answered from the cache
    assert_eq!(feed.slice(90, 110).await.unwrap(), (90..110).collect::<Vec<_>>());
    assert_eq!(source.request_count(), 3);
}

#[tokio::test]
async fn test_slice_past_end_found_while_growing_is_empty() {
    let source = Arc::new(numbers(70));
    let mut feed = open(&source);
    feed.fill_cache(50).await.unwrap();

    // the fill runs short at 70, before the slice begins
    assert!(feed.slice(90, 130).await.unwrap().is_empty());
    assert_eq!(calls(&source), vec![(1, 50), (51, 50)]);
    assert_eq!(feed.frontier(), 70);
    assert_eq!(feed.known_count(), Some(70));
    assert_eq!(feed.state(), FrontierState::FullyFilled);

    assert!(feed.slice(90, 130).await.unwrap().is_empty());
    assert_eq!(source.request_count(), 2);
}

#[tokio::test]
async fn test_failed_fetch_leaves_cache_untouched() {
    let source = Arc::new(numbers(300));
    let mut feed = open(&source);
    feed.fill_cache(50).await.unwrap();

    source.fail_next(1);
    let err = feed.fill_cache(50).await.unwrap_err();
    assert!(matches!(err, StreamError::Transport(FetchError::Source(_))));
    assert_eq!(feed.frontier(), 50);

    assert_eq!(feed.get(60).await.unwrap(), 60);
    assert_eq!(feed.frontier(), 100);
}

#[tokio::test]
async fn test_partial_multi_page_fill_is_discarded() {
    let source = FailingTail {
        inner: numbers(300),
        fail_from: 100,
    };
    let mut feed = FeedStream::new(source, "mem://numbers", QueryParams::new());

    // first two pages succeed, the third fails
    assert!(feed.fill_cache(150).await.is_err());
    assert_eq!(feed.frontier(), 0);
    assert_eq!(feed.state(), FrontierState::Empty);

    assert_eq!(feed.fill_cache(100).await.unwrap(), 100);
}

#[tokio::test]
async fn test_iteration_error_ends_stream() {
    let source = FailingTail {
        inner: numbers(300),
        fail_from: 50,
    };
    let mut feed = FeedStream::new(source, "mem://numbers", QueryParams::new());

    let items: Vec<Result<u32, StreamError>> = feed.iter().collect().await;
    assert_eq!(items.len(), 51);
    assert!(items[..50].iter().all(Result::is_ok));
    assert!(matches!(items[50], Err(StreamError::Transport(_))));
}

#[tokio::test]
async fn test_validation_happens_before_fetching() {
    let source = Arc::new(numbers(100));
    let mut feed = open(&source);

    assert!(matches!(
        feed.get(-1).await,
        Err(StreamError::NegativeIndex(-1))
    ));
    assert!(feed.get(-3).await.unwrap_err().is_out_of_range());
    assert!(matches!(
        feed.slice(-5, 10).await,
        Err(StreamError::NegativeIndex(-5))
    ));
    assert!(matches!(
        feed.slice(0, -1).await,
        Err(StreamError::NegativeIndex(-1))
    ));
    assert!(matches!(
        feed.slice(10, 2).await,
        Err(StreamError::InvalidArgument(_))
    ));
    assert!(feed.slice(5, 5).await.unwrap().is_empty());
    assert_eq!(source.request_count(), 0);
}

#[tokio::test]
async fn test_iteration_stops_at_ceiling() {
    let source = Arc::new(numbers(1500).with_total_hint());
    let mut feed = open(&source);

    let all: Vec<u32> = feed.iter().try_collect().await.unwrap();
    assert_eq!(all.len(), MAX_RESULTS);
    assert_eq!(all.last(), Some(&999));
    assert_eq!(source.request_count(), MAX_RESULTS / 50);
}

#[tokio::test]
async fn test_requests_carry_query_and_timeout() {
    let source = Arc::new(numbers(10));
    let mut feed = open(&source).with_timeout(Duration::from_secs(3));
    feed.get(0).await.unwrap();

    let request = &source.requests()[0];
    assert_eq!(request.timeout, Some(Duration::from_secs(3)));
    assert_eq!(request.query.get("q"), Some("cats"));
    assert_eq!(
        request.locator.as_str(),
        "http://gdata.youtube.com/feeds/api/videos"
    );
}

#[tokio::test]
async fn test_feed_info_is_kept() {
    let mut info = FeedInfo {
        title: Some("Videos matching: cats".into()),
        ..FeedInfo::default()
    };
    info.links.insert(
        "next".into(),
        Link {
            href: "http://gdata.youtube.com/feeds/api/videos?start-index=51".into(),
            media_type: None,
        },
    );
    let source = Arc::new(numbers(10).with_info(info.clone()));
    let mut feed = open(&source);
    assert!(feed.info().is_none());

    feed.count().await.unwrap();
    assert_eq!(feed.info(), Some(&info));
}

#[tokio::test]
async fn test_empty_collection() {
    let source = Arc::new(numbers(0).with_total_hint());
    let mut feed = open(&source);

    assert_eq!(feed.count().await.unwrap(), 0);
    assert_eq!(feed.state(), FrontierState::FullyFilled);
    assert!(feed.get(0).await.unwrap_err().is_out_of_range());
    let items: Vec<u32> = feed.iter().try_collect().await.unwrap();
    assert!(items.is_empty());
}
