use crate::error::FetchError;
use model::{core::identifiers::Locator, pagination::QueryParams};
use reqwest::Url;

pub const GDATA_API_ROOT: &str = "http://gdata.youtube.com/feeds/api";

/// The well-known feeds of the GData video API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEndpoint {
    /// Full-text video search.
    Search { term: String },
    Uploads { user: String },
    Comments { video_id: String },
    Related { video_id: String },
    Subscriptions { user: String },
    /// Any other feed, e.g. one discovered through a feed link.
    Custom(Locator),
}

impl FeedEndpoint {
    pub fn locator(&self) -> Locator {
        match self {
            FeedEndpoint::Search { .. } => Locator::from(format!("{GDATA_API_ROOT}/videos")),
            FeedEndpoint::Uploads { user } => {
                Locator::from(format!("{GDATA_API_ROOT}/users/{user}/uploads"))
            }
            FeedEndpoint::Comments { video_id } => {
                Locator::from(format!("{GDATA_API_ROOT}/videos/{video_id}/comments"))
            }
            FeedEndpoint::Related { video_id } => {
                Locator::from(format!("{GDATA_API_ROOT}/videos/{video_id}/related"))
            }
            FeedEndpoint::Subscriptions { user } => {
                Locator::from(format!("{GDATA_API_ROOT}/users/{user}/subscriptions"))
            }
            FeedEndpoint::Custom(locator) => locator.clone(),
        }
    }

    /// Base query parameters the feed needs on every page.
    pub fn query(&self) -> QueryParams {
        match self {
            FeedEndpoint::Search { term } => QueryParams::new().with("q", term),
            _ => QueryParams::new(),
        }
    }
}

/// Extracts the video id from a watch URL.
///
/// Accepts `http://youtu.be/<id>` and `http://youtube.com/watch?v=<id>&...`.
pub fn video_id_from_url(url: &str) -> Result<String, FetchError> {
    let not_a_video = || FetchError::InvalidLocator(format!("not a video URL: {url}"));

    let parsed = Url::parse(url).map_err(|_| not_a_video())?;
    let host = parsed.host_str().ok_or_else(not_a_video)?;

    if host == "youtu.be" {
        let id = parsed.path().trim_start_matches('/');
        if id.is_empty() {
            return Err(not_a_video());
        }
        return Ok(id.to_string());
    }

    if !host.contains("youtube.com") {
        return Err(not_a_video());
    }

    parsed
        .query_pairs()
        .find(|(k, _)| k == "v")
        .map(|(_, v)| v.into_owned())
        .ok_or_else(not_a_video)
}
