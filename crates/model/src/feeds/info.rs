use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A link published in a feed envelope, keyed by its short relation name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    /// MIME type of the target, when the feed states one.
    pub media_type: Option<String>,
}

/// A related feed (uploads, favorites, ...) with the server's size hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedLink {
    pub href: String,
    pub count_hint: Option<usize>,
}

/// Feed-level metadata carried alongside a page of records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedInfo {
    pub title: Option<String>,
    pub updated: Option<NaiveDateTime>,
    pub links: BTreeMap<String, Link>,
}

impl FeedInfo {
    pub fn link(&self, name: &str) -> Option<&Link> {
        self.links.get(name)
    }

    /// Locator of a related feed, e.g. `video.related` or `video.responses`.
    pub fn related_feed(&self, name: &str) -> Option<&str> {
        self.links.get(name).map(|l| l.href.as_str())
    }
}
