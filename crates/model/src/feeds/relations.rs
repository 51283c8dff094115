use crate::feeds::info::FeedLink;
use std::collections::BTreeMap;
use tracing::debug;

/// Namespace the YouTube GData API prefixes onto relation names.
pub const GDATA_NAMESPACE: &str = "http://gdata.youtube.com/schemas/2007#";

const GDATA_USER_FEEDS: [&str; 7] = [
    "favorites",
    "contacts",
    "inbox",
    "playlists",
    "subscriptions",
    "uploads",
    "newsubscriptionvideos",
];

/// Lookup table between relation URIs and the short names callers use.
///
/// Passed to decoders by value rather than living in a global, so two
/// clients talking to different API revisions can carry different tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationTable {
    namespace: String,
    // short name -> relation URI
    feeds: BTreeMap<String, String>,
    // relation URI -> short name
    reverse: BTreeMap<String, String>,
}

impl RelationTable {
    pub fn new(namespace: impl Into<String>) -> Self {
        RelationTable {
            namespace: namespace.into(),
            feeds: BTreeMap::new(),
            reverse: BTreeMap::new(),
        }
    }

    /// Table for the YouTube GData v2 API.
    pub fn gdata() -> Self {
        GDATA_USER_FEEDS
            .iter()
            .fold(Self::new(GDATA_NAMESPACE), |table, name| {
                let uri = format!("{GDATA_NAMESPACE}user.{name}");
                table.with_feed(*name, uri)
            })
    }

    pub fn with_feed(mut self, name: impl Into<String>, uri: impl Into<String>) -> Self {
        let (name, uri) = (name.into(), uri.into());
        self.reverse.insert(uri.clone(), name.clone());
        self.feeds.insert(name, uri);
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Short name of a link relation: the namespace prefix is stripped,
    /// anything else is kept verbatim.
    pub fn link_name<'a>(&self, rel: &'a str) -> &'a str {
        rel.strip_prefix(self.namespace.as_str()).unwrap_or(rel)
    }

    /// Short name of a feed relation, if the table knows it.
    pub fn feed_name(&self, rel: &str) -> Option<&str> {
        self.reverse.get(rel).map(String::as_str)
    }

    pub fn feed_uri(&self, name: &str) -> Option<&str> {
        self.feeds.get(name).map(String::as_str)
    }

    /// Keys feed links by short name; relations missing from the table are
    /// skipped.
    pub fn resolve_feeds<I>(&self, links: I) -> BTreeMap<String, FeedLink>
    where
        I: IntoIterator<Item = (String, FeedLink)>,
    {
        let mut resolved = BTreeMap::new();
        for (rel, link) in links {
            match self.feed_name(&rel) {
                Some(name) => {
                    resolved.insert(name.to_string(), link);
                }
                None => debug!("unknown feed relation: {}", rel),
            }
        }
        resolved
    }
}

impl Default for RelationTable {
    fn default() -> Self {
        Self::gdata()
    }
}
