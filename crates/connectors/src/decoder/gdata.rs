use crate::{decoder::PageDecoder, error::DecodeError};
use model::{
    core::utils::parse_feed_timestamp,
    feeds::{FeedInfo, FeedLink, Link, RelationTable},
    pagination::PageResponse,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// Envelope version every GData JSON response carries.
pub const GDATA_ENVELOPE_VERSION: &str = "1.0";

/// Entry mapping that keeps entries as raw JSON.
pub type RawEntry = fn(Value) -> Result<Value, DecodeError>;

/// Decoder for the GData JSON feed envelope.
///
/// Pulls the paging data (`openSearch$totalResults`, `entry`) and feed
/// metadata out of the envelope and hands each entry to `map_entry`, which
/// is where callers turn raw entries into their own record types.
#[derive(Clone)]
pub struct GDataFeedDecoder<F> {
    relations: RelationTable,
    map_entry: F,
}

impl GDataFeedDecoder<RawEntry> {
    /// Keeps entries as raw JSON.
    pub fn raw() -> Self {
        GDataFeedDecoder::new(Ok as RawEntry)
    }
}

impl<F, R> GDataFeedDecoder<F>
where
    F: Fn(Value) -> Result<R, DecodeError>,
{
    pub fn new(map_entry: F) -> Self {
        GDataFeedDecoder {
            relations: RelationTable::gdata(),
            map_entry,
        }
    }
}

impl<F> GDataFeedDecoder<F> {
    pub fn with_relations(mut self, relations: RelationTable) -> Self {
        self.relations = relations;
        self
    }

    pub fn relations(&self) -> &RelationTable {
        &self.relations
    }
}

impl<F, R> PageDecoder for GDataFeedDecoder<F>
where
    F: Fn(Value) -> Result<R, DecodeError> + Send + Sync,
    R: Send,
{
    type Record = R;

    fn decode(&self, mut body: Value) -> Result<PageResponse<R>, DecodeError> {
        check_version(&body)?;

        let mut feed = body
            .get_mut("feed")
            .map(Value::take)
            .ok_or_else(|| DecodeError::missing("feed"))?;

        let total_count = match feed.pointer("/openSearch$totalResults/$t") {
            Some(v) => Some(as_count(v, "openSearch$totalResults")?),
            None => None,
        };
        let info = feed_info(&feed, &self.relations)?;

        let entries = match feed.get_mut("entry").map(Value::take) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(DecodeError::invalid("entry", "expected an array")),
        };

        let records = entries
            .into_iter()
            .map(&self.map_entry)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PageResponse::new(records)
            .with_total_count(total_count)
            .with_info(info))
    }
}

fn check_version(body: &Value) -> Result<(), DecodeError> {
    let found = body
        .get("version")
        .and_then(Value::as_str)
        .ok_or_else(|| DecodeError::missing("version"))?;
    if found != GDATA_ENVELOPE_VERSION {
        return Err(DecodeError::VersionMismatch {
            expected: GDATA_ENVELOPE_VERSION.into(),
            found: found.into(),
        });
    }
    Ok(())
}

/// Reads a `{"$t": "..."}` text node.
pub fn text<'a>(node: &'a Value, field: &str) -> Option<&'a str> {
    node.get(field)?.get("$t")?.as_str()
}

/// Counts show up both as JSON numbers and as numeric strings.
fn as_count(value: &Value, field: &str) -> Result<usize, DecodeError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| DecodeError::invalid(field, format!("not a count: {n}"))),
        Value::String(s) => s
            .trim()
            .parse::<usize>()
            .map_err(|e| DecodeError::invalid(field, e.to_string())),
        other => Err(DecodeError::invalid(field, format!("not a count: {other}"))),
    }
}

fn feed_info(feed: &Value, relations: &RelationTable) -> Result<FeedInfo, DecodeError> {
    let updated = text(feed, "updated")
        .map(parse_feed_timestamp)
        .transpose()?;

    Ok(FeedInfo {
        title: text(feed, "title").map(str::to_string),
        updated,
        links: decode_links(feed.get("link"), relations),
    })
}

/// Decodes a `link` array, keying each link by its short relation name.
pub fn decode_links(links: Option<&Value>, relations: &RelationTable) -> BTreeMap<String, Link> {
    let Some(Value::Array(links)) = links else {
        return BTreeMap::new();
    };

    links
        .iter()
        .filter_map(|link| {
            let rel = link.get("rel")?.as_str()?;
            let href = link.get("href")?.as_str()?;
            let media_type = link.get("type").and_then(Value::as_str).map(str::to_string);
            Some((
                relations.link_name(rel).to_string(),
                Link {
                    href: href.to_string(),
                    media_type,
                },
            ))
        })
        .collect()
}

/// Decodes the `gd$feedLink` array of a profile entry into named feeds.
pub fn decode_feed_links(
    entry: &Value,
    relations: &RelationTable,
) -> Result<BTreeMap<String, FeedLink>, DecodeError> {
    let Some(Value::Array(links)) = entry.get("gd$feedLink") else {
        return Ok(BTreeMap::new());
    };

    let mut raw = Vec::with_capacity(links.len());
    for link in links {
        let rel = link
            .get("rel")
            .and_then(Value::as_str)
            .ok_or_else(|| DecodeError::missing("gd$feedLink.rel"))?;
        let href = link
            .get("href")
            .and_then(Value::as_str)
            .ok_or_else(|| DecodeError::missing("gd$feedLink.href"))?;
        let count_hint = match link.get("countHint") {
            Some(v) => Some(as_count(v, "gd$feedLink.countHint")?),
            None => None,
        };
        raw.push((
            rel.to_string(),
            FeedLink {
                href: href.to_string(),
                count_hint,
            },
        ));
    }

    Ok(relations.resolve_feeds(raw))
}
