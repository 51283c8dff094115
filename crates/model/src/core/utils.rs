use crate::error::ModelError;
use chrono::{NaiveDateTime, TimeDelta};

const SECONDS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parses a feed timestamp such as `2010-03-14T17:26:39.000Z`.
///
/// The feed reports local Pacific time with a misleading `Z` suffix, so the
/// zone designator is ignored and a naive datetime is returned. Up to three
/// fractional digits are kept as milliseconds.
pub fn parse_feed_timestamp(value: &str) -> Result<NaiveDateTime, ModelError> {
    let invalid = |reason: &str| ModelError::InvalidTimestamp {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let seconds = value.get(..19).ok_or_else(|| invalid("too short"))?;
    let base = NaiveDateTime::parse_from_str(seconds, SECONDS_FORMAT)
        .map_err(|e| invalid(&e.to_string()))?;

    let rest = &value[19..];
    let Some(fraction) = rest.strip_prefix('.') else {
        return Ok(base);
    };

    let digits: String = fraction
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .take(3)
        .collect();
    if digits.is_empty() {
        return Err(invalid("empty fractional seconds"));
    }

    // "5" means 500ms, "05" means 50ms
    let scale = 10_i64.pow(3 - digits.len() as u32);
    let millis = digits
        .parse::<i64>()
        .map_err(|e| invalid(&e.to_string()))?
        * scale;

    Ok(base + TimeDelta::milliseconds(millis))
}
