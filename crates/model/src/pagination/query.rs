use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, btree_map};

/// Query string parameters for a feed request.
///
/// Kept sorted so that identical requests render identical URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    pub fn new() -> Self {
        QueryParams(BTreeMap::new())
    }

    /// Inserts a parameter, replacing any earlier value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.insert(key.into(), value.to_string());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a copy of `self` overlaid with `other`; `other` wins on
    /// conflicting keys.
    pub fn merged(&self, other: &QueryParams) -> QueryParams {
        let mut out = self.clone();
        for (k, v) in &other.0 {
            out.0.insert(k.clone(), v.clone());
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl IntoIterator for QueryParams {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merged_overrides_base() {
        let base = QueryParams::new().with("q", "cats").with("max-results", 10);
        let paging = QueryParams::new().with("max-results", 50).with("start-index", 1);

        let merged = base.merged(&paging);
        assert_eq!(merged.get("q"), Some("cats"));
        assert_eq!(merged.get("max-results"), Some("50"));
        assert_eq!(merged.get("start-index"), Some("1"));
        // base untouched
        assert_eq!(base.get("max-results"), Some("10"));
    }

    #[test]
    fn test_iteration_is_sorted() {
        let params: QueryParams = [("v", "2"), ("alt", "json"), ("q", "dogs")]
            .into_iter()
            .collect();
        let keys: Vec<_> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["alt", "q", "v"]);
    }
}
