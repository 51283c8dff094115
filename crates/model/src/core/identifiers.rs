use std::{fmt, sync::Arc};

/// Opaque resource locator of a remote feed (usually its URL).
///
/// Cheap to clone: every page request carries one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Locator(Arc<str>);

impl Locator {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(Arc::from(locator.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Locator {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Locator {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for Locator {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
