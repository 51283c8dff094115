use crate::retry::RetryPolicy;
use std::time::Duration;

/// Configuration for the HTTP feed source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Timeout for requests that carry none of their own (default: 30s).
    pub timeout: Duration,
    /// Value of the `v` query parameter (default: "2").
    pub api_version: String,
    /// Developer key sent with every request, if any.
    pub dev_key: Option<String>,
    /// Custom User-Agent header.
    pub user_agent: Option<String>,
    /// Retry policy for transient failures.
    pub retry: RetryPolicy,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            api_version: "2".into(),
            dev_key: None,
            user_agent: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl HttpConfig {
    pub fn with_dev_key(mut self, key: impl Into<String>) -> Self {
        self.dev_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
