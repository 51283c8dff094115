use crate::error::FetchError;
use std::{future::Future, time::Duration};
use tokio::time::sleep;
use tracing::warn;

/// How often, and how patiently, a page request is repeated after a
/// transient failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: usize,
    pub base_delay: Duration,
    /// Longest pause between attempts. A server asking for a longer one ends
    /// the retries.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: max_delay.max(base_delay),
        }
    }

    /// A single attempt, no waiting.
    pub fn never() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Runs `op` until it succeeds, fails for good or runs out of attempts.
    ///
    /// Only errors that report themselves transient are retried. With a
    /// single-attempt policy the error comes back as is; otherwise running
    /// out of attempts wraps the last one in [`FetchError::RetriesExhausted`].
    pub async fn run<F, Fut, T>(&self, mut op: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut attempt = 1;

        loop {
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if !err.is_transient() || self.max_attempts == 1 {
                return Err(err);
            }
            if attempt >= self.max_attempts {
                return Err(FetchError::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            let Some(delay) = self.delay_after(&err, attempt) else {
                warn!(
                    "Server asked for a pause over {:?}, giving up: {}",
                    self.max_delay, err
                );
                return Err(err);
            };
            warn!(
                "Attempt {}/{} failed: {}; retrying in {:?}",
                attempt, self.max_attempts, err, delay
            );
            sleep(delay).await;
            attempt += 1;
        }
    }

    /// Pause before the attempt following `attempt`, or `None` when the
    /// server wants more than `max_delay`.
    fn delay_after(&self, err: &FetchError, attempt: usize) -> Option<Duration> {
        let backoff = self.backoff(attempt);
        match err.retry_after() {
            Some(wait) if wait > self.max_delay => None,
            Some(wait) => Some(wait.max(backoff)),
            None => Some(backoff),
        }
    }

    /// `base_delay` doubled per failed attempt, capped at `max_delay`.
    fn backoff(&self, attempt: usize) -> Duration {
        let doublings = attempt.saturating_sub(1).min(16) as u32;
        self.base_delay
            .saturating_mul(1u32 << doublings)
            .min(self.max_delay)
    }
}
