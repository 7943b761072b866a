use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::errors::{FetchError, UpstreamError};
use crate::domain::models::RetryConfig;

/// Retry policy with exponential backoff for upstream fetches
///
/// Every [`UpstreamError`] is transient, so an operation is retried until it
/// succeeds or `max_attempts` attempts have been made.
/// Backoff doubles with each retry: 50ms → 100ms → 200ms ... capped at `max_backoff_ms`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    max_attempts: u32,
    /// Initial backoff duration in milliseconds
    initial_backoff_ms: u64,
    /// Maximum backoff duration in milliseconds
    max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    ///
    /// `max_attempts` is clamped to at least one attempt.
    pub fn new(max_attempts: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff_ms,
            max_backoff_ms: max_backoff_ms.max(initial_backoff_ms),
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            config.initial_backoff_ms,
            config.max_backoff_ms,
        )
    }

    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Execute an operation, retrying failed attempts
    ///
    /// # Returns
    /// * `Ok(T)` - An attempt succeeded
    /// * `Err(FetchError::RetriesExhausted)` - Every attempt failed; carries the last error
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, UpstreamError>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        debug!(retries = attempt, "upstream fetch succeeded after retrying");
                    }
                    return Ok(result);
                }
                Err(err) => {
                    attempt += 1;
                    if attempt >= self.max_attempts {
                        warn!(attempts = attempt, error = %err, "upstream fetch failed, giving up");
                        return Err(FetchError::RetriesExhausted {
                            attempts: attempt,
                            source: err,
                        });
                    }

                    let backoff = self.calculate_backoff(attempt - 1);
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "upstream fetch failed, retrying"
                    );
                    sleep(backoff).await;
                }
            }
        }
    }

    /// Formula: min(initial_backoff * 2^retry, max_backoff)
    fn calculate_backoff(&self, retry: u32) -> Duration {
        let backoff_ms = self
            .initial_backoff_ms
            .saturating_mul(2_u64.saturating_pow(retry))
            .min(self.max_backoff_ms);

        Duration::from_millis(backoff_ms)
    }
}
