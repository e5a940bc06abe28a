//! Retry policy for re-executing failed test attempts.
//!
//! The operation is re-invoked from scratch on every attempt, so anything it
//! generates (payloads, emails) is generated again rather than reused.

use crate::error::Retryable;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry policy configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first one
    pub max_retries: u32,
    /// Delay between a failed attempt and the next one
    pub delay: Duration,
}

impl RetryConfig {
    /// A fixed delay between attempts.
    #[must_use]
    pub const fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }
}

/// Retry policy for executing operations with automatic retries.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a new retry policy with the given configuration.
    #[must_use]
    pub const fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Check if an error should be retried after `attempt` retries.
    #[must_use]
    pub fn should_retry<E: Retryable>(&self, error: &E, attempt: u32) -> bool {
        attempt < self.config.max_retries && error.is_retryable()
    }

    /// Execute an async operation with retries.
    ///
    /// The operation receives the 1-based attempt number. Each attempt fully
    /// completes before the delay and the next attempt start.
    ///
    /// # Errors
    ///
    /// Returns the first non-retryable error, or the last error once retries
    /// are exhausted.
    pub async fn execute<F, Fut, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + std::fmt::Display,
    {
        let mut retries = 0;
        loop {
            match operation(retries + 1).await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    if !self.should_retry(&error, retries) {
                        return Err(error);
                    }
                    let delay = self.config.delay;
                    warn!(
                        attempt = retries + 1,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %error,
                        "Attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    retries += 1;
                }
            }
        }
    }
}
