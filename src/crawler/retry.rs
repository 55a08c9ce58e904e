//! Bounded retry with a fixed delay between attempts

use crate::config::RetryConfig;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default number of attempts, including the first
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default pause between attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Retry policy for idempotent operations (GET requests)
///
/// The operation is attempted up to `max_attempts` times with a fixed
/// `delay` between attempts. There is no delay after the final attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy; `max_attempts` is clamped to at least 1
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// A policy that attempts the operation exactly once
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.delay())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `operation` until it succeeds or the attempt budget is spent
    ///
    /// Every error is treated as worth another attempt; see
    /// [`RetryPolicy::run_while`] to stop on errors that cannot recover.
    pub async fn run<T, E, F, Fut, O>(
        &self,
        cancel: &CancellationToken,
        operation: F,
        on_retry: O,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        O: FnMut(u32, &E),
    {
        self.run_while(cancel, operation, |_| true, on_retry).await
    }

    /// Runs `operation` until it succeeds, the attempt budget is spent, or
    /// it fails with an error `retryable` rejects
    ///
    /// `on_retry` is called after every failed attempt with the 1-based
    /// attempt number and the error; it only observes. Returns the first
    /// success or the last error. Once `cancel` fires no further attempt is
    /// started, and a pending delay ends early with the last error.
    pub async fn run_while<T, E, F, Fut, R, O>(
        &self,
        cancel: &CancellationToken,
        mut operation: F,
        retryable: R,
        mut on_retry: O,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        R: Fn(&E) -> bool,
        O: FnMut(u32, &E),
    {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            on_retry(attempt, &error);

            if attempt >= self.max_attempts || cancel.is_cancelled() || !retryable(&error) {
                return Err(error);
            }

            tokio::select! {
                _ = tokio::time::sleep(self.delay) => {}
                _ = cancel.cancelled() => return Err(error),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}
