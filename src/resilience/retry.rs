//! Retry with exponential backoff.
//!
//! The policy is a wrapper around a fallible operation, not a stateful
//! component: the client never retries internally, callers compose a
//! [`RetryPolicy`] around the operations they want re-attempted.

use crate::Result;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Exponential-backoff retry policy.
///
/// Only errors where [`Error::is_retryable`](crate::Error::is_retryable)
/// holds consume an attempt; everything else propagates immediately.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            backoff_factor: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Policy with the given attempt ceiling and default backoff
    /// (1s initial delay, doubling).
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Default::default()
        }
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    /// Run an async operation under this policy.
    ///
    /// The operation is invoked at most `max_attempts` times; the delay
    /// between attempts starts at the initial value and is multiplied by
    /// the backoff factor after every failure. The wait yields the
    /// scheduler rather than blocking a thread.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut delay = self.initial_delay;
        let mut attempt: u32 = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() => {
                    attempt += 1;
                    if attempt >= self.max_attempts {
                        return Err(e);
                    }
                    debug!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying after transient failure"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    delay = delay.mul_f64(self.backoff_factor);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Run a blocking operation under this policy.
    ///
    /// Identical backoff semantics to [`run`](Self::run); the wait
    /// suspends the calling thread.
    pub fn run_blocking<T, F>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut delay = self.initial_delay;
        let mut attempt: u32 = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() => {
                    attempt += 1;
                    if attempt >= self.max_attempts {
                        return Err(e);
                    }
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    delay = delay.mul_f64(self.backoff_factor);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
