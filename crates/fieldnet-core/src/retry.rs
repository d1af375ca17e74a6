// ── Retry hook ──
//
// Nothing in fieldnet retries on its own. Callers that want another
// attempt after a transient failure pass a policy with `max_attempts > 1`.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::CoreError;

/// How often to run an operation, and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// Run once, never retry.
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }

    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Run `op` under this policy.
    ///
    /// Only [retryable](CoreError::is_retryable) failures are retried. Any
    /// other failure is returned as-is. When every attempt fails the last
    /// error is wrapped in [`CoreError::RetriesExhausted`], unless the
    /// policy allowed a single attempt.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, CoreError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let attempts = self.attempts();
        let mut attempt = 1;
        loop {
            let err = match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if attempts == 1 || !err.is_retryable() {
                return Err(err);
            }
            if attempt >= attempts {
                return Err(CoreError::RetriesExhausted {
                    attempts,
                    last: Box::new(err),
                });
            }
            warn!(attempt, attempts, error = %err, "attempt failed, retrying");
            tokio::time::sleep(self.delay).await;
            attempt += 1;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}
