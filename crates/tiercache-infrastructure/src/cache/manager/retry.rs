//! Fixed-delay retry for primary calls

use std::future::Future;
use std::time::Duration;
use tiercache_domain::error::Result;
use tracing::debug;

/// Bounded retry with a constant delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    /// Retries after the first attempt
    pub attempts: u32,
    /// Sleep between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    /// Run `call` until it succeeds or `attempts + 1` calls have failed
    ///
    /// Every error is retried, misses included. The last error is returned.
    pub(crate) async fn run<T, F, Fut>(&self, op: &'static str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.attempts => {
                    attempt += 1;
                    debug!(op, attempt, max_retries = self.attempts, error = %e, "Primary call failed, retrying");
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}
