//! Timing instrumentation helpers

use std::time::Duration;
use tokio::time::Instant;

/// Tracks the elapsed time of an operation
///
/// Uses the Tokio clock, so paused-time tests see simulated durations.
///
/// # Example
///
/// ```ignore
/// use tiercache_infrastructure::utils::TimedOperation;
///
/// let timer = TimedOperation::start();
/// cache.ping().await?;
/// let elapsed = timer.elapsed_ms();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    /// Start a new timed operation
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Get elapsed time as Duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Get remaining time before deadline (returns None if already exceeded)
    pub fn remaining(&self, deadline: Duration) -> Option<Duration> {
        deadline.checked_sub(self.start.elapsed())
    }
}
