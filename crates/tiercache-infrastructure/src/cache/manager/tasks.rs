//! Background task ownership
//!
//! A manager's health loop and replication tasks run under one
//! `CancellationToken` and one `TaskTracker`, so `close()` can stop the loop
//! and wait for in-flight replications before the tiers are closed.

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
pub(crate) struct BackgroundTasks {
    cancel_token: CancellationToken,
    task_tracker: TaskTracker,
}

impl BackgroundTasks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Token observed by long-running loops
    pub(crate) fn token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Number of tasks still running
    pub(crate) fn active_tasks(&self) -> usize {
        self.task_tracker.len()
    }

    /// Spawn and track a task
    ///
    /// The task is not cancelled by [`BackgroundTasks::shutdown`]; only tasks
    /// that watch [`BackgroundTasks::token`] stop early. Returns `false`
    /// without spawning once the token is cancelled.
    pub(crate) fn spawn<F>(&self, name: &'static str, future: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.cancel_token.is_cancelled() {
            return false;
        }
        debug!(task = name, "Spawning tracked task");
        self.task_tracker.spawn(future);
        true
    }

    /// Cancel the token, then wait up to `timeout` for tracked tasks
    ///
    /// Returns `true` if every task finished in time.
    pub(crate) async fn shutdown(&self, timeout: Duration) -> bool {
        debug!(
            active_tasks = self.task_tracker.len(),
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            "Stopping background tasks"
        );

        self.cancel_token.cancel();
        self.task_tracker.close();

        tokio::select! {
            () = self.task_tracker.wait() => {
                info!("Background tasks stopped");
                true
            }
            () = tokio::time::sleep(timeout) => {
                warn!(
                    remaining = self.task_tracker.len(),
                    "Background tasks still running after shutdown timeout"
                );
                false
            }
        }
    }

    /// Signal cancellation without waiting
    pub(crate) fn cancel(&self) {
        self.cancel_token.cancel();
    }
}
