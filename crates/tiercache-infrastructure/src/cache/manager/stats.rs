//! Manager statistics

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

/// Monotonic counters of a [`CacheManager`](super::CacheManager)
///
/// Never reset. Obtained as a copy through `CacheManager::stats()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerStats {
    /// Successful primary calls (reads and writes)
    pub primary_hits: u64,
    /// Reads served by the secondary after a primary failure
    pub secondary_hits: u64,
    /// Primary calls that failed after all retries
    pub primary_errors: u64,
    /// Failed secondary fallbacks
    pub secondary_errors: u64,
    /// Calls answered by the secondary instead of the primary
    pub fallback_count: u64,
    /// Completed background replications
    pub sync_count: u64,
}

impl ManagerStats {
    /// Primary hits over all primary outcomes, `None` before any call
    pub fn primary_success_rate(&self) -> Option<f64> {
        let total = self.primary_hits + self.primary_errors;
        #[allow(clippy::cast_precision_loss)]
        (total > 0).then(|| self.primary_hits as f64 / total as f64)
    }
}

/// Stats shared between the foreground path and background tasks
///
/// One mutex around the whole struct. A poisoned lock still yields the
/// counters; they are plain integers and cannot be left half-updated.
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedStats(Arc<Mutex<ManagerStats>>);

impl SharedStats {
    pub(crate) fn record(&self, update: impl FnOnce(&mut ManagerStats)) {
        let mut stats = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        update(&mut stats);
    }

    pub(crate) fn snapshot(&self) -> ManagerStats {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
