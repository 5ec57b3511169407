//! Tiered manager configuration types

use crate::constants::{
    DEFAULT_HEALTH_CHECK_INTERVAL_SECS, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY_MS,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Policy of a [`CacheManager`](crate::cache::CacheManager)
///
/// Immutable once the manager is built; background tasks read a copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Consult the secondary when a primary read fails
    pub use_fallback_on_read: bool,

    /// Write to the secondary when the primary write fails after retries
    pub fallback_on_write_error: bool,

    /// Replicate successful primary writes to the secondary in the background
    pub sync_to_secondary: bool,

    /// Health ping period, 0 disables the loop
    pub health_check_interval_secs: u64,

    /// Retries after the first failed primary call
    pub retry_attempts: u32,

    /// Fixed delay between primary retries
    pub retry_delay_ms: u64,
}

impl ManagerConfig {
    /// Health ping period, `None` when disabled
    pub fn health_check_interval(&self) -> Option<Duration> {
        (self.health_check_interval_secs > 0)
            .then(|| Duration::from_secs(self.health_check_interval_secs))
    }

    /// Delay between primary retries
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Configuration with every optional behavior off
    ///
    /// No fallback, no replication, no health loop, no retries.
    pub fn minimal() -> Self {
        Self {
            use_fallback_on_read: false,
            fallback_on_write_error: false,
            sync_to_secondary: false,
            health_check_interval_secs: 0,
            retry_attempts: 0,
            retry_delay_ms: 0,
        }
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            use_fallback_on_read: true,
            fallback_on_write_error: true,
            sync_to_secondary: true,
            health_check_interval_secs: DEFAULT_HEALTH_CHECK_INTERVAL_SECS,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}
