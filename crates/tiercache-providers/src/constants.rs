//! Provider Constants

use std::time::Duration;

/// Default period of the memory backend's expired-entry sweep
pub const MEMORY_DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Default Redis URI used when none is configured
pub const REDIS_DEFAULT_URI: &str = "redis://localhost:6379";

/// Keys requested per SCAN round trip when clearing a namespace
pub const REDIS_SCAN_COUNT: usize = 500;
