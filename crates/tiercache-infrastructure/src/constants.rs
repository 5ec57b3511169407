//! Infrastructure layer constants
//!
//! Contains constants that are part of the infrastructure implementation.
//! Domain-specific constants are defined in `tiercache_domain::constants`.

use std::time::Duration;

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "tiercache.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "tiercache";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "TIERCACHE";

/// Separator for nested keys in environment variables (`TIERCACHE_MANAGER__RETRY_ATTEMPTS`)
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable overriding the configured log filter
pub const LOG_FILTER_ENV: &str = "TIERCACHE_LOG";

/// File stem used when the log path has none
pub const LOG_FILE_STEM: &str = "tiercache";

// ============================================================================
// MANAGER CONSTANTS
// ============================================================================

/// Default number of retries after the first failed primary call
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 2;

/// Default delay between primary retries in milliseconds
pub const DEFAULT_RETRY_DELAY_MS: u64 = 100;

/// Default health check period in seconds
pub const DEFAULT_HEALTH_CHECK_INTERVAL_SECS: u64 = 30;

/// Largest accepted health check or sweep interval in seconds (one year)
pub const MAX_BACKGROUND_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;

/// Upper bound on waiting for in-flight replications during `close()`
pub const REPLICATION_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Name reported by the tiered manager through `Cache::backend_name`
pub const BACKEND_TIERED: &str = "tiered";

/// Health check name of the primary tier
pub const PRIMARY_TIER: &str = "primary";

/// Health check name of the secondary tier
pub const SECONDARY_TIER: &str = "secondary";
