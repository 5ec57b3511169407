//! Domain constants

use std::time::Duration;

/// Namespace used when a backend is created without one
pub const DEFAULT_NAMESPACE: &str = "tiercache";

/// Separator between namespace and key in physical keys
pub const NAMESPACE_SEPARATOR: char = ':';

/// Upper bound for a single ping issued by health checks
pub const HEALTH_PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Backend name of the in-process store
pub const BACKEND_MEMORY: &str = "memory";

/// Backend name of the Redis store
pub const BACKEND_REDIS: &str = "redis";

/// Backend name of the no-op store
pub const BACKEND_NULL: &str = "null";
