//! Main application configuration

use super::{BackendConfig, LoggingConfig, ManagerConfig};
use serde::{Deserialize, Serialize};

/// Root configuration
///
/// ```toml
/// [primary]
/// provider = "memory"
/// namespace = "quests"
///
/// [secondary]
/// provider = "redis"
/// namespace = "quests"
/// uri = "redis://localhost:6379"
///
/// [manager]
/// retry_attempts = 3
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Primary tier
    pub primary: BackendConfig,

    /// Optional secondary tier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<BackendConfig>,

    /// Manager policy
    pub manager: ManagerConfig,
}
