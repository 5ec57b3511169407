//! Configuration loader
//!
//! Handles loading configuration from various sources including
//! TOML files, environment variables, and default values.

use crate::config::{AppConfig, BackendConfig, LoggingConfig, ManagerConfig};
use crate::constants::{
    CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILENAME,
    MAX_BACKGROUND_INTERVAL_SECS,
};
use crate::error_ext::ErrorContext;
use crate::logging::log_config_loaded;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use std::env;
use std::path::{Path, PathBuf};
use tiercache_domain::constants::{BACKEND_REDIS, NAMESPACE_SEPARATOR};
use tiercache_domain::error::{Error, Result};
use tiercache_domain::registry::{is_registered, list_cache_providers};
use tracing::warn;

/// Configuration loader service
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,

    /// Environment prefix
    env_prefix: String,
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources
    ///
    /// Configuration sources are merged in this order (later sources override earlier):
    /// 1. Default values from `AppConfig::default()`
    /// 2. TOML configuration file (explicit path, or the first default location found)
    /// 3. Environment variables with prefix (e.g., `TIERCACHE_MANAGER__RETRY_ATTEMPTS`)
    ///
    /// An explicit path that does not exist is logged and skipped.
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if let Some(config_path) = &self.config_path {
            let found = config_path.exists();
            if found {
                figment = figment.merge(Toml::file(config_path));
            }
            log_config_loaded(config_path, found);
        } else if let Some(default_path) = Self::find_default_config_path() {
            figment = figment.merge(Toml::file(&default_path));
            log_config_loaded(&default_path, true);
        }

        figment = figment.merge(
            Env::prefixed(&format!("{}_", self.env_prefix)).split(CONFIG_ENV_SEPARATOR),
        );

        let app_config: AppConfig = figment
            .extract()
            .config_context("Failed to extract configuration")?;

        validate_app_config(&app_config)?;

        Ok(app_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &AppConfig, path: P) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(config).config_context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), toml_string).io_context("Failed to write config file")?;

        Ok(())
    }

    /// Get the configured file path
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Find the first existing default configuration file
    fn find_default_config_path() -> Option<PathBuf> {
        let current_dir = env::current_dir().ok()?;

        let candidates = [
            Some(current_dir.join(DEFAULT_CONFIG_FILENAME)),
            Some(
                current_dir
                    .join(DEFAULT_CONFIG_DIR)
                    .join(DEFAULT_CONFIG_FILENAME),
            ),
            dirs::config_dir().map(|d| d.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME)),
        ];

        candidates.into_iter().flatten().find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate application configuration
///
/// Rejects settings that cannot produce a working manager. Policy flags
/// that have no effect without a secondary tier are only warned about.
pub fn validate_app_config(config: &AppConfig) -> Result<()> {
    crate::logging::parse_log_level(&config.logging.level)?;
    validate_interval("manager health check", config.manager.health_check_interval_secs)?;
    validate_backend_config("primary", &config.primary)?;
    if let Some(secondary) = &config.secondary {
        validate_backend_config("secondary", secondary)?;
    } else {
        warn_secondary_only_flags(&config.manager);
    }
    Ok(())
}

fn validate_backend_config(tier: &str, backend: &BackendConfig) -> Result<()> {
    if !is_registered(&backend.provider) {
        let available: Vec<&str> = list_cache_providers().into_iter().map(|(n, _)| n).collect();
        return Err(Error::configuration(format!(
            "Unknown {tier} cache provider '{}'. Available providers: {available:?}",
            backend.provider
        )));
    }
    if backend.namespace.trim().is_empty() {
        return Err(Error::configuration(format!(
            "{tier} cache namespace cannot be empty"
        )));
    }
    if backend.namespace.contains(NAMESPACE_SEPARATOR) {
        return Err(Error::configuration(format!(
            "{tier} cache namespace '{}' cannot contain '{NAMESPACE_SEPARATOR}'",
            backend.namespace
        )));
    }
    if backend.provider == BACKEND_REDIS
        && backend.uri.as_deref().is_none_or(|uri| uri.trim().is_empty())
    {
        return Err(Error::configuration(format!(
            "{tier} redis cache requires a uri"
        )));
    }
    if backend.sweep_interval_secs == Some(0) {
        return Err(Error::configuration(format!(
            "{tier} cache sweep interval cannot be 0"
        )));
    }
    if let Some(secs) = backend.sweep_interval_secs {
        validate_interval(&format!("{tier} cache sweep"), secs)?;
    }
    Ok(())
}

fn validate_interval(what: &str, secs: u64) -> Result<()> {
    if secs > MAX_BACKGROUND_INTERVAL_SECS {
        return Err(Error::configuration(format!(
            "{what} interval of {secs}s exceeds the maximum of {MAX_BACKGROUND_INTERVAL_SECS}s"
        )));
    }
    Ok(())
}

fn warn_secondary_only_flags(manager: &ManagerConfig) {
    for (flag, enabled) in [
        ("sync_to_secondary", manager.sync_to_secondary),
        ("fallback_on_write_error", manager.fallback_on_write_error),
        ("use_fallback_on_read", manager.use_fallback_on_read),
    ] {
        if enabled {
            warn!(flag, "Manager flag has no effect without a secondary cache");
        }
    }
}

/// Configuration builder for programmatic configuration
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: AppConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set logging configuration
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// Set the primary tier
    pub fn with_primary(mut self, primary: BackendConfig) -> Self {
        self.config.primary = primary;
        self
    }

    /// Set the secondary tier
    pub fn with_secondary(mut self, secondary: BackendConfig) -> Self {
        self.config.secondary = Some(secondary);
        self
    }

    /// Set the manager policy
    pub fn with_manager(mut self, manager: ManagerConfig) -> Self {
        self.config.manager = manager;
        self
    }

    /// Build the configuration
    pub fn build(self) -> AppConfig {
        self.config
    }
}
