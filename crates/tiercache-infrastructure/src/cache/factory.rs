//! Cache construction from configuration
//!
//! Backends are resolved by name through the provider registry, so any
//! registered backend can be used for either tier.

use crate::cache::CacheManager;
use crate::config::loader::validate_app_config;
use crate::config::{AppConfig, BackendConfig};
use std::sync::Arc;
use tiercache_domain::error::Result;
use tiercache_domain::ports::Cache;
use tiercache_domain::registry::resolve_cache_provider;
use tracing::info;

/// Build one tier from its configuration
pub fn build_cache(config: &BackendConfig) -> Result<Arc<dyn Cache>> {
    let cache = resolve_cache_provider(&config.to_provider_config())?;
    info!(
        provider = %config.provider,
        namespace = %config.namespace,
        "Cache backend created"
    );
    Ok(cache)
}

/// Validate `config` and build the manager it describes
///
/// Must be called within a Tokio runtime for background tasks to start.
pub fn build_cache_manager(config: &AppConfig) -> Result<CacheManager> {
    validate_app_config(config)?;

    let primary = build_cache(&config.primary)?;
    let secondary = config.secondary.as_ref().map(build_cache).transpose()?;

    Ok(CacheManager::new(
        primary,
        secondary,
        config.manager.clone(),
    ))
}
