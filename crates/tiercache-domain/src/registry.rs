//! Cache Backend Registry
//!
//! Auto-registration system for cache backends. Each backend registers a
//! [`CacheProviderEntry`] into the [`CACHE_PROVIDERS`] distributed slice at
//! compile time, and configuration picks one by name at runtime.

use std::sync::Arc;

use crate::constants::DEFAULT_NAMESPACE;
use crate::error::{Error, Result};
use crate::ports::Cache;

/// Configuration for cache backend creation
///
/// Contains every option a backend might need. Backends use what they need
/// and ignore the rest.
#[derive(Debug, Clone)]
pub struct CacheProviderConfig {
    /// Backend name (e.g., "memory", "redis", "null")
    pub provider: String,
    /// Namespace prefix applied to every key
    pub namespace: String,
    /// Connection URI (for remote backends)
    pub uri: Option<String>,
    /// Expired-entry sweep period in seconds (for in-process backends)
    pub sweep_interval_secs: Option<u64>,
}

impl CacheProviderConfig {
    /// Create a new config with the given backend name
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            uri: None,
            sweep_interval_secs: None,
        }
    }

    /// Set the namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the URI
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Set the sweep interval
    pub fn with_sweep_interval_secs(mut self, secs: u64) -> Self {
        self.sweep_interval_secs = Some(secs);
        self
    }
}

/// Factory function signature for backend creation
pub type CacheFactory = fn(&CacheProviderConfig) -> Result<Arc<dyn Cache>>;

/// Registry entry for cache backends
pub struct CacheProviderEntry {
    /// Unique backend name
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Factory function to create a backend instance
    pub factory: CacheFactory,
}

#[linkme::distributed_slice]
pub static CACHE_PROVIDERS: [CacheProviderEntry] = [..];

/// Resolve a cache backend by name from the registry
///
/// Returns a `Configuration` error listing the registered names when no
/// backend matches.
pub fn resolve_cache_provider(config: &CacheProviderConfig) -> Result<Arc<dyn Cache>> {
    if let Some(entry) = CACHE_PROVIDERS.iter().find(|e| e.name == config.provider) {
        return (entry.factory)(config);
    }

    let available: Vec<&str> = CACHE_PROVIDERS.iter().map(|e| e.name).collect();
    Err(Error::configuration(format!(
        "Unknown cache provider '{}'. Available providers: {:?}",
        config.provider, available
    )))
}

/// List all registered cache backends as `(name, description)` pairs
pub fn list_cache_providers() -> Vec<(&'static str, &'static str)> {
    CACHE_PROVIDERS
        .iter()
        .map(|e| (e.name, e.description))
        .collect()
}

/// True if a backend with this name is registered
pub fn is_registered(name: &str) -> bool {
    CACHE_PROVIDERS.iter().any(|e| e.name == name)
}
