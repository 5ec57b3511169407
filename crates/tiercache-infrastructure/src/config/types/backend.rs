//! Backend configuration types

use serde::{Deserialize, Serialize};
use tiercache_domain::constants::{BACKEND_MEMORY, DEFAULT_NAMESPACE};
use tiercache_domain::registry::CacheProviderConfig;

/// One cache tier
///
/// `provider` names a registered backend (`memory`, `redis`, `null`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Registered backend name
    pub provider: String,

    /// Key prefix applied by the backend
    pub namespace: String,

    /// Connection URI for remote backends
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// Expired-entry sweep period for the memory backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sweep_interval_secs: Option<u64>,
}

impl BackendConfig {
    /// Backend with the default namespace
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ..Self::default()
        }
    }

    /// Redis backend at `uri`
    pub fn redis(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            ..Self::new(tiercache_domain::constants::BACKEND_REDIS)
        }
    }

    /// Set the namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Registry lookup parameters for this backend
    pub fn to_provider_config(&self) -> CacheProviderConfig {
        CacheProviderConfig {
            provider: self.provider.clone(),
            namespace: self.namespace.clone(),
            uri: self.uri.clone(),
            sweep_interval_secs: self.sweep_interval_secs,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: BACKEND_MEMORY.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            uri: None,
            sweep_interval_secs: None,
        }
    }
}
