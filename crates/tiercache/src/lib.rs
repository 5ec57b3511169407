//! # tiercache
//!
//! Two-tier caching: a uniform [`Cache`] contract, interchangeable backends
//! (in-process memory, Redis) and a [`CacheManager`] that composes a primary
//! and a secondary tier with retry, fallback, background replication and
//! periodic health checks.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tiercache::{CacheManager, ManagerConfig, MemoryCache, RedisCache, TypedCache};
//!
//! let memory = Arc::new(MemoryCache::with_namespace("quests"));
//! let redis = Arc::new(RedisCache::new("redis://localhost:6379", "quests")?);
//! let manager = Arc::new(CacheManager::new(memory, Some(redis), ManagerConfig::default()));
//!
//! let quests: TypedCache<Quest> = TypedCache::new(manager.clone());
//! quests.set("daily", &quest, Duration::from_secs(3600)).await?;
//! ```
//!
//! ## Architecture
//!
//! - `domain` - `Cache` port, error taxonomy, backend registry
//! - `providers` - memory, Redis and null backends
//! - `infrastructure` - manager, typed wrapper, configuration, logging

/// Domain layer - `Cache` port, errors and registry
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use tiercache_domain::*;
}

/// Backend implementations
///
/// Re-exports from the providers crate for convenience
pub mod providers {
    pub use tiercache_providers::*;
}

/// Infrastructure layer - manager, config, logging and health
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use tiercache_infrastructure::*;
}

// Re-export commonly used types at the crate root
pub use domain::{Cache, Error, KeyTtl, NO_EXPIRATION, Result};
pub use infrastructure::cache::{
    CacheManager, ManagerStats, TypedCache, build_cache, build_cache_manager,
};
pub use infrastructure::config::{AppConfig, BackendConfig, ConfigLoader, ManagerConfig};
pub use providers::cache::{MemoryCache, MemoryStore, NullCache, RedisCache};
