//! Tiered caching
//!
//! - [`CacheManager`]: primary/secondary composition with retry, fallback,
//!   replication and health checks
//! - [`TypedCache`]: serde view over any [`Cache`](tiercache_domain::ports::Cache)
//! - [`factory`]: builds tiers and managers from configuration

pub mod factory;
pub mod manager;
pub mod typed;

pub use factory::{build_cache, build_cache_manager};
pub use manager::{CacheManager, ManagerStats};
pub use typed::TypedCache;
