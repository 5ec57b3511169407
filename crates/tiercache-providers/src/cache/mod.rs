//! Cache Backend Implementations
//!
//! ## Available Backends
//!
//! | Backend | Type | Description |
//! |---------|------|-------------|
//! | [`NullCache`] | Testing | No-op stub, always misses |
//! | [`MemoryCache`] | Local | In-process store (fast, per process) |
//! | [`RedisCache`] | Remote | Shared store for multi-instance deployments |
//!
//! ## Backend Selection Guide
//!
//! - **Primary tier**: `MemoryCache` for latency, `RedisCache` when several
//!   processes must see the same data
//! - **Secondary tier**: the other one
//! - **Tests / disabled caching**: `NullCache`

#[cfg(feature = "cache-memory")]
pub mod entry;
#[cfg(feature = "cache-memory")]
pub mod memory;
pub mod null;
#[cfg(feature = "cache-redis")]
pub mod redis;

#[cfg(feature = "cache-memory")]
pub use entry::{CacheEntry, EntryInfo};
#[cfg(feature = "cache-memory")]
pub use memory::{MemoryCache, MemoryStore};
pub use null::NullCache;
#[cfg(feature = "cache-redis")]
pub use redis::RedisCache;
