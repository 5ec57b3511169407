//! # tiercache - Backend Implementations
//!
//! Each backend implements the [`Cache`] port defined in `tiercache-domain`
//! and registers itself in the backend registry so configuration can
//! select it by name.
//!
//! | Backend | Type | Description |
//! |---------|------|-------------|
//! | [`MemoryCache`](cache::MemoryCache) | Local | In-process map with per-entry TTL and sweeper |
//! | [`RedisCache`](cache::RedisCache) | Remote | Redis-backed, shared across processes |
//! | [`NullCache`](cache::NullCache) | Testing | Accepts writes, always misses |
//!
//! ## Feature Flags
//!
//! ```toml
//! [dependencies]
//! tiercache-providers = { version = "0.1", features = ["cache-all"] }
//! ```

// Re-export domain types commonly used with providers
pub use tiercache_domain::error::{Error, Result};
pub use tiercache_domain::ports::Cache;

/// Provider-specific constants
pub mod constants;

/// Cache backend implementations
pub mod cache;
