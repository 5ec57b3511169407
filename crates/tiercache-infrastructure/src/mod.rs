// Clippy allows for nested policy checks in the manager
#![allow(clippy::collapsible_if)]

//! # Infrastructure Layer
//!
//! Tiered cache management and the cross-cutting concerns around it.
//!
//! ## Module Categories
//!
//! ### Caching
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | `CacheManager`, typed wrapper, construction from config |
//!
//! ### Configuration
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Figment-layered TOML + environment configuration |
//! | [`constants`] | Centralized configuration constants |
//!
//! ### Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`health`] | Health report types |
//! | [`logging`] | Structured logging with tracing |

// Backends register themselves in the provider registry at link time
extern crate tiercache_providers;

pub mod cache;
pub mod config;
pub mod constants;
pub mod error_ext;
pub mod health;
pub mod logging;
pub mod utils;

// Re-export commonly used types
pub use cache::{CacheManager, ManagerStats, TypedCache};
pub use error_ext::ErrorContext;
pub use utils::TimedOperation;
