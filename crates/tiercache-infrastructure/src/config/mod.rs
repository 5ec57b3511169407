//! Configuration management
//!
//! Layered configuration with Figment: defaults, then a TOML file, then
//! `TIERCACHE_`-prefixed environment variables (`__` separates nesting).

pub mod loader;
pub mod types;

pub use loader::{ConfigBuilder, ConfigLoader};
pub use types::{AppConfig, BackendConfig, LoggingConfig, ManagerConfig};
