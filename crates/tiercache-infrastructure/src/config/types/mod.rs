//! Configuration types module

pub mod app;
pub mod backend;
pub mod logging;
pub mod manager;

// Re-export main types
pub use app::AppConfig;
pub use backend::BackendConfig;
pub use logging::LoggingConfig;
pub use manager::ManagerConfig;
