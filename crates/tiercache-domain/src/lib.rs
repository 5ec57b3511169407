//! # tiercache - Domain Layer
//!
//! Core contracts shared by every other crate in the workspace:
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`error`] | Error taxonomy (`NotFound`, `Expired`, `Invalid`, backend errors) |
//! | [`ports`] | The [`Cache`](ports::Cache) trait every backend implements |
//! | [`registry`] | Compile-time backend registration and lookup by name |
//! | [`constants`] | Shared defaults |
//!
//! The domain crate does not depend on any backend client library. Backends
//! live in `tiercache-providers`, orchestration in `tiercache-infrastructure`.

pub mod constants;
pub mod error;
pub mod ports;
pub mod registry;

pub use error::{Error, Result};
pub use ports::{Cache, KeyTtl, NO_EXPIRATION};
