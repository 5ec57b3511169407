//! Port definitions
//!
//! Traits implemented by the provider crate and consumed by the
//! infrastructure layer.

pub mod cache;

pub use cache::{Cache, KeyTtl, NO_EXPIRATION, namespaced_key};
