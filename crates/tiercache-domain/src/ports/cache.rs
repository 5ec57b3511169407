//! Cache Port
//!
//! Single-tier key/value contract implemented by every backend. Values are
//! opaque byte payloads; typed access is layered on top by the
//! infrastructure crate.
//!
//! ## Cancellation
//!
//! Calls are bounded by the caller: drop the future or wrap it in
//! `tokio::time::timeout`. Implementations must not hold locks across
//! `.await` points that would make a dropped call leave state inconsistent.
//!
//! ## Implementations
//!
//! - **memory**: in-process store with per-entry TTL and a background sweeper
//! - **redis**: remote store shared by every process pointing at it
//! - **null**: accepts writes and always misses

use crate::constants::NAMESPACE_SEPARATOR;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// TTL value meaning "never expires"
pub const NO_EXPIRATION: Duration = Duration::ZERO;

/// Remaining lifetime of a stored key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "remaining_ms")]
pub enum KeyTtl {
    /// Entry has no expiration
    Persistent,
    /// Entry expires after the given duration
    #[serde(with = "duration_ms")]
    Remaining(Duration),
}

impl KeyTtl {
    /// Build from a TTL where zero means "no expiration"
    pub fn from_ttl(ttl: Duration) -> Self {
        if ttl.is_zero() {
            Self::Persistent
        } else {
            Self::Remaining(ttl)
        }
    }

    /// Remaining duration, `None` for persistent entries
    pub fn remaining(&self) -> Option<Duration> {
        match self {
            Self::Persistent => None,
            Self::Remaining(d) => Some(*d),
        }
    }

    /// True if the entry never expires
    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::Persistent)
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// Build the physical key `"{namespace}:{key}"`
///
/// Namespaces must not contain [`NAMESPACE_SEPARATOR`]; otherwise `"a"` +
/// `"b:k"` and `"a:b"` + `"k"` map to the same physical key.
pub fn namespaced_key(namespace: &str, key: &str) -> String {
    format!("{namespace}{NAMESPACE_SEPARATOR}{key}")
}

/// Cache Port
///
/// Defines the contract for cache backends. All keys passed in are logical
/// keys; backends apply their own namespace prefix.
///
/// # Example
///
/// ```ignore
/// use tiercache_domain::ports::{Cache, NO_EXPIRATION};
///
/// cache.set("player:42", payload, Duration::from_secs(60)).await?;
/// match cache.get("player:42").await {
///     Ok(bytes) => { /* hit */ }
///     Err(e) if e.is_miss() => { /* absent or expired */ }
///     Err(e) => return Err(e),
/// }
/// ```
#[async_trait]
pub trait Cache: Send + Sync + std::fmt::Debug {
    /// Store a value, overwriting any previous one
    ///
    /// A `ttl` of [`NO_EXPIRATION`] stores the value without expiration.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;

    /// Read a value
    ///
    /// Fails with `NotFound` if the key is absent and `Expired` if its TTL
    /// has elapsed but it has not been removed yet.
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Remove a value; removing a missing key succeeds
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check presence with the same expiry rule as [`Cache::get`]
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Store several values with one TTL
    async fn set_batch(&self, items: HashMap<String, Vec<u8>>, ttl: Duration) -> Result<()>;

    /// Read several values; missing or expired keys are omitted from the map
    async fn get_batch(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>>;

    /// Remove several values
    async fn delete_batch(&self, keys: &[String]) -> Result<()>;

    /// Replace the TTL of an existing key ([`NO_EXPIRATION`] makes it persistent)
    async fn set_ttl(&self, key: &str, ttl: Duration) -> Result<()>;

    /// Read the remaining lifetime of a key
    async fn get_ttl(&self, key: &str) -> Result<KeyTtl>;

    /// Remove every entry under this cache's namespace
    async fn clear(&self) -> Result<()>;

    /// Remove every entry in the backend, other namespaces included
    async fn flush_db(&self) -> Result<()>;

    /// Liveness probe; must not mutate state
    async fn ping(&self) -> Result<()>;

    /// Release resources; later calls fail with `Closed`
    async fn close(&self) -> Result<()>;

    /// Identifier of the backend (e.g., "memory", "redis", "null")
    fn backend_name(&self) -> &str;
}
