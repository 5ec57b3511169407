//! Redis cache backend
//!
//! Remote cache implementation using Redis as the backend. Suitable as the
//! shared tier of a multi-instance deployment.
//!
//! ## Features
//!
//! - Namespace prefix on every key; `clear()` removes only that prefix
//!   (via `SCAN` + `DEL`), `flush_db()` issues `FLUSHDB`
//! - Millisecond TTLs (`PX`, `PEXPIRE`, `PTTL`)
//! - Atomic `MULTI` pipeline for batch writes, `MGET` for batch reads
//! - Lazily established, auto-reconnecting `ConnectionManager`
//!
//! Redis expires keys server-side, so this backend reports elapsed keys as
//! `NotFound`, never `Expired`.
//!
//! ## Example
//!
//! ```ignore
//! use tiercache_providers::cache::RedisCache;
//!
//! let cache = RedisCache::new("redis://localhost:6379", "quests")?;
//! ```

use crate::constants::{REDIS_DEFAULT_URI, REDIS_SCAN_COUNT};
use async_trait::async_trait;
use redis::Client;
use redis::aio::ConnectionManager;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tiercache_domain::constants::BACKEND_REDIS;
use tiercache_domain::error::{Error, Result};
use tiercache_domain::ports::{Cache, KeyTtl, namespaced_key};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// `PTTL` reply for a missing key
const PTTL_MISSING: i64 = -2;
/// `PTTL` reply for a key without expiration
const PTTL_PERSISTENT: i64 = -1;

/// Redis cache backend
pub struct RedisCache {
    client: Client,
    connection: Mutex<Option<ConnectionManager>>,
    namespace: String,
    closed: AtomicBool,
}

impl RedisCache {
    /// Create a Redis cache for the given connection URL and namespace
    ///
    /// Only the URL is validated here; the connection is established on
    /// first use.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let cache = RedisCache::new("redis://localhost:6379", "chat")?;
    /// ```
    pub fn new(connection_string: &str, namespace: impl Into<String>) -> Result<Self> {
        let client = Client::open(connection_string)
            .map_err(|e| Error::backend_with_source("Failed to create Redis client", e))?;

        Ok(Self {
            client,
            connection: Mutex::new(None),
            namespace: namespace.into(),
            closed: AtomicBool::new(false),
        })
    }

    /// Create a Redis cache from host and port
    pub fn with_host_port(host: &str, port: u16, namespace: impl Into<String>) -> Result<Self> {
        Self::new(&format!("redis://{host}:{port}"), namespace)
    }

    /// Namespace applied to every key
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn key(&self, key: &str) -> String {
        namespaced_key(&self.namespace, key)
    }

    /// Get the shared connection, establishing it on first use
    async fn connection(&self) -> Result<ConnectionManager> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::closed(BACKEND_REDIS));
        }

        let mut slot = self.connection.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        let conn = self
            .client
            .get_connection_manager()
            .await
            .map_err(|e| Error::backend_with_source("Failed to connect to Redis", e))?;
        info!(namespace = %self.namespace, "Redis connection established");
        *slot = Some(conn.clone());
        Ok(conn)
    }

    /// Glob pattern matching every key in this namespace
    fn namespace_pattern(&self) -> String {
        format!("{}*", escape_glob(&namespaced_key(&self.namespace, "")))
    }
}

/// Escape Redis glob metacharacters so a namespace matches literally
fn escape_glob(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

fn redis_err(op: &str) -> impl FnOnce(redis::RedisError) -> Error + '_ {
    move |e| Error::backend_with_source(format!("Redis {op} failed"), e)
}

#[async_trait]
impl Cache for RedisCache {
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let mut conn = self.connection().await?;
        let mut cmd = redis::cmd("SET");
        cmd.arg(self.key(key)).arg(value);
        if !ttl.is_zero() {
            cmd.arg("PX").arg(ttl_millis(ttl));
        }
        cmd.query_async::<()>(&mut conn)
            .await
            .map_err(redis_err("SET"))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let mut conn = self.connection().await?;
        let physical = self.key(key);
        let value: Option<Vec<u8>> = redis::cmd("GET")
            .arg(&physical)
            .query_async(&mut conn)
            .await
            .map_err(redis_err("GET"))?;
        value.ok_or_else(|| Error::not_found(physical))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        redis::cmd("DEL")
            .arg(self.key(key))
            .query_async::<i64>(&mut conn)
            .await
            .map(|_| ())
            .map_err(redis_err("DEL"))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let count: i64 = redis::cmd("EXISTS")
            .arg(self.key(key))
            .query_async(&mut conn)
            .await
            .map_err(redis_err("EXISTS"))?;
        Ok(count > 0)
    }

    async fn set_batch(&self, items: HashMap<String, Vec<u8>>, ttl: Duration) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection().await?;
        let mut pipe = redis::pipe();
        pipe.atomic();
        for (key, value) in items {
            let cmd = pipe.cmd("SET").arg(self.key(&key)).arg(value);
            if !ttl.is_zero() {
                cmd.arg("PX").arg(ttl_millis(ttl));
            }
            cmd.ignore();
        }
        pipe.query_async::<()>(&mut conn)
            .await
            .map_err(redis_err("MULTI SET"))
    }

    async fn get_batch(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.connection().await?;
        let physical: Vec<String> = keys.iter().map(|k| self.key(k)).collect();
        let values: Vec<Option<Vec<u8>>> = redis::cmd("MGET")
            .arg(&physical)
            .query_async(&mut conn)
            .await
            .map_err(redis_err("MGET"))?;

        Ok(keys
            .iter()
            .zip(values)
            .filter_map(|(key, value)| value.map(|v| (key.clone(), v)))
            .collect())
    }

    async fn delete_batch(&self, keys: &[String]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection().await?;
        let physical: Vec<String> = keys.iter().map(|k| self.key(k)).collect();
        redis::cmd("DEL")
            .arg(&physical)
            .query_async::<i64>(&mut conn)
            .await
            .map(|_| ())
            .map_err(redis_err("DEL"))
    }

    async fn set_ttl(&self, key: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.connection().await?;
        let physical = self.key(key);

        if ttl.is_zero() {
            // PERSIST replies 0 both for a missing key and a key without TTL
            let exists: i64 = redis::cmd("EXISTS")
                .arg(&physical)
                .query_async(&mut conn)
                .await
                .map_err(redis_err("EXISTS"))?;
            if exists == 0 {
                return Err(Error::not_found(physical));
            }
            return redis::cmd("PERSIST")
                .arg(&physical)
                .query_async::<i64>(&mut conn)
                .await
                .map(|_| ())
                .map_err(redis_err("PERSIST"));
        }

        let updated: i64 = redis::cmd("PEXPIRE")
            .arg(&physical)
            .arg(ttl_millis(ttl))
            .query_async(&mut conn)
            .await
            .map_err(redis_err("PEXPIRE"))?;
        if updated == 0 {
            Err(Error::not_found(physical))
        } else {
            Ok(())
        }
    }

    async fn get_ttl(&self, key: &str) -> Result<KeyTtl> {
        let mut conn = self.connection().await?;
        let physical = self.key(key);
        let pttl: i64 = redis::cmd("PTTL")
            .arg(&physical)
            .query_async(&mut conn)
            .await
            .map_err(redis_err("PTTL"))?;

        match pttl {
            PTTL_MISSING => Err(Error::not_found(physical)),
            PTTL_PERSISTENT => Ok(KeyTtl::Persistent),
            ms => Ok(KeyTtl::Remaining(Duration::from_millis(
                u64::try_from(ms).unwrap_or(0),
            ))),
        }
    }

    async fn clear(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        let pattern = self.namespace_pattern();
        let mut cursor: u64 = 0;
        let mut removed: usize = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(REDIS_SCAN_COUNT)
                .query_async(&mut conn)
                .await
                .map_err(redis_err("SCAN"))?;

            if !keys.is_empty() {
                removed += keys.len();
                redis::cmd("DEL")
                    .arg(&keys)
                    .query_async::<i64>(&mut conn)
                    .await
                    .map_err(redis_err("DEL"))?;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!(namespace = %self.namespace, removed, "Redis namespace cleared");
        Ok(())
    }

    async fn flush_db(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        redis::cmd("FLUSHDB")
            .query_async::<()>(&mut conn)
            .await
            .map_err(redis_err("FLUSHDB"))
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(redis_err("PING"))
    }

    async fn close(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            // Dropping the manager closes its multiplexed connection
            self.connection.lock().await.take();
            debug!(namespace = %self.namespace, "Redis cache closed");
        }
        Ok(())
    }

    fn backend_name(&self) -> &str {
        BACKEND_REDIS
    }
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("namespace", &self.namespace)
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Auto-registration via linkme distributed slice
// ============================================================================

use tiercache_domain::registry::{CACHE_PROVIDERS, CacheProviderConfig, CacheProviderEntry};

/// Factory function for creating Redis cache instances
fn redis_cache_factory(config: &CacheProviderConfig) -> Result<Arc<dyn Cache>> {
    let uri = config.uri.as_deref().unwrap_or(REDIS_DEFAULT_URI);
    Ok(Arc::new(RedisCache::new(uri, config.namespace.clone())?))
}

#[linkme::distributed_slice(CACHE_PROVIDERS)]
static REDIS_PROVIDER: CacheProviderEntry = CacheProviderEntry {
    name: BACKEND_REDIS,
    description: "Redis remote cache",
    factory: redis_cache_factory,
};
