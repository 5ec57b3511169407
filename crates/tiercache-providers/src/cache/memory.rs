//! In-process memory cache backend
//!
//! Concurrent map of [`CacheEntry`] values with per-entry TTL.
//!
//! ## Locking
//!
//! The map is a `DashMap`. Every operation that reads a value also updates
//! its access metadata, so reads take the shard's exclusive guard
//! (`get_mut`) and perform the liveness check and the metadata update under
//! that one guard. Only `exists` and `get_ttl`, which touch no metadata,
//! use the shared guard.
//!
//! ## Expiry
//!
//! Expired entries are reported as `Expired` until removed. A background
//! sweeper removes them every `sweep_interval` so abandoned keys do not grow
//! memory without read traffic. `close()` stops the sweeper.
//!
//! ## Example
//!
//! ```ignore
//! use tiercache_providers::cache::MemoryCache;
//! use std::time::Duration;
//!
//! let cache = MemoryCache::new("quests", Duration::from_secs(60));
//! ```

use crate::cache::entry::{CacheEntry, EntryInfo};
use crate::constants::MEMORY_DEFAULT_SWEEP_INTERVAL;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tiercache_domain::constants::BACKEND_MEMORY;
use tiercache_domain::error::{Error, Result};
use tiercache_domain::ports::{Cache, KeyTtl, namespaced_key};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Shared entry map
///
/// Cloning is cheap and shares the same map. Several [`MemoryCache`]
/// instances built over one store see each other's entries, so
/// `flush_db` on one of them empties all namespaces, like a shared remote
/// backend would.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, CacheEntry>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of physically present entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no entries are present
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove expired entries whose key starts with `prefix`
    fn purge_expired(&self, prefix: &str, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|k, entry| !(k.starts_with(prefix) && entry.is_expired(now)));
        before.saturating_sub(self.entries.len())
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// In-process cache backend
pub struct MemoryCache {
    store: MemoryStore,
    namespace: String,
    prefix: String,
    sweep_interval: Duration,
    closed: AtomicBool,
    shutdown: CancellationToken,
}

impl MemoryCache {
    /// Create a memory cache with its own store
    ///
    /// Must be called from within a Tokio runtime for the sweeper to start;
    /// outside one the cache works but expired entries are only removed by
    /// [`MemoryCache::purge_expired`] or overwrites.
    pub fn new(namespace: impl Into<String>, sweep_interval: Duration) -> Self {
        Self::with_store(MemoryStore::new(), namespace, sweep_interval)
    }

    /// Create a memory cache with the default sweep interval
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self::new(namespace, MEMORY_DEFAULT_SWEEP_INTERVAL)
    }

    /// Create a memory cache over an existing store
    pub fn with_store(
        store: MemoryStore,
        namespace: impl Into<String>,
        sweep_interval: Duration,
    ) -> Self {
        let namespace = namespace.into();
        let prefix = namespaced_key(&namespace, "");
        let cache = Self {
            store,
            namespace,
            prefix,
            sweep_interval,
            closed: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
        };
        cache.spawn_sweeper();
        cache
    }

    /// Namespace applied to every key
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Underlying store
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Number of entries in this namespace, expired ones included
    pub fn len(&self) -> usize {
        self.store
            .entries
            .iter()
            .filter(|e| e.key().starts_with(&self.prefix))
            .count()
    }

    /// True if this namespace holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Metadata of a stored entry, expired or not
    pub fn entry_info(&self, key: &str) -> Option<EntryInfo> {
        let now = Instant::now();
        self.store
            .entries
            .get(&self.key(key))
            .map(|entry| entry.info(now))
    }

    /// Run one sweep pass now and return the number of entries removed
    pub fn purge_expired(&self) -> usize {
        self.store.purge_expired(&self.prefix, Instant::now())
    }

    fn key(&self, key: &str) -> String {
        namespaced_key(&self.namespace, key)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(Error::closed(BACKEND_MEMORY))
        } else {
            Ok(())
        }
    }

    fn spawn_sweeper(&self) {
        if self.sweep_interval.is_zero() {
            debug!(namespace = %self.namespace, "Memory cache sweeper disabled");
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(
                namespace = %self.namespace,
                "No Tokio runtime available, memory cache sweeper not started"
            );
            return;
        };

        let Some(first_tick) = Instant::now().checked_add(self.sweep_interval) else {
            warn!(
                namespace = %self.namespace,
                sweep_interval_secs = self.sweep_interval.as_secs(),
                "Sweep interval out of range, memory cache sweeper not started"
            );
            return;
        };

        let store = self.store.clone();
        let prefix = self.prefix.clone();
        let namespace = self.namespace.clone();
        let token = self.shutdown.clone();
        let period = self.sweep_interval;

        handle.spawn(async move {
            let mut ticker = tokio::time::interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    () = token.cancelled() => {
                        debug!(namespace = %namespace, "Memory cache sweeper stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let removed = store.purge_expired(&prefix, Instant::now());
                        if removed > 0 {
                            debug!(namespace = %namespace, removed, "Swept expired entries");
                        }
                    }
                }
            }
        });
    }

    /// Read under the exclusive guard, updating access metadata
    fn read_entry(&self, physical: &str, now: Instant) -> Result<Vec<u8>> {
        match self.store.entries.get_mut(physical) {
            None => Err(Error::not_found(physical)),
            Some(mut entry) => {
                if entry.is_expired(now) {
                    Err(Error::expired(physical))
                } else {
                    Ok(entry.touch(now).to_vec())
                }
            }
        }
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        self.ensure_open()?;
        self.store
            .entries
            .insert(self.key(key), CacheEntry::new(value, ttl, Instant::now()));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.ensure_open()?;
        self.read_entry(&self.key(key), Instant::now())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.ensure_open()?;
        self.store.entries.remove(&self.key(key));
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.ensure_open()?;
        let now = Instant::now();
        Ok(self
            .store
            .entries
            .get(&self.key(key))
            .is_some_and(|entry| !entry.is_expired(now)))
    }

    async fn set_batch(&self, items: HashMap<String, Vec<u8>>, ttl: Duration) -> Result<()> {
        self.ensure_open()?;
        let now = Instant::now();
        for (key, value) in items {
            self.store
                .entries
                .insert(self.key(&key), CacheEntry::new(value, ttl, now));
        }
        Ok(())
    }

    async fn get_batch(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>> {
        self.ensure_open()?;
        let now = Instant::now();
        let mut found = HashMap::with_capacity(keys.len());
        for key in keys {
            if let Ok(value) = self.read_entry(&self.key(key), now) {
                found.insert(key.clone(), value);
            }
        }
        Ok(found)
    }

    async fn delete_batch(&self, keys: &[String]) -> Result<()> {
        self.ensure_open()?;
        for key in keys {
            self.store.entries.remove(&self.key(key));
        }
        Ok(())
    }

    async fn set_ttl(&self, key: &str, ttl: Duration) -> Result<()> {
        self.ensure_open()?;
        let physical = self.key(key);
        let now = Instant::now();
        match self.store.entries.get_mut(&physical) {
            None => Err(Error::not_found(physical)),
            Some(entry) if entry.is_expired(now) => Err(Error::expired(physical)),
            Some(mut entry) => {
                entry.set_ttl(ttl, now);
                Ok(())
            }
        }
    }

    async fn get_ttl(&self, key: &str) -> Result<KeyTtl> {
        self.ensure_open()?;
        let physical = self.key(key);
        let now = Instant::now();
        match self.store.entries.get(&physical) {
            None => Err(Error::not_found(physical)),
            Some(entry) if entry.is_expired(now) => Err(Error::expired(physical)),
            Some(entry) => Ok(entry.remaining(now)),
        }
    }

    async fn clear(&self) -> Result<()> {
        self.ensure_open()?;
        self.store
            .entries
            .retain(|k, _| !k.starts_with(&self.prefix));
        debug!(namespace = %self.namespace, "Memory cache namespace cleared");
        Ok(())
    }

    async fn flush_db(&self) -> Result<()> {
        self.ensure_open()?;
        self.store.entries.clear();
        debug!(namespace = %self.namespace, "Memory cache store flushed");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.ensure_open()
    }

    async fn close(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.shutdown.cancel();
            debug!(namespace = %self.namespace, "Memory cache closed");
        }
        Ok(())
    }

    fn backend_name(&self) -> &str {
        BACKEND_MEMORY
    }
}

impl Drop for MemoryCache {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("namespace", &self.namespace)
            .field("sweep_interval", &self.sweep_interval)
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish()
    }
}

// ============================================================================
// Auto-registration via linkme
// ============================================================================

use tiercache_domain::registry::{CACHE_PROVIDERS, CacheProviderConfig, CacheProviderEntry};

fn memory_cache_factory(config: &CacheProviderConfig) -> Result<Arc<dyn Cache>> {
    let sweep_interval = config
        .sweep_interval_secs
        .map_or(MEMORY_DEFAULT_SWEEP_INTERVAL, Duration::from_secs);
    Ok(Arc::new(MemoryCache::new(
        config.namespace.clone(),
        sweep_interval,
    )))
}

#[linkme::distributed_slice(CACHE_PROVIDERS)]
static MEMORY_PROVIDER: CacheProviderEntry = CacheProviderEntry {
    name: BACKEND_MEMORY,
    description: "In-process memory cache with per-entry TTL",
    factory: memory_cache_factory,
};
