//! Null cache backend
//!
//! Accepts every write and never returns a value. Used when caching is
//! disabled and as a stand-in tier in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tiercache_domain::constants::BACKEND_NULL;
use tiercache_domain::error::{Error, Result};
use tiercache_domain::ports::{Cache, KeyTtl};

/// No-op cache backend
#[derive(Debug, Default)]
pub struct NullCache {
    closed: AtomicBool,
}

impl NullCache {
    /// Create a new null cache
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(Error::closed(BACKEND_NULL))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Cache for NullCache {
    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<()> {
        self.ensure_open()
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.ensure_open()?;
        Err(Error::not_found(key))
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        self.ensure_open()
    }

    async fn exists(&self, _key: &str) -> Result<bool> {
        self.ensure_open()?;
        Ok(false)
    }

    async fn set_batch(&self, _items: HashMap<String, Vec<u8>>, _ttl: Duration) -> Result<()> {
        self.ensure_open()
    }

    async fn get_batch(&self, _keys: &[String]) -> Result<HashMap<String, Vec<u8>>> {
        self.ensure_open()?;
        Ok(HashMap::new())
    }

    async fn delete_batch(&self, _keys: &[String]) -> Result<()> {
        self.ensure_open()
    }

    async fn set_ttl(&self, key: &str, _ttl: Duration) -> Result<()> {
        self.ensure_open()?;
        Err(Error::not_found(key))
    }

    async fn get_ttl(&self, key: &str) -> Result<KeyTtl> {
        self.ensure_open()?;
        Err(Error::not_found(key))
    }

    async fn clear(&self) -> Result<()> {
        self.ensure_open()
    }

    async fn flush_db(&self) -> Result<()> {
        self.ensure_open()
    }

    async fn ping(&self) -> Result<()> {
        self.ensure_open()
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }

    fn backend_name(&self) -> &str {
        BACKEND_NULL
    }
}

// ============================================================================
// Auto-registration via linkme
// ============================================================================

use tiercache_domain::registry::{CACHE_PROVIDERS, CacheProviderConfig, CacheProviderEntry};

fn null_cache_factory(_config: &CacheProviderConfig) -> Result<Arc<dyn Cache>> {
    Ok(Arc::new(NullCache::new()))
}

#[linkme::distributed_slice(CACHE_PROVIDERS)]
static NULL_PROVIDER: CacheProviderEntry = CacheProviderEntry {
    name: BACKEND_NULL,
    description: "No-op cache that always misses",
    factory: null_cache_factory,
};
