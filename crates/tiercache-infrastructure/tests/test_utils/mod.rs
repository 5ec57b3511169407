//! Shared test doubles

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tiercache_domain::error::{Error, Result};
use tiercache_domain::ports::{Cache, KeyTtl};
use tiercache_providers::cache::MemoryCache;

#[derive(Debug, Clone, Copy)]
enum Failure {
    Always,
    Times(u32),
}

/// Memory-backed cache whose operations can be scripted to fail
///
/// Counts every invocation per operation name, failed or not.
#[derive(Debug)]
pub struct ScriptedCache {
    name: &'static str,
    inner: MemoryCache,
    failures: Mutex<HashMap<&'static str, Failure>>,
    calls: Mutex<HashMap<&'static str, u32>>,
}

impl ScriptedCache {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: MemoryCache::new(name, Duration::ZERO),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Make every call of `op` fail
    pub fn fail_always(&self, op: &'static str) {
        self.failures.lock().unwrap().insert(op, Failure::Always);
    }

    /// Make the next `times` calls of `op` fail
    pub fn fail_times(&self, op: &'static str, times: u32) {
        self.failures
            .lock()
            .unwrap()
            .insert(op, Failure::Times(times));
    }

    /// Number of calls of `op` so far
    pub fn calls(&self, op: &'static str) -> u32 {
        self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    fn enter(&self, op: &'static str) -> Result<()> {
        *self.calls.lock().unwrap().entry(op).or_insert(0) += 1;

        let mut failures = self.failures.lock().unwrap();
        let fail = match failures.get_mut(op) {
            Some(Failure::Always) => true,
            Some(Failure::Times(remaining)) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        };
        if fail {
            Err(Error::backend(format!("{} {op} unavailable", self.name)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Cache for ScriptedCache {
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        self.enter("set")?;
        self.inner.set(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.enter("get")?;
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.enter("delete")?;
        self.inner.delete(key).await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.enter("exists")?;
        self.inner.exists(key).await
    }

    async fn set_batch(&self, items: HashMap<String, Vec<u8>>, ttl: Duration) -> Result<()> {
        self.enter("set_batch")?;
        self.inner.set_batch(items, ttl).await
    }

    async fn get_batch(&self, keys: &[String]) -> Result<HashMap<String, Vec<u8>>> {
        self.enter("get_batch")?;
        self.inner.get_batch(keys).await
    }

    async fn delete_batch(&self, keys: &[String]) -> Result<()> {
        self.enter("delete_batch")?;
        self.inner.delete_batch(keys).await
    }

    async fn set_ttl(&self, key: &str, ttl: Duration) -> Result<()> {
        self.enter("set_ttl")?;
        self.inner.set_ttl(key, ttl).await
    }

    async fn get_ttl(&self, key: &str) -> Result<KeyTtl> {
        self.enter("get_ttl")?;
        self.inner.get_ttl(key).await
    }

    async fn clear(&self) -> Result<()> {
        self.enter("clear")?;
        self.inner.clear().await
    }

    async fn flush_db(&self) -> Result<()> {
        self.enter("flush_db")?;
        self.inner.flush_db().await
    }

    async fn ping(&self) -> Result<()> {
        self.enter("ping")?;
        self.inner.ping().await
    }

    async fn close(&self) -> Result<()> {
        self.enter("close")?;
        self.inner.close().await
    }

    fn backend_name(&self) -> &str {
        self.name
    }
}

/// Yield to spawned tasks until `condition` holds
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..1_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
