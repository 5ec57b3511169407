//! Typed access over a byte cache
//!
//! [`TypedCache`] encodes values as JSON before they reach a [`Cache`].
//! Encoding and decoding failures surface as [`Error::Invalid`].

use crate::error_ext::ErrorContext;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tiercache_domain::error::{Error, Result};
use tiercache_domain::ports::Cache;

/// JSON-encoded view of a cache for values of type `V`
///
/// # Example
///
/// ```ignore
/// let players: TypedCache<Player> = TypedCache::new(manager.clone());
/// players.set("42", &player, Duration::from_secs(300)).await?;
/// let player = players.get("42").await?;
/// ```
pub struct TypedCache<V> {
    cache: Arc<dyn Cache>,
    _value: PhantomData<fn() -> V>,
}

impl<V> TypedCache<V>
where
    V: Serialize + DeserializeOwned,
{
    /// Wrap a cache
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self {
            cache,
            _value: PhantomData,
        }
    }

    /// Underlying byte cache
    pub fn inner(&self) -> &Arc<dyn Cache> {
        &self.cache
    }

    /// Encode and store a value
    pub async fn set(&self, key: &str, value: &V, ttl: Duration) -> Result<()> {
        let bytes = encode(key, value)?;
        self.cache.set(key, bytes, ttl).await
    }

    /// Fetch and decode a value
    pub async fn get(&self, key: &str) -> Result<V> {
        let bytes = self.cache.get(key).await?;
        decode(key, &bytes)
    }

    /// Fetch and decode a value, mapping misses to `None`
    pub async fn get_optional(&self, key: &str) -> Result<Option<V>> {
        match self.get(key).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_miss() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Encode and store several values
    pub async fn set_batch(&self, items: &HashMap<String, V>, ttl: Duration) -> Result<()> {
        let encoded = items
            .iter()
            .map(|(key, value)| -> Result<(String, Vec<u8>)> {
                Ok((key.clone(), encode(key, value)?))
            })
            .collect::<Result<HashMap<_, _>>>()?;
        self.cache.set_batch(encoded, ttl).await
    }

    /// Fetch and decode several values; missing keys are omitted
    ///
    /// One undecodable value fails the whole call.
    pub async fn get_batch(&self, keys: &[String]) -> Result<HashMap<String, V>> {
        self.cache
            .get_batch(keys)
            .await?
            .into_iter()
            .map(|(key, bytes)| -> Result<(String, V)> {
                let value = decode(&key, &bytes)?;
                Ok((key, value))
            })
            .collect()
    }

    /// Remove a value
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.cache.delete(key).await
    }

    /// Check for a live value
    pub async fn exists(&self, key: &str) -> Result<bool> {
        self.cache.exists(key).await
    }
}

impl<V> Clone for TypedCache<V> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            _value: PhantomData,
        }
    }
}

impl<V> std::fmt::Debug for TypedCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedCache")
            .field("cache", &self.cache)
            .field("value", &std::any::type_name::<V>())
            .finish()
    }
}

fn encode<V: Serialize>(key: &str, value: &V) -> Result<Vec<u8>> {
    serde_json::to_vec(value).codec_context(format!("Failed to encode value for key '{key}'"))
}

fn decode<V: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<V> {
    if bytes.is_empty() {
        return Err(Error::invalid(format!("Empty payload for key '{key}'")));
    }
    serde_json::from_slice(bytes).codec_context(format!("Failed to decode value for key '{key}'"))
}
