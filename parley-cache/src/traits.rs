//! Cache store trait definition.

use crate::error::{CacheError, CacheResult};
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;

/// Cache store trait for different cache backends.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a JSON value from the cache.
    ///
    /// Returns `Ok(None)` when the key is absent or expired.
    async fn get_json(&self, key: &str) -> CacheResult<Option<String>>;

    /// Set a JSON value, expiring after `ttl` when given.
    async fn set_json(&self, key: &str, value: String, ttl: Option<Duration>) -> CacheResult<()>;

    /// Delete a key from the cache.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Check if a key exists in the cache.
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// Remaining lifetime of a key, `None` if it has no expiry or is absent.
    async fn ttl(&self, key: &str) -> CacheResult<Option<Duration>>;
}

/// Typed helpers over any [`CacheStore`].
pub async fn get_typed<T: DeserializeOwned>(
    store: &dyn CacheStore,
    key: &str,
) -> CacheResult<Option<T>> {
    match store.get_json(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| CacheError::Deserialization(e.to_string())),
        None => Ok(None),
    }
}

pub async fn set_typed<T: Serialize + Sync>(
    store: &dyn CacheStore,
    key: &str,
    value: &T,
    ttl: Option<Duration>,
) -> CacheResult<()> {
    let raw = serde_json::to_string(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
    store.set_json(key, raw, ttl).await
}
