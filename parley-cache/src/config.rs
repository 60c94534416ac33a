//! Cache configuration types.

use std::time::Duration;

/// Cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Connection URL
    pub url: String,

    /// Key prefix for all cache keys
    pub key_prefix: Option<String>,

    /// TTL applied when a write does not pass one
    pub default_ttl: Option<Duration>,
}

impl CacheConfig {
    /// Create a Redis cache configuration.
    ///
    /// ```
    /// use parley_cache::CacheConfig;
    ///
    /// let config = CacheConfig::redis("redis://localhost:6379").with_key_prefix("parley");
    /// assert_eq!(config.build_key("translation:ab"), "parley:translation:ab");
    /// ```
    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key_prefix: None,
            default_ttl: None,
        }
    }

    /// Set the key prefix.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Set the default TTL.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Build a full key with the configured prefix.
    pub fn build_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }
}
