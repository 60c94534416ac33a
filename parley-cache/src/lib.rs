//! Advisory cache for translation results.
//!
//! Entries are keyed by a [`TranslationCacheKey`] fingerprint and written with
//! a TTL. The cache never decides correctness: a miss, an expired entry or a
//! backend error only means the provider is called again.
//!
//! ## Backends
//!
//! - [`RedisCache`]: shared across processes (feature `redis`, on by default)
//! - [`InMemoryCache`]: process-local, used in tests
//!
//! ```
//! use parley_cache::*;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> CacheResult<()> {
//! let cache = InMemoryCache::new();
//! let key = TranslationCacheKey::new("Hello", "auto")
//!     .target("en", "gpt-4o-mini", None)
//!     .build();
//!
//! set_typed(&cache, &key, &vec!["Hello"], Some(Duration::from_secs(60))).await?;
//! let cached: Option<Vec<String>> = get_typed(&cache, &key).await?;
//! assert_eq!(cached, Some(vec!["Hello".to_string()]));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod key;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_cache;
pub mod traits;

pub use config::CacheConfig;
pub use error::{CacheError, CacheResult};
pub use key::{KEY_PREFIX, TranslationCacheKey};
pub use memory::InMemoryCache;
#[cfg(feature = "redis")]
pub use redis_cache::RedisCache;
pub use traits::{CacheStore, get_typed, set_typed};
