//! # Folio Cache
//!
//! Key/value cache and counter store shared by the content cache and the
//! rate limiter.
//!
//! ```text
//! CacheClient            (typed JSON, fail-soft, command timeout, metrics)
//!   ↓  Arc<dyn CacheStore>
//! RedisCacheStore        (deadpool-redis)  |  InMemoryCacheStore
//! ```

pub mod client;
pub mod error;
pub mod keys;
pub mod memory_store;
pub mod metrics;
pub mod redis_store;
pub mod store;

pub use client::{CacheClient, DEFAULT_COMMAND_TIMEOUT};
pub use error::{CacheError, CacheResult};
pub use keys::CacheKeys;
pub use memory_store::InMemoryCacheStore;
pub use self::metrics::{register_metrics, CacheMetrics};
pub use redis_store::RedisCacheStore;
pub use store::{BoundedIncr, CacheStore, KeyTtl};

use folio_config::{CacheConfig, RedisConfig};
use std::sync::Arc;
use tracing::info;

/// Builds the cache client described by the configuration.
///
/// A disabled Redis section yields [`CacheClient::disabled`]. A configured
/// but unreachable Redis is an error, so misconfiguration surfaces at
/// startup rather than as a silent permanent miss.
pub async fn connect(redis: &RedisConfig, cache: &CacheConfig) -> CacheResult<CacheClient> {
    if !redis.enabled {
        info!("Redis disabled, caching is off");
        return Ok(CacheClient::disabled());
    }

    let store = RedisCacheStore::connect(redis).await?;
    Ok(CacheClient::new(Arc::new(store), cache.command_timeout()))
}
