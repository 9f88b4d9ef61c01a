//! Cache store interface.

use crate::CacheResult;
use async_trait::async_trait;
use folio_core::Interface;
use std::time::Duration;

/// Remaining lifetime of a key, as reported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTtl {
    /// The key does not exist.
    Missing,
    /// The key exists without an expiry.
    Persistent,
    /// The key expires after this many seconds.
    Expires(u64),
}

impl KeyTtl {
    /// Decodes a Redis `TTL` reply.
    #[must_use]
    pub fn from_redis(reply: i64) -> Self {
        match reply {
            -2 => Self::Missing,
            n if n < 0 => Self::Persistent,
            n => Self::Expires(n.unsigned_abs()),
        }
    }
}

/// Outcome of a bounded increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedIncr {
    /// Counter value after the operation.
    pub count: u64,
    /// False when the counter was already at the limit and left untouched.
    pub incremented: bool,
    /// Remaining window in seconds.
    pub ttl_secs: u64,
}

/// Key/value cache and counter store.
///
/// Keys are UTF-8 strings and values are opaque strings (JSON for cached
/// entities, decimal integers for counters). Implementations report every
/// failure; deciding whether to fail soft is up to the caller.
#[async_trait]
pub trait CacheStore: Interface + Send + Sync {
    /// Gets a raw value.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Sets a raw value with a TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Deletes a key. Returns `true` if the key existed.
    async fn del(&self, key: &str) -> CacheResult<bool>;

    /// Deletes every key matching a glob pattern. Returns the number deleted.
    async fn del_by_pattern(&self, pattern: &str) -> CacheResult<u64>;

    /// Increments a counter, creating it at 1.
    async fn incr(&self, key: &str) -> CacheResult<u64>;

    /// Sets a TTL on an existing key. Returns `false` if the key is missing.
    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<bool>;

    /// Reads the remaining lifetime of a key.
    async fn ttl(&self, key: &str) -> CacheResult<KeyTtl>;

    /// Increments a counter unless it already reached `limit`, in a single
    /// atomic step.
    ///
    /// The window TTL is applied when the counter is created, and re-applied
    /// to a counter found without one.
    async fn incr_bounded(&self, key: &str, limit: u64, window: Duration)
        -> CacheResult<BoundedIncr>;

    /// Checks connectivity.
    async fn ping(&self) -> CacheResult<()>;

    /// Releases connections. Later calls fail.
    async fn close(&self);

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ttl_from_redis() {
        assert_eq!(KeyTtl::from_redis(-2), KeyTtl::Missing);
        assert_eq!(KeyTtl::from_redis(-1), KeyTtl::Persistent);
        assert_eq!(KeyTtl::from_redis(0), KeyTtl::Expires(0));
        assert_eq!(KeyTtl::from_redis(42), KeyTtl::Expires(42));
    }
}
