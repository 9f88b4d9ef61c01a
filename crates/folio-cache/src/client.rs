//! Fail-soft cache client.

use crate::metrics::CacheMetrics;
use crate::{BoundedIncr, CacheError, CacheResult, CacheStore};
use folio_core::FolioResult;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default upper bound for a single cache command.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_millis(250);

/// Typed JSON cache over a [`CacheStore`].
///
/// Reads and writes never fail: store errors, timeouts and undecodable
/// entries are logged, counted and turned into a miss or a no-op, so the
/// caller always falls back to the primary store. Counter operations used by
/// the rate limiter do report errors.
#[derive(Clone)]
pub struct CacheClient {
    store: Option<Arc<dyn CacheStore>>,
    timeout: Duration,
}

impl CacheClient {
    /// Creates a client over a store.
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>, timeout: Duration) -> Self {
        Self {
            store: Some(store),
            timeout,
        }
    }

    /// Creates a client that never caches (for when Redis is disabled).
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            store: None,
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Checks if caching is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Command timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs a store command under the command timeout.
    async fn run<T, F, Fut>(&self, operation: &'static str, command: F) -> CacheResult<T>
    where
        F: FnOnce(Arc<dyn CacheStore>) -> Fut,
        Fut: Future<Output = CacheResult<T>>,
    {
        let store = self.store.clone().ok_or(CacheError::Disabled)?;
        match tokio::time::timeout(self.timeout, command(store)).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout {
                operation,
                timeout: self.timeout,
            }),
        }
    }

    /// Gets a typed value. Any failure reads as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if !self.is_enabled() {
            CacheMetrics::miss();
            return None;
        }

        let raw = match self.run("get", |store| async move { store.get(key).await }).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("Cache miss for key '{}'", key);
                CacheMetrics::miss();
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "Cache read failed, falling back to store");
                CacheMetrics::error("get");
                CacheMetrics::miss();
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!("Cache hit for key '{}'", key);
                CacheMetrics::hit();
                Some(value)
            }
            Err(e) => {
                warn!(key, error = %e, "Discarding undecodable cache entry");
                CacheMetrics::error("decode");
                CacheMetrics::miss();
                self.delete(key).await;
                None
            }
        }
    }

    /// Sets a typed value with a TTL. Returns `false` if it was not stored.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) -> bool {
        if !self.is_enabled() {
            return false;
        }

        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(key, error = %e, "Failed to encode cache entry");
                CacheMetrics::error("encode");
                return false;
            }
        };

        let json = json.as_str();
        match self
            .run("set", |store| async move { store.set(key, json, ttl).await })
            .await
        {
            Ok(()) => {
                debug!("Cached key '{}' with TTL {}s", key, ttl.as_secs());
                true
            }
            Err(e) => {
                warn!(key, error = %e, "Cache write failed");
                CacheMetrics::error("set");
                false
            }
        }
    }

    /// Deletes a key. Deleting an absent key is a no-op.
    ///
    /// Returns `false` only if the command failed.
    pub async fn delete(&self, key: &str) -> bool {
        if !self.is_enabled() {
            return true;
        }

        match self.run("del", |store| async move { store.del(key).await }).await {
            Ok(existed) => {
                if existed {
                    CacheMetrics::invalidated(1);
                }
                debug!("Deleted key '{}': {}", key, existed);
                true
            }
            Err(e) => {
                warn!(key, error = %e, "Cache delete failed");
                CacheMetrics::error("del");
                false
            }
        }
    }

    /// Deletes every key matching a glob pattern. Returns the number deleted,
    /// 0 on failure.
    pub async fn delete_by_pattern(&self, pattern: &str) -> u64 {
        if !self.is_enabled() {
            return 0;
        }

        match self
            .run("del_by_pattern", |store| async move {
                store.del_by_pattern(pattern).await
            })
            .await
        {
            Ok(deleted) => {
                CacheMetrics::invalidated(deleted);
                debug!("Deleted {} keys matching pattern '{}'", deleted, pattern);
                deleted
            }
            Err(e) => {
                warn!(pattern, error = %e, "Cache pattern delete failed");
                CacheMetrics::error("del_by_pattern");
                0
            }
        }
    }

    /// Gets a value or loads, caches and returns it.
    ///
    /// Loader errors propagate; caching failures do not.
    pub async fn get_or_load<T, F, Fut>(&self, key: &str, ttl: Duration, loader: F) -> FolioResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = FolioResult<T>>,
    {
        if let Some(cached) = self.get(key).await {
            return Ok(cached);
        }

        let value = loader().await?;
        self.set(key, &value, ttl).await;
        Ok(value)
    }

    /// Atomic check-and-increment of a counter.
    pub async fn incr_bounded(&self, key: &str, limit: u64, window: Duration) -> CacheResult<BoundedIncr> {
        self.run("incr_bounded", |store| async move {
            store.incr_bounded(key, limit, window).await
        })
        .await
    }

    /// Checks connectivity.
    pub async fn ping(&self) -> CacheResult<()> {
        self.run("ping", |store| async move { store.ping().await })
            .await
    }

    /// Releases the underlying connections.
    pub async fn close(&self) {
        if let Some(store) = &self.store {
            store.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InMemoryCacheStore, KeyTtl};
    use async_trait::async_trait;
    use mockall::mock;
    use serde::Deserialize;

    mock! {
        pub Store {}

        #[async_trait]
        impl CacheStore for Store {
            async fn get(&self, key: &str) -> CacheResult<Option<String>>;
            async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;
            async fn del(&self, key: &str) -> CacheResult<bool>;
            async fn del_by_pattern(&self, pattern: &str) -> CacheResult<u64>;
            async fn incr(&self, key: &str) -> CacheResult<u64>;
            async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<bool>;
            async fn ttl(&self, key: &str) -> CacheResult<KeyTtl>;
            async fn incr_bounded(&self, key: &str, limit: u64, window: Duration) -> CacheResult<BoundedIncr>;
            async fn ping(&self) -> CacheResult<()>;
            async fn close(&self);
            fn backend(&self) -> &'static str;
        }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        name: String,
    }

    fn item() -> Item {
        Item {
            name: "hello".to_string(),
        }
    }

    fn client(store: Arc<InMemoryCacheStore>) -> CacheClient {
        CacheClient::new(store, DEFAULT_COMMAND_TIMEOUT)
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = Arc::new(InMemoryCacheStore::new());
        let cache = client(store);

        assert!(cache.set("k", &item(), Duration::from_secs(60)).await);
        assert_eq!(cache.get::<Item>("k").await, Some(item()));
    }

    #[tokio::test]
    async fn test_outage_is_a_miss() {
        let store = Arc::new(InMemoryCacheStore::new());
        let cache = client(Arc::clone(&store));
        cache.set("k", &item(), Duration::from_secs(60)).await;

        store.set_failing(true);
        assert_eq!(cache.get::<Item>("k").await, None);
        assert!(!cache.set("k", &item(), Duration::from_secs(60)).await);
        assert!(!cache.delete("k").await);
        assert_eq!(cache.delete_by_pattern("*").await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_store_times_out() {
        let store = Arc::new(InMemoryCacheStore::new());
        store.insert_raw("k", r#"{"name":"hello"}"#);
        store.set_latency(Some(Duration::from_secs(2)));
        let cache = client(Arc::clone(&store));

        assert_eq!(cache.get::<Item>("k").await, None);
        let err = cache.ping().await.unwrap_err();
        assert!(matches!(err, CacheError::Timeout { operation: "ping", .. }));
    }

    #[tokio::test]
    async fn test_delete_absent_key_is_noop() {
        let cache = client(Arc::new(InMemoryCacheStore::new()));
        assert!(cache.delete("missing").await);
        assert!(cache.delete("missing").await);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_deleted() {
        let mut store = MockStore::new();
        store
            .expect_get()
            .times(1)
            .returning(|_| Ok(Some("{not json".to_string())));
        store.expect_del().times(1).returning(|_| Ok(true));
        let cache = CacheClient::new(Arc::new(store), DEFAULT_COMMAND_TIMEOUT);

        assert_eq!(cache.get::<Item>("k").await, None);
    }

    #[tokio::test]
    async fn test_disabled_cache_never_calls_store() {
        let cache = CacheClient::disabled();
        assert!(!cache.is_enabled());
        assert_eq!(cache.get::<Item>("k").await, None);
        assert!(!cache.set("k", &item(), Duration::from_secs(1)).await);
        assert!(matches!(
            cache.incr_bounded("k", 5, Duration::from_secs(1)).await,
            Err(CacheError::Disabled)
        ));
    }

    #[tokio::test]
    async fn test_get_or_load() {
        let store = Arc::new(InMemoryCacheStore::new());
        let cache = client(store);
        let ttl = Duration::from_secs(60);

        let first: Item = cache.get_or_load("k", ttl, || async { Ok(item()) }).await.unwrap();
        let second: Item = cache
            .get_or_load("k", ttl, || async {
                Ok(Item {
                    name: "reloaded".to_string(),
                })
            })
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(second.name, "hello");
    }
}
