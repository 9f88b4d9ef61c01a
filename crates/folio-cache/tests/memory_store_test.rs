//! Concurrency tests for the in-memory cache store.

use folio_cache::{CacheClient, CacheStore, InMemoryCacheStore, KeyTtl, DEFAULT_COMMAND_TIMEOUT};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bounded_increments_never_exceed_limit() {
    let store = Arc::new(InMemoryCacheStore::new());
    let cache = CacheClient::new(Arc::clone(&store) as Arc<dyn CacheStore>, DEFAULT_COMMAND_TIMEOUT);

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .incr_bounded("counter", 5, Duration::from_secs(60))
                    .await
                    .expect("in-memory store does not fail")
            })
        })
        .collect();

    let mut incremented = 0;
    for handle in handles {
        if handle.await.expect("task panicked").incremented {
            incremented += 1;
        }
    }

    assert_eq!(incremented, 5);
    assert_eq!(store.get("counter").await.unwrap().as_deref(), Some("5"));
    let ttl = tokio_test::assert_ok!(store.ttl("counter").await);
    assert!(matches!(ttl, KeyTtl::Expires(_)));
}

#[tokio::test]
async fn test_pattern_delete_leaves_other_namespaces() {
    let store = Arc::new(InMemoryCacheStore::new());
    let cache = CacheClient::new(Arc::clone(&store) as Arc<dyn CacheStore>, DEFAULT_COMMAND_TIMEOUT);
    let ttl = Duration::from_secs(60);

    cache.set("folio:articles:list:tag=a", &vec![1], ttl).await;
    cache.set("folio:articles:list:tag=b", &vec![2], ttl).await;
    cache.set("other:articles:list:tag=a", &vec![3], ttl).await;

    assert_eq!(cache.delete_by_pattern("folio:articles:list:*").await, 2);
    assert!(store.contains("other:articles:list:tag=a"));
}
