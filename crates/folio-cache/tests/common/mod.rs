//! Redis container shared by the cache store integration tests.

use folio_cache::RedisCacheStore;
use folio_config::RedisConfig;
use std::sync::Arc;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::redis::{Redis, REDIS_PORT};

/// Redis container plus a store connected to it.
///
/// The container stops when this value is dropped.
pub struct TestRedis {
    _container: ContainerAsync<Redis>,
    store: Arc<RedisCacheStore>,
}

impl TestRedis {
    /// Starts a fresh Redis container and connects a store to it.
    pub async fn new() -> Self {
        let container = Redis::default()
            .start()
            .await
            .expect("Failed to start Redis container");

        let port = container
            .get_host_port_ipv4(REDIS_PORT)
            .await
            .expect("Failed to get Redis port");

        let config = RedisConfig {
            url: format!("redis://127.0.0.1:{}", port),
            pool_size: 4,
            ..RedisConfig::default()
        };

        let store = Self::connect_with_retry(&config, 30).await;

        Self {
            _container: container,
            store: Arc::new(store),
        }
    }

    /// Returns the connected store.
    pub fn store(&self) -> Arc<RedisCacheStore> {
        Arc::clone(&self.store)
    }

    async fn connect_with_retry(config: &RedisConfig, max_attempts: u32) -> RedisCacheStore {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match RedisCacheStore::connect(config).await {
                Ok(store) => return store,
                Err(e) => {
                    if attempts >= max_attempts {
                        panic!("Failed to connect to Redis after {} attempts: {}", max_attempts, e);
                    }
                    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
                }
            }
        }
    }
}
