//! Redis-backed cache store.

use crate::{BoundedIncr, CacheError, CacheResult, CacheStore, KeyTtl};
use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Config, Connection, Pool, Runtime};
use folio_config::RedisConfig;
use std::time::Duration;
use tracing::{debug, info};

/// Keys fetched per SCAN round trip.
const SCAN_BATCH: usize = 500;

/// Check-and-increment in one round trip.
///
/// Returns `{count, incremented, ttl}`. A counter left without a TTL (for
/// example after a crash between INCR and EXPIRE in an older client) gets
/// the window re-applied so it cannot lock an identifier out forever.
const INCR_BOUNDED_SCRIPT: &str = r#"
local current = tonumber(redis.call('GET', KEYS[1]) or '0')
local limit = tonumber(ARGV[1])
local window = tonumber(ARGV[2])
local incremented = 0
if current < limit then
    current = redis.call('INCR', KEYS[1])
    incremented = 1
    if current == 1 then
        redis.call('EXPIRE', KEYS[1], window)
    end
end
local ttl = redis.call('TTL', KEYS[1])
if ttl < 0 then
    redis.call('EXPIRE', KEYS[1], window)
    ttl = window
end
return {current, incremented, ttl}
"#;

/// Cache store on a deadpool-redis connection pool.
pub struct RedisCacheStore {
    pool: Pool,
}

impl RedisCacheStore {
    /// Creates the connection pool and verifies it with a PING.
    pub async fn connect(config: &RedisConfig) -> CacheResult<Self> {
        info!("Creating Redis connection pool for cache...");

        let pool = Config::from_url(&config.url)
            .builder()
            .map_err(|e| CacheError::Configuration(format!("Invalid Redis config: {}", e)))?
            .max_size(config.pool_size as usize)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| CacheError::Configuration(format!("Failed to create pool: {}", e)))?;

        let store = Self { pool };
        store.ping().await?;

        info!("Redis connection pool created successfully");
        Ok(store)
    }

    /// Wraps an existing pool.
    #[must_use]
    pub fn from_pool(pool: Pool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> CacheResult<Connection> {
        Ok(self.pool.get().await?)
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn().await?;
        Ok(conn.get(key).await?)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.conn().await?;
        let ttl_secs = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.conn().await?;
        let deleted: i64 = conn.del(key).await?;
        Ok(deleted > 0)
    }

    async fn del_by_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let mut conn = self.conn().await?;

        let mut keys: Vec<String> = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        if keys.is_empty() {
            return Ok(0);
        }
        keys.sort_unstable();
        keys.dedup();

        let deleted: i64 = conn.del(&keys).await?;
        debug!("Deleted {} keys matching pattern '{}'", deleted, pattern);
        Ok(deleted.unsigned_abs())
    }

    async fn incr(&self, key: &str) -> CacheResult<u64> {
        let mut conn = self.conn().await?;
        let value: i64 = conn.incr(key, 1).await?;
        Ok(value.unsigned_abs())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<bool> {
        let mut conn = self.conn().await?;
        let secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        Ok(conn.expire(key, secs).await?)
    }

    async fn ttl(&self, key: &str) -> CacheResult<KeyTtl> {
        let mut conn = self.conn().await?;
        let reply: i64 = conn.ttl(key).await?;
        Ok(KeyTtl::from_redis(reply))
    }

    async fn incr_bounded(
        &self,
        key: &str,
        limit: u64,
        window: Duration,
    ) -> CacheResult<BoundedIncr> {
        let mut conn = self.conn().await?;
        let window_secs = window.as_secs().max(1);

        let reply: Vec<i64> = redis::Script::new(INCR_BOUNDED_SCRIPT)
            .key(key)
            .arg(limit)
            .arg(window_secs)
            .invoke_async(&mut *conn)
            .await?;

        match reply.as_slice() {
            [count, incremented, ttl] => Ok(BoundedIncr {
                count: count.unsigned_abs(),
                incremented: *incremented == 1,
                ttl_secs: ttl.unsigned_abs(),
            }),
            other => Err(CacheError::Unavailable(format!(
                "unexpected bounded increment reply: {:?}",
                other
            ))),
        }
    }

    async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.conn().await?;
        redis::cmd("PING").query_async::<String>(&mut *conn).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close();
        info!("Redis connection pool closed");
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
