//! In-process cache store.
//!
//! Expiry is tracked with `tokio::time::Instant`, so tests can drive it with
//! a paused clock. Outages and slow replies can be injected.

use crate::{BoundedIncr, CacheError, CacheResult, CacheStore, KeyTtl};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Cache store backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    entries: Mutex<HashMap<String, Entry>>,
    failing: AtomicBool,
    closed: AtomicBool,
    latency: Mutex<Option<Duration>>,
    commands: AtomicUsize,
}

impl InMemoryCacheStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent command fail, simulating an outage.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Delays every subsequent command.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock() = latency;
    }

    /// Stores a value without a TTL, bypassing fault injection.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries.lock().insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: None,
            },
        );
    }

    /// Checks whether a live key exists, bypassing fault injection.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .lock()
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    /// Live keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .entries
            .lock()
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Number of commands received, including failed ones.
    #[must_use]
    pub fn command_count(&self) -> usize {
        self.commands.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> CacheResult<()> {
        self.commands.fetch_add(1, Ordering::SeqCst);
        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.closed.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("store closed".to_string()));
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }

    /// Runs `f` on the map after dropping the expired entry for `key`.
    fn with_live<T>(&self, key: &str, f: impl FnOnce(&mut HashMap<String, Entry>, Instant) -> T) -> T {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }
        f(&mut entries, now)
    }
}

fn parse_counter(key: &str, value: &str) -> CacheResult<u64> {
    value.parse().map_err(|_| {
        CacheError::Unavailable(format!("value at '{}' is not an integer", key))
    })
}

/// Redis-style glob matching supporting `*` and `?`.
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some('?') => {
                p += 1;
                t += 1;
            }
            Some(c) if *c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star_p, star_t)) => {
                    p = star_p + 1;
                    t = star_t + 1;
                    backtrack = Some((star_p, star_t + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|c| *c == '*')
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.enter().await?;
        Ok(self.with_live(key, |entries, _| entries.get(key).map(|e| e.value.clone())))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.enter().await?;
        let ttl = ttl.max(Duration::from_secs(1));
        self.entries.lock().insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<bool> {
        self.enter().await?;
        Ok(self.with_live(key, |entries, _| entries.remove(key).is_some()))
    }

    async fn del_by_pattern(&self, pattern: &str) -> CacheResult<u64> {
        self.enter().await?;
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let mut deleted = 0_u64;
        entries.retain(|key, entry| {
            if entry.is_expired(now) {
                return false;
            }
            let matched = glob_match(pattern, key);
            if matched {
                deleted += 1;
            }
            !matched
        });
        Ok(deleted)
    }

    async fn incr(&self, key: &str) -> CacheResult<u64> {
        self.enter().await?;
        self.with_live(key, |entries, _| {
            let entry = entries.entry(key.to_string()).or_insert_with(|| Entry {
                value: "0".to_string(),
                expires_at: None,
            });
            let next = parse_counter(key, &entry.value)? + 1;
            entry.value = next.to_string();
            Ok(next)
        })
    }

    async fn expire(&self, key: &str, ttl: Duration) -> CacheResult<bool> {
        self.enter().await?;
        Ok(self.with_live(key, |entries, now| match entries.get_mut(key) {
            Some(entry) => {
                entry.expires_at = Some(now + ttl);
                true
            }
            None => false,
        }))
    }

    async fn ttl(&self, key: &str) -> CacheResult<KeyTtl> {
        self.enter().await?;
        Ok(self.with_live(key, |entries, now| match entries.get(key) {
            None => KeyTtl::Missing,
            Some(Entry {
                expires_at: None, ..
            }) => KeyTtl::Persistent,
            Some(Entry {
                expires_at: Some(at),
                ..
            }) => KeyTtl::Expires(at.saturating_duration_since(now).as_secs()),
        }))
    }

    async fn incr_bounded(
        &self,
        key: &str,
        limit: u64,
        window: Duration,
    ) -> CacheResult<BoundedIncr> {
        self.enter().await?;
        let window = window.max(Duration::from_secs(1));
        self.with_live(key, |entries, now| {
            let current = match entries.get(key) {
                Some(entry) => parse_counter(key, &entry.value)?,
                None => 0,
            };

            let incremented = current < limit;
            let count = if incremented { current + 1 } else { current };

            let entry = entries.entry(key.to_string()).or_insert_with(|| Entry {
                value: "0".to_string(),
                expires_at: None,
            });
            entry.value = count.to_string();
            if entry.expires_at.is_none() {
                entry.expires_at = Some(now + window);
            }

            let ttl_secs = entry
                .expires_at
                .map_or(window, |at| at.saturating_duration_since(now))
                .as_secs()
                .max(1);

            Ok(BoundedIncr {
                count,
                incremented,
                ttl_secs,
            })
        })
    }

    async fn ping(&self) -> CacheResult<()> {
        self.enter().await
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
