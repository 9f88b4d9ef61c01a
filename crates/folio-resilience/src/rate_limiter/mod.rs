//! Fixed-window rate limiter on the shared cache store.
//!
//! Each identifier key moves from fresh (no counter) to within-limit to
//! exceeded, and only returns to fresh when the window TTL set at the first
//! attempt runs out or the key is reset. The window never slides.

use folio_cache::{CacheClient, CacheError};
use folio_config::AttemptPolicy;
use metrics::counter;
use std::time::Duration;
use tracing::{debug, warn};

/// Denials counter.
pub const RATE_LIMIT_DENIED_TOTAL: &str = "folio_rate_limit_denied_total";

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the attempt may proceed.
    pub allowed: bool,
    /// Attempts left in the current window after this one.
    pub attempts_left: u32,
    /// Time until the window closes; unknown when the store was unreachable.
    pub reset_in: Option<Duration>,
}

impl RateLimitDecision {
    /// Decision used when the store cannot be consulted.
    #[must_use]
    pub const fn fail_open() -> Self {
        Self {
            allowed: true,
            attempts_left: 1,
            reset_in: None,
        }
    }
}

/// Fixed-window attempt counter.
#[derive(Clone)]
pub struct RateLimiter {
    cache: CacheClient,
}

impl RateLimiter {
    /// Creates a rate limiter on a cache client.
    #[must_use]
    pub fn new(cache: CacheClient) -> Self {
        Self { cache }
    }

    /// Records an attempt for `key` and decides whether it is allowed.
    ///
    /// The check and the increment are one atomic store operation. A store
    /// failure allows the attempt: the limiter never locks users out because
    /// the cache is down.
    pub async fn check_and_increment(
        &self,
        key: &str,
        max_attempts: u32,
        window: Duration,
    ) -> RateLimitDecision {
        let outcome = match self
            .cache
            .incr_bounded(key, u64::from(max_attempts), window)
            .await
        {
            Ok(outcome) => outcome,
            Err(CacheError::Disabled) => {
                debug!(key, "Rate limiting skipped, cache disabled");
                return RateLimitDecision::fail_open();
            }
            Err(e) => {
                warn!(key, error = %e, "Rate limit check failed, allowing attempt");
                return RateLimitDecision::fail_open();
            }
        };

        if outcome.incremented {
            let used = u32::try_from(outcome.count).unwrap_or(u32::MAX);
            let decision = RateLimitDecision {
                allowed: true,
                attempts_left: max_attempts.saturating_sub(used),
                reset_in: Some(Duration::from_secs(outcome.ttl_secs)),
            };
            debug!(key, attempts_left = decision.attempts_left, "Attempt recorded");
            return decision;
        }

        counter!(RATE_LIMIT_DENIED_TOTAL).increment(1);
        let reset_in = Duration::from_secs(outcome.ttl_secs.max(1));
        warn!(key, reset_in_secs = reset_in.as_secs(), "Rate limit exceeded");
        RateLimitDecision {
            allowed: false,
            attempts_left: 0,
            reset_in: Some(reset_in),
        }
    }

    /// Same as [`Self::check_and_increment`] with a configured policy.
    pub async fn check_policy(&self, key: &str, policy: &AttemptPolicy) -> RateLimitDecision {
        self.check_and_increment(key, policy.max_attempts, policy.window())
            .await
    }

    /// Clears the counter for `key`, restarting its window on next use.
    ///
    /// Returns `false` if the store could not be reached.
    pub async fn reset(&self, key: &str) -> bool {
        let cleared = self.cache.delete(key).await;
        debug!(key, cleared, "Rate limit reset");
        cleared
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_cache::{CacheStore, InMemoryCacheStore, DEFAULT_COMMAND_TIMEOUT};
    use std::sync::Arc;

    const WINDOW: Duration = Duration::from_secs(259_200);

    fn limiter() -> (RateLimiter, Arc<InMemoryCacheStore>) {
        let store = Arc::new(InMemoryCacheStore::new());
        let cache = CacheClient::new(Arc::clone(&store) as Arc<dyn CacheStore>, DEFAULT_COMMAND_TIMEOUT);
        (RateLimiter::new(cache), store)
    }

    #[tokio::test(start_paused = true)]
    async fn test_boundary() {
        let (limiter, _) = limiter();

        let first = limiter.check_and_increment("k", 5, WINDOW).await;
        assert!(first.allowed);
        assert_eq!(first.attempts_left, 4);
        assert_eq!(first.reset_in, Some(WINDOW));

        for expected in [3, 2, 1, 0] {
            let decision = limiter.check_and_increment("k", 5, WINDOW).await;
            assert!(decision.allowed);
            assert_eq!(decision.attempts_left, expected);
        }

        let denied = limiter.check_and_increment("k", 5, WINDOW).await;
        assert!(!denied.allowed);
        assert_eq!(denied.attempts_left, 0);
        assert!(denied.reset_in.is_some_and(|d| d.as_secs() > 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_does_not_slide() {
        let (limiter, _) = limiter();
        let window = Duration::from_secs(100);

        limiter.check_and_increment("k", 5, window).await;
        tokio::time::advance(Duration::from_secs(40)).await;
        let second = limiter.check_and_increment("k", 5, window).await;

        assert_eq!(second.reset_in, Some(Duration::from_secs(60)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_expiry_returns_to_fresh() {
        let (limiter, _) = limiter();
        let window = Duration::from_secs(60);

        for _ in 0..3 {
            limiter.check_and_increment("k", 2, window).await;
        }
        assert!(!limiter.check_and_increment("k", 2, window).await.allowed);

        tokio::time::advance(Duration::from_secs(61)).await;
        let decision = limiter.check_and_increment("k", 2, window).await;
        assert!(decision.allowed);
        assert_eq!(decision.attempts_left, 1);
    }

    #[tokio::test]
    async fn test_reset() {
        let (limiter, _) = limiter();
        for _ in 0..6 {
            limiter.check_and_increment("k", 5, WINDOW).await;
        }
        assert!(limiter.reset("k").await);

        let decision = limiter.check_and_increment("k", 5, WINDOW).await;
        assert!(decision.allowed);
        assert_eq!(decision.attempts_left, 4);
    }

    #[tokio::test]
    async fn test_fails_open_on_outage() {
        let (limiter, store) = limiter();
        store.set_failing(true);

        for _ in 0..10 {
            let decision = limiter.check_and_increment("k", 5, WINDOW).await;
            assert_eq!(decision, RateLimitDecision::fail_open());
        }
    }

    #[tokio::test]
    async fn test_disabled_cache_fails_open() {
        let limiter = RateLimiter::new(CacheClient::disabled());
        let decision = limiter.check_and_increment("k", 1, WINDOW).await;
        assert!(decision.allowed);
        assert!(decision.reset_in.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_counter_without_ttl_gets_window() {
        let (limiter, store) = limiter();
        store.insert_raw("k", "9");

        let decision = limiter.check_and_increment("k", 5, Duration::from_secs(30)).await;
        assert!(!decision.allowed);
        assert_eq!(decision.reset_in, Some(Duration::from_secs(30)));
    }
}
