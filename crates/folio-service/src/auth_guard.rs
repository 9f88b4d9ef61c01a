//! Attempt guards for the login and admin bootstrap paths.
//!
//! Both guards count attempts in a fixed window per client. They never lock
//! anyone out because the cache is unavailable: a failed store check allows
//! the attempt.

use folio_cache::CacheKeys;
use folio_config::AttemptPolicy;
use folio_core::{FolioError, FolioResult};
use folio_resilience::{RateLimitDecision, RateLimiter};
use serde::Serialize;
use tracing::{info, warn};

/// Header carrying the proxy chain, client first.
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Header carrying the client address set by a single proxy.
pub const REAL_IP_HEADER: &str = "x-real-ip";

/// Address used when no header identifies the client.
pub const UNKNOWN_CLIENT_ADDRESS: &str = "unknown-ip";

/// Resolves the client address from request headers.
///
/// `header` looks up a header value by its lowercase name. The first entry
/// of `x-forwarded-for` wins, then `x-real-ip`.
///
/// ```
/// use folio_service::client_address;
///
/// let addr = client_address(|name| (name == "x-forwarded-for").then_some("203.0.113.7, 10.0.0.1"));
/// assert_eq!(addr, "203.0.113.7");
/// assert_eq!(client_address(|_| None), "unknown-ip");
/// ```
pub fn client_address<'a, F>(header: F) -> String
where
    F: Fn(&str) -> Option<&'a str>,
{
    let forwarded = header(FORWARDED_FOR_HEADER)
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|addr| !addr.is_empty());

    forwarded
        .or_else(|| {
            header(REAL_IP_HEADER)
                .map(str::trim)
                .filter(|addr| !addr.is_empty())
        })
        .unwrap_or(UNKNOWN_CLIENT_ADDRESS)
        .to_string()
}

/// Outcome of a login attempt check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoginAttemptDecision {
    /// Whether the attempt may proceed.
    pub allowed: bool,
    /// Attempts left in the current window.
    pub attempts_left: u32,
    /// Seconds until the window closes, when known.
    pub retry_after_secs: Option<u64>,
}

impl From<RateLimitDecision> for LoginAttemptDecision {
    fn from(decision: RateLimitDecision) -> Self {
        Self {
            allowed: decision.allowed,
            attempts_left: decision.attempts_left,
            retry_after_secs: decision.reset_in.map(|d| d.as_secs()),
        }
    }
}

impl LoginAttemptDecision {
    /// Turns a denial into `FolioError::RateLimited`.
    pub fn into_result(self) -> FolioResult<Self> {
        if self.allowed {
            Ok(self)
        } else {
            Err(FolioError::RateLimited {
                retry_after_secs: self.retry_after_secs.unwrap_or(1),
            })
        }
    }
}

/// Failed login counter keyed by identity and client address.
#[derive(Debug, Clone)]
pub struct LoginGuard {
    limiter: RateLimiter,
    keys: CacheKeys,
    policy: AttemptPolicy,
}

impl LoginGuard {
    /// Creates a login guard.
    pub fn new(limiter: RateLimiter, keys: CacheKeys, policy: AttemptPolicy) -> Self {
        Self {
            limiter,
            keys,
            policy,
        }
    }

    /// Records a login attempt and reports whether it may proceed.
    pub async fn check_and_increment_login_attempt(
        &self,
        identity: &str,
        client_address: &str,
    ) -> LoginAttemptDecision {
        let key = self.keys.login_attempts(identity, client_address);
        let decision = LoginAttemptDecision::from(self.limiter.check_policy(&key, &self.policy).await);
        if !decision.allowed {
            warn!(client_address, "Login locked out");
        }
        decision
    }

    /// Like [`Self::check_and_increment_login_attempt`], failing with
    /// `FolioError::RateLimited` when the attempt is denied.
    pub async fn ensure_login_allowed(
        &self,
        identity: &str,
        client_address: &str,
    ) -> FolioResult<LoginAttemptDecision> {
        self.check_and_increment_login_attempt(identity, client_address)
            .await
            .into_result()
    }

    /// Clears the counter after a successful login.
    pub async fn reset_login_attempts(&self, identity: &str, client_address: &str) -> bool {
        let key = self.keys.login_attempts(identity, client_address);
        self.limiter.reset(&key).await
    }
}

/// Admin bootstrap attempt counter keyed by client address.
#[derive(Debug, Clone)]
pub struct AdminSetupGuard {
    limiter: RateLimiter,
    keys: CacheKeys,
    policy: AttemptPolicy,
}

impl AdminSetupGuard {
    /// Creates an admin setup guard.
    pub fn new(limiter: RateLimiter, keys: CacheKeys, policy: AttemptPolicy) -> Self {
        Self {
            limiter,
            keys,
            policy,
        }
    }

    /// Records a setup attempt.
    ///
    /// # Errors
    ///
    /// `FolioError::RateLimited` once the window is used up.
    pub async fn check(&self, client_address: &str) -> FolioResult<LoginAttemptDecision> {
        let key = self.keys.admin_setup_attempts(client_address);
        let decision = LoginAttemptDecision::from(self.limiter.check_policy(&key, &self.policy).await);
        if !decision.allowed {
            warn!(client_address, "Admin setup attempts exhausted");
        }
        decision.into_result()
    }

    /// Clears the counter after a successful setup.
    pub async fn reset(&self, client_address: &str) -> bool {
        let key = self.keys.admin_setup_attempts(client_address);
        let cleared = self.limiter.reset(&key).await;
        info!(client_address, "Admin setup attempts reset");
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_cache::{CacheClient, CacheStore, InMemoryCacheStore, DEFAULT_COMMAND_TIMEOUT};
    use folio_config::RateLimitConfig;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn guards() -> (LoginGuard, AdminSetupGuard, Arc<InMemoryCacheStore>) {
        let store = Arc::new(InMemoryCacheStore::new());
        let cache = CacheClient::new(Arc::clone(&store) as Arc<dyn CacheStore>, DEFAULT_COMMAND_TIMEOUT);
        let limiter = RateLimiter::new(cache);
        let policies = RateLimitConfig::default();
        (
            LoginGuard::new(limiter.clone(), CacheKeys::default(), policies.login),
            AdminSetupGuard::new(limiter, CacheKeys::default(), policies.admin_setup),
            store,
        )
    }

    #[test]
    fn test_client_address_precedence() {
        let headers: HashMap<&str, &str> = [
            ("x-forwarded-for", " 198.51.100.2 , 10.0.0.1"),
            ("x-real-ip", "10.0.0.9"),
        ]
        .into_iter()
        .collect();
        assert_eq!(client_address(|name| headers.get(name).copied()), "198.51.100.2");

        let real_ip_only: HashMap<&str, &str> = [("x-real-ip", "10.0.0.9")].into_iter().collect();
        assert_eq!(client_address(|name| real_ip_only.get(name).copied()), "10.0.0.9");

        let blank: HashMap<&str, &str> = [("x-forwarded-for", " ")].into_iter().collect();
        assert_eq!(client_address(|name| blank.get(name).copied()), UNKNOWN_CLIENT_ADDRESS);
    }

    #[tokio::test]
    async fn test_login_lockout_after_five_attempts() {
        let (login, _, _) = guards();

        for expected in [4, 3, 2, 1, 0] {
            let decision = login
                .check_and_increment_login_attempt("Admin@Example.com", "1.2.3.4")
                .await;
            assert!(decision.allowed);
            assert_eq!(decision.attempts_left, expected);
        }

        let err = login
            .ensure_login_allowed("admin@example.com", "1.2.3.4")
            .await
            .unwrap_err();
        match err {
            FolioError::RateLimited { retry_after_secs } => assert!(retry_after_secs > 0),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_login_counters_are_per_address() {
        let (login, _, _) = guards();
        for _ in 0..6 {
            login.check_and_increment_login_attempt("user", "1.1.1.1").await;
        }

        let other = login.check_and_increment_login_attempt("user", "2.2.2.2").await;
        assert!(other.allowed);
        assert_eq!(other.attempts_left, 4);
    }

    #[tokio::test]
    async fn test_reset_after_success() {
        let (login, _, store) = guards();
        login.check_and_increment_login_attempt("user", "1.1.1.1").await;

        assert!(login.reset_login_attempts("USER", "1.1.1.1").await);
        assert!(!store.contains("folio:login:ratelimit:user:1.1.1.1"));
    }

    #[tokio::test]
    async fn test_admin_setup_guard() {
        let (_, setup, _) = guards();
        for _ in 0..5 {
            setup.check("9.9.9.9").await.unwrap();
        }
        assert!(matches!(
            setup.check("9.9.9.9").await,
            Err(FolioError::RateLimited { .. })
        ));

        setup.reset("9.9.9.9").await;
        assert_eq!(setup.check("9.9.9.9").await.unwrap().attempts_left, 4);
    }

    #[tokio::test]
    async fn test_outage_allows_login() {
        let (login, _, store) = guards();
        store.set_failing(true);

        let decision = login.check_and_increment_login_attempt("user", "1.1.1.1").await;
        assert_eq!(
            decision,
            LoginAttemptDecision {
                allowed: true,
                attempts_left: 1,
                retry_after_secs: None,
            }
        );
    }
}
