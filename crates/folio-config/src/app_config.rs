//! Application configuration structures.

use folio_core::telemetry::{LogFormat, TelemetryConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name and metadata.
    #[serde(default)]
    pub app: AppMetadata,

    /// Primary store configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Redis configuration.
    #[serde(default)]
    pub redis: RedisConfig,

    /// Content cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Rate limit policies.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Slug assignment configuration.
    #[serde(default)]
    pub slug: SlugConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Application metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMetadata {
    /// Application name.
    pub name: String,
    /// Application version.
    pub version: String,
    /// Environment (development, staging, production).
    pub environment: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "folio".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Primary store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Upper bound for a single primary store call, in seconds.
    pub query_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            query_timeout_secs: 5,
        }
    }
}

impl DatabaseConfig {
    /// Returns the query timeout as a Duration.
    #[must_use]
    pub const fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

/// Redis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Redis connection URL.
    pub url: String,
    /// Connection pool size.
    pub pool_size: u32,
    /// When false the cache behaves as a permanent miss and rate limiting
    /// fails open.
    pub enabled: bool,
    /// Namespace prepended to every key.
    pub key_prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            pool_size: 10,
            enabled: true,
            key_prefix: "folio".to_string(),
        }
    }
}

/// Content cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL of single-article entries, in seconds.
    pub detail_ttl_secs: u64,
    /// TTL of list entries, in seconds.
    pub list_ttl_secs: u64,
    /// Upper bound for a single cache command, in milliseconds.
    pub command_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            detail_ttl_secs: 30 * 24 * 60 * 60,
            list_ttl_secs: 30 * 24 * 60 * 60,
            command_timeout_ms: 250,
        }
    }
}

impl CacheConfig {
    /// Returns the detail TTL as a Duration.
    #[must_use]
    pub const fn detail_ttl(&self) -> Duration {
        Duration::from_secs(self.detail_ttl_secs)
    }

    /// Returns the list TTL as a Duration.
    #[must_use]
    pub const fn list_ttl(&self) -> Duration {
        Duration::from_secs(self.list_ttl_secs)
    }

    /// Returns the command timeout as a Duration.
    #[must_use]
    pub const fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

/// A fixed-window attempt policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptPolicy {
    /// Attempts allowed within one window.
    pub max_attempts: u32,
    /// Window length, in seconds, counted from the first attempt.
    pub window_secs: u64,
}

impl AttemptPolicy {
    /// Returns the window as a Duration.
    #[must_use]
    pub const fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Rate limit policies for the guarded paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Failed login attempts per identity and client address.
    pub login: AttemptPolicy,
    /// Admin bootstrap attempts per client address.
    pub admin_setup: AttemptPolicy,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            login: AttemptPolicy {
                max_attempts: 5,
                window_secs: 3 * 24 * 60 * 60,
            },
            admin_setup: AttemptPolicy {
                max_attempts: 5,
                window_secs: 60 * 60,
            },
        }
    }
}

/// Slug assignment configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlugConfig {
    /// Highest numeric suffix tried before giving up.
    pub max_suffix: u32,
    /// Persist attempts when the store reports a slug collision.
    pub persist_retries: u32,
}

impl Default for SlugConfig {
    fn default() -> Self {
        Self {
            max_suffix: 100,
            persist_retries: 3,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level.
    pub log_level: String,
    /// Log format.
    pub log_format: LogFormat,
    /// Enable metrics.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
        }
    }
}

impl From<&ObservabilityConfig> for TelemetryConfig {
    fn from(config: &ObservabilityConfig) -> Self {
        Self {
            log_level: config.log_level.clone(),
            format: config.log_format,
        }
    }
}
