//! Configuration validation module.
//!
//! Validates every section and collects all problems so that a broken
//! deployment reports them in one go instead of failing one at a time.

use crate::AppConfig;
use std::fmt;
use url::Url;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// URL format is invalid.
    InvalidUrl { url_type: String, message: String },
    /// Pool size must be between 1 and the maximum.
    InvalidPoolSize { value: u32, maximum: u32 },
    /// Key prefix must be non-empty and free of separators and glob characters.
    InvalidKeyPrefix { value: String },
    /// Duration value must be positive.
    NonPositiveDuration { name: String },
    /// Cache command timeout must stay below one second.
    CacheTimeoutTooLong { value_ms: u64 },
    /// A rate limit policy must allow at least one attempt.
    ZeroAttempts { policy: String },
    /// Slug suffix cap must be positive.
    InvalidSlugCap,
    /// Log level is invalid.
    InvalidLogLevel { value: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl { url_type, message } => {
                write!(f, "Invalid {} URL: {}", url_type, message)
            }
            Self::InvalidPoolSize { value, maximum } => {
                write!(f, "Invalid pool size {} (must be 1-{})", value, maximum)
            }
            Self::InvalidKeyPrefix { value } => {
                write!(
                    f,
                    "Invalid key prefix '{}' (must be non-empty without ':', '*', '?' or spaces)",
                    value
                )
            }
            Self::NonPositiveDuration { name } => {
                write!(f, "'{}' must be positive", name)
            }
            Self::CacheTimeoutTooLong { value_ms } => {
                write!(
                    f,
                    "cache.command_timeout_ms must be below 1000, got {}",
                    value_ms
                )
            }
            Self::ZeroAttempts { policy } => {
                write!(f, "Rate limit policy '{}' must allow at least one attempt", policy)
            }
            Self::InvalidSlugCap => write!(f, "slug.max_suffix must be positive"),
            Self::InvalidLogLevel { value } => {
                write!(
                    f,
                    "Invalid log level: '{}' (valid: trace, debug, info, warn, error)",
                    value
                )
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Result of configuration validation containing all errors found.
#[derive(Debug)]
pub struct ValidationResult {
    errors: Vec<ConfigValidationError>,
}

impl ValidationResult {
    fn new() -> Self {
        Self { errors: Vec::new() }
    }

    fn add_error(&mut self, error: ConfigValidationError) {
        self.errors.push(error);
    }

    fn require_positive(&mut self, name: &str, value: u64) {
        if value == 0 {
            self.add_error(ConfigValidationError::NonPositiveDuration {
                name: name.to_string(),
            });
        }
    }

    /// Returns true if validation passed (no errors).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the validation errors.
    pub fn errors(&self) -> &[ConfigValidationError] {
        &self.errors
    }

    /// Converts to Result, returning Err with all errors if any exist.
    pub fn into_result(self) -> Result<(), Vec<ConfigValidationError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Maximum connection pool size.
    const MAX_POOL_SIZE: u32 = 1000;
    /// Cache commands must finish well inside a request.
    const MAX_CACHE_TIMEOUT_MS: u64 = 1000;
    /// Valid log levels.
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut result = ValidationResult::new();

        result.require_positive("database.query_timeout_secs", config.database.query_timeout_secs);
        Self::validate_redis(&config.redis, &mut result);
        Self::validate_cache(&config.cache, &mut result);
        Self::validate_rate_limit(&config.rate_limit, &mut result);
        if config.slug.max_suffix == 0 {
            result.add_error(ConfigValidationError::InvalidSlugCap);
        }
        Self::validate_observability(&config.observability, &mut result);

        result.into_result()
    }

    fn validate_redis(config: &crate::RedisConfig, result: &mut ValidationResult) {
        let prefix = &config.key_prefix;
        if prefix.is_empty() || prefix.contains([':', '*', '?', '[', ' ']) {
            result.add_error(ConfigValidationError::InvalidKeyPrefix {
                value: prefix.clone(),
            });
        }

        if !config.enabled {
            return;
        }

        match Url::parse(&config.url) {
            Ok(url) if matches!(url.scheme(), "redis" | "rediss") => {}
            Ok(_) => result.add_error(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: "URL must start with redis:// or rediss://".to_string(),
            }),
            Err(e) => result.add_error(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: e.to_string(),
            }),
        }

        if config.pool_size == 0 || config.pool_size > Self::MAX_POOL_SIZE {
            result.add_error(ConfigValidationError::InvalidPoolSize {
                value: config.pool_size,
                maximum: Self::MAX_POOL_SIZE,
            });
        }
    }

    fn validate_cache(config: &crate::CacheConfig, result: &mut ValidationResult) {
        result.require_positive("cache.detail_ttl_secs", config.detail_ttl_secs);
        result.require_positive("cache.list_ttl_secs", config.list_ttl_secs);
        result.require_positive("cache.command_timeout_ms", config.command_timeout_ms);

        if config.command_timeout_ms >= Self::MAX_CACHE_TIMEOUT_MS {
            result.add_error(ConfigValidationError::CacheTimeoutTooLong {
                value_ms: config.command_timeout_ms,
            });
        }
    }

    fn validate_rate_limit(config: &crate::RateLimitConfig, result: &mut ValidationResult) {
        for (name, policy) in [("login", &config.login), ("admin_setup", &config.admin_setup)] {
            if policy.max_attempts == 0 {
                result.add_error(ConfigValidationError::ZeroAttempts {
                    policy: name.to_string(),
                });
            }
            result.require_positive(&format!("rate_limit.{}.window_secs", name), policy.window_secs);
        }
    }

    fn validate_observability(config: &crate::ObservabilityConfig, result: &mut ValidationResult) {
        let level = config.log_level.to_lowercase();
        if !Self::VALID_LOG_LEVELS.contains(&level.as_str()) {
            result.add_error(ConfigValidationError::InvalidLogLevel {
                value: config.log_level.clone(),
            });
        }
    }
}

/// Formats validation errors for display.
pub fn format_validation_errors(errors: &[ConfigValidationError]) -> String {
    let mut output = String::from("Configuration validation failed:\n");
    for (i, error) in errors.iter().enumerate() {
        output.push_str(&format!("  {}. {}\n", i + 1, error));
    }
    output
}
