//! Cache error types.

use folio_core::FolioError;
use std::time::Duration;
use thiserror::Error;

/// Result type for cache store operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache store errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Redis pool error.
    #[error("Redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The command did not finish within the command timeout.
    #[error("Cache command '{operation}' timed out after {}ms", .timeout.as_millis())]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// Caching is switched off.
    #[error("Cache is disabled")]
    Disabled,

    /// The store is unreachable or returned an unusable reply.
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<CacheError> for FolioError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Configuration(message) => Self::Configuration(message),
            other => Self::Cache(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message() {
        let err = CacheError::Timeout {
            operation: "get",
            timeout: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "Cache command 'get' timed out after 250ms");
    }

    #[test]
    fn test_into_folio_error() {
        let err: FolioError = CacheError::Disabled.into();
        assert!(matches!(err, FolioError::Cache(_)));

        let err: FolioError = CacheError::Configuration("bad url".to_string()).into();
        assert!(matches!(err, FolioError::Configuration(_)));
    }
}
