//! Unified error types for all layers of the application.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Generic message shown to end users when a content save fails.
pub const SAVE_FAILED_MESSAGE: &str = "Could not save. Please try again.";

/// Unified error type for all layers of Folio.
///
/// Cache-layer failures are represented here so that adapters can report
/// them, but they are recovered inside the cache client and rate limiter and
/// never reach a caller of the service layer.
#[derive(Error, Debug)]
pub enum FolioError {
    // ============ Domain Errors ============
    /// Resource not found
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A unique field already holds this value in the primary store.
    #[error("Unique constraint violated: {field} '{value}' already exists")]
    UniqueViolation { field: &'static str, value: String },

    /// No free slug suffix was found within the configured cap.
    #[error("Could not allocate unique identifier for '{base}' after {attempts} attempts")]
    SlugExhausted { base: String, attempts: u32 },

    // ============ Access Errors ============
    /// Too many failed attempts for an identifier.
    #[error("Rate limit exceeded, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    // ============ Infrastructure Errors ============
    /// Primary store error
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Redis/Cache error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Timeout error
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FolioError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 400,
            Self::UniqueViolation { .. } => 409,
            Self::RateLimited { .. } => 429,
            Self::Timeout(_) => 503,
            Self::SlugExhausted { .. }
            | Self::Database(_)
            | Self::Configuration(_)
            | Self::Cache(_)
            | Self::Serialization(_)
            | Self::Internal(_)
            | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::UniqueViolation { .. } => "UNIQUE_VIOLATION",
            Self::SlugExhausted { .. } => "SLUG_EXHAUSTED",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the text an end user should see for this error.
    ///
    /// Rate-limit denials report the wait in whole minutes, rounded up.
    /// Slug and store failures collapse into a single generic message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { resource_type, .. } => format!("{resource_type} not found"),
            Self::Validation(message) => message.clone(),
            Self::RateLimited { retry_after_secs } => format!(
                "Too many failed attempts. Please try again in {} minutes.",
                retry_after_secs.div_ceil(60)
            ),
            _ => SAVE_FAILED_MESSAGE.to_string(),
        }
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a unique-field violation for a slug.
    #[must_use]
    pub fn slug_taken<T: Into<String>>(slug: T) -> Self {
        Self::UniqueViolation {
            field: "slug",
            value: slug.into(),
        }
    }

    /// Creates a cache error.
    #[must_use]
    pub fn cache<T: Into<String>>(message: T) -> Self {
        Self::Cache(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Checks if this error is a uniqueness violation on the primary store.
    #[must_use]
    pub const fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }

    /// Checks if this error is retriable.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Cache(_) | Self::Timeout(_) | Self::UniqueViolation { .. }
        )
    }
}

impl From<serde_json::Error> for FolioError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Field-level validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
}
