//! Validation utilities.

use crate::{FieldError, FolioError};
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns a `FolioError` on failure.
    fn validate_request(&self) -> Result<(), FolioError> {
        self.validate().map_err(validation_errors_to_folio_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Converts `validator::ValidationErrors` to `FolioError`.
#[must_use]
pub fn validation_errors_to_folio_error(errors: ValidationErrors) -> FolioError {
    let mut field_errors: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: (*field).to_string(),
                message: error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), |m| m.to_string()),
                code: error.code.to_string(),
            })
        })
        .collect();
    field_errors.sort_by(|a, b| a.field.cmp(&b.field));

    let message = field_errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");

    FolioError::Validation(message)
}

/// Common validation functions.
pub mod rules {
    use url::Url;
    use validator::ValidationError;

    /// Validates that a string is not blank (not empty after trimming).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("not_blank"));
        }
        Ok(())
    }

    /// Validates a link accepted on articles and banners.
    ///
    /// Only absolute `ftp`, `http` and `https` URLs with a host pass. Raw
    /// spaces and quotes are rejected before parsing.
    pub fn web_url(value: &str) -> Result<(), ValidationError> {
        if value.contains([' ', '"']) {
            return Err(ValidationError::new("invalid_url"));
        }

        match Url::parse(value) {
            Ok(url)
                if matches!(url.scheme(), "ftp" | "http" | "https")
                    && url.host_str().is_some_and(|host| !host.is_empty()) =>
            {
                Ok(())
            }
            _ => Err(ValidationError::new("invalid_url")),
        }
    }

    /// Trims an optional text field; blank values read as absent.
    #[must_use]
    pub fn non_blank(value: Option<String>) -> Option<String> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
