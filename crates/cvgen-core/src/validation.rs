//! Validation utilities.

use crate::CvgenError;
use validator::{Validate, ValidationErrors};

/// Field-level validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field name
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
}

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns a `CvgenError` on failure.
    fn validate_request(&self) -> Result<(), CvgenError> {
        self.validate().map_err(validation_errors_to_cvgen_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Flattens `validator::ValidationErrors` into field errors.
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: (*field).to_string(),
                message: error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string),
                code: error.code.to_string(),
            })
        })
        .collect();
    // field_errors() is backed by a HashMap
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

/// Converts `validator::ValidationErrors` to `CvgenError`.
#[must_use]
pub fn validation_errors_to_cvgen_error(errors: ValidationErrors) -> CvgenError {
    let message = field_errors(&errors)
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");

    CvgenError::Validation(message)
}

/// Common validation functions.
pub mod rules {
    use validator::ValidationError;

    /// Validates that a string is not blank (not empty after trimming).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("not_blank"));
        }
        Ok(())
    }

    /// Validates that a JSON value is an object.
    pub fn json_object(value: &serde_json::Value) -> Result<(), ValidationError> {
        if !value.is_object() {
            return Err(ValidationError::new("not_an_object"));
        }
        Ok(())
    }
}
