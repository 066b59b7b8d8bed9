//! Unified error types for all layers of the application.

use thiserror::Error;

/// Unified error type for the CV generation backend.
///
/// Cache failures are normally absorbed inside the cache layer; the
/// `Cache` variant only reaches callers that opt into the fallible
/// cache surface.
#[derive(Error, Debug)]
pub enum CvgenError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// External service error (the language-model provider)
    #[error("External service error: {service} - {message}")]
    ExternalService { service: String, message: String },

    /// Redis/Cache error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Timeout error
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CvgenError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an error attributed to an external service.
    #[must_use]
    pub fn external<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }
}

impl From<serde_json::Error> for CvgenError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(CvgenError::validation("bad").error_code(), "VALIDATION_ERROR");
        assert_eq!(
            CvgenError::Configuration("missing".to_string()).error_code(),
            "CONFIGURATION_ERROR"
        );
        assert_eq!(CvgenError::external("generation", "x").error_code(), "EXTERNAL_SERVICE_ERROR");
        assert_eq!(CvgenError::Cache("x".to_string()).error_code(), "CACHE_ERROR");
        assert_eq!(CvgenError::Timeout("slow".to_string()).error_code(), "TIMEOUT");
        assert_eq!(CvgenError::internal("x").error_code(), "INTERNAL_ERROR");
        assert_eq!(CvgenError::Other(anyhow::anyhow!("boom")).error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_external_display_names_service() {
        let err = CvgenError::external("generation", "rate limited");
        assert_eq!(
            err.to_string(),
            "External service error: generation - rate limited"
        );
    }

    #[test]
    fn test_json_error_maps_to_internal() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CvgenError = json_err.into();
        assert!(matches!(err, CvgenError::Internal(_)));
    }
}
