//! Cache error types.

use cvgen_core::CvgenError;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-related errors.
///
/// These never cross the [`ResponseCache`](crate::ResponseCache) boundary
/// except through its `try_*` methods.
#[derive(Debug, Error)]
pub enum CacheError {
    /// No store endpoint configured.
    #[error("Cache is not configured")]
    NotConfigured,

    /// Store configured but not currently reachable.
    #[error("Cache store is unavailable")]
    Unavailable,

    /// Connection could not be established.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other store failure.
    #[error("Store error: {0}")]
    Store(String),
}

impl CacheError {
    /// Returns true if the failure means the cache is bypassed rather than
    /// broken.
    #[must_use]
    pub const fn is_bypass(&self) -> bool {
        matches!(self, Self::NotConfigured | Self::Unavailable)
    }

    /// Returns true if the error indicates the connection itself is gone.
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        match self {
            Self::Connection(_) => true,
            Self::Redis(e) => {
                e.is_io_error()
                    || e.is_connection_dropped()
                    || e.is_connection_refusal()
                    || e.is_timeout()
            }
            _ => false,
        }
    }
}

impl From<CacheError> for CvgenError {
    fn from(err: CacheError) -> Self {
        Self::Cache(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bypass_errors() {
        assert!(CacheError::NotConfigured.is_bypass());
        assert!(CacheError::Unavailable.is_bypass());
        assert!(!CacheError::Store("boom".to_string()).is_bypass());
    }

    #[test]
    fn test_connection_errors() {
        assert!(CacheError::Connection("refused".to_string()).is_connection_error());
        assert!(!CacheError::Store("boom".to_string()).is_connection_error());

        let io = redis::RedisError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset by peer",
        ));
        assert!(CacheError::from(io).is_connection_error());
    }

    #[test]
    fn test_converts_to_cvgen_error() {
        let err: CvgenError = CacheError::Unavailable.into();
        assert!(matches!(err, CvgenError::Cache(_)));
        assert_eq!(err.error_code(), "CACHE_ERROR");
    }
}
