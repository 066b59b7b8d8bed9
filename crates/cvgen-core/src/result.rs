//! Result type aliases.

use crate::CvgenError;

/// A specialized `Result` type for application operations.
pub type CvgenResult<T> = Result<T, CvgenError>;
