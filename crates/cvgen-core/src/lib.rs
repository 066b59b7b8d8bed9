//! # CVGen Core
//!
//! Core types, error definitions and telemetry bootstrap shared by every
//! crate of the CV generation backend.

pub mod error;
pub mod id;
pub mod result;
pub mod telemetry;
pub mod validation;

pub use error::*;
pub use id::*;
pub use result::*;
pub use telemetry::*;
pub use validation::*;
