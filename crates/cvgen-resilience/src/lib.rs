//! # CVGen Resilience
//!
//! Retry policies used when establishing connections to backing services.

pub mod retry;

pub use retry::*;
