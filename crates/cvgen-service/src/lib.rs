//! # CVGen Service
//!
//! AI generation services for the CV generation backend: resume
//! generation, enhancement and job-description optimization behind the
//! response cache.

pub mod ai_service;
pub mod ai_service_impl;
pub mod dto;
pub mod generation;
pub mod parsing;
pub mod prompts;

pub use ai_service::*;
pub use ai_service_impl::AiServiceImpl;
pub use dto::*;
pub use generation::*;
pub use parsing::parse_generated_content;
