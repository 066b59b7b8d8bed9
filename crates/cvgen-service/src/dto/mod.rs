//! Data Transfer Objects (DTOs).

mod ai_dto;
mod cv_dto;

pub use ai_dto::*;
pub use cv_dto::*;
