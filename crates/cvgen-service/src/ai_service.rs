//! AI service trait definition.

use crate::dto::{
    AiStatusResponse, EnhanceCvRequest, GenerateCvRequest, GenerationResponse, OptimizeCvRequest,
};
use async_trait::async_trait;
use cvgen_core::{CvgenResult, UserId};

/// Resume generation backed by a language model and the response cache.
#[async_trait]
pub trait AiService: Send + Sync {
    /// Generates a resume from profile data.
    async fn generate_cv(
        &self,
        request: GenerateCvRequest,
        user_id: &UserId,
    ) -> CvgenResult<GenerationResponse>;

    /// Improves an existing resume.
    async fn enhance_cv(
        &self,
        request: EnhanceCvRequest,
        user_id: &UserId,
    ) -> CvgenResult<GenerationResponse>;

    /// Tailors an existing resume to a job description.
    async fn optimize_cv(
        &self,
        request: OptimizeCvRequest,
        user_id: &UserId,
    ) -> CvgenResult<GenerationResponse>;

    /// Drops every cached result of a user.
    async fn clear_user_cache(&self, user_id: &UserId);

    /// Reports whether the service can generate.
    fn status(&self) -> AiStatusResponse;
}
