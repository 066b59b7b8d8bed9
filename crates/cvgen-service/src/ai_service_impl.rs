//! AI service implementation.

use crate::ai_service::AiService;
use crate::dto::{
    AiStatus, AiStatusResponse, EnhanceCvRequest, GenerateCvRequest, GenerationResponse,
    OptimizeCvRequest,
};
use crate::generation::{GenerationInvoker, PromptContext};
use crate::parsing::parse_generated_content;
use crate::prompts::{
    enhance_user_message, generate_user_message, optimize_user_message, ENHANCEMENT_SYSTEM_PROMPT,
    GENERATION_SYSTEM_PROMPT, OPTIMIZATION_SYSTEM_PROMPT,
};
use async_trait::async_trait;
use chrono::Utc;
use cvgen_cache::{GenerationResult, ResponseCache};
use cvgen_config::{GenerationConfig, ANTHROPIC_API_KEY_ENV};
use cvgen_core::{CvgenError, CvgenResult, UserId, ValidateExt};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info};

/// Generation operations, used to keep their cache entries apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Operation {
    Generate,
    Enhance,
    Optimize,
}

impl Operation {
    const fn timestamp_field(self) -> &'static str {
        match self {
            Self::Generate => "generatedAt",
            Self::Enhance => "enhancedAt",
            Self::Optimize => "optimizedAt",
        }
    }

    const fn verb(self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Enhance => "enhance",
            Self::Optimize => "optimize",
        }
    }
}

/// Cache payload: the request tagged with the operation it was sent to.
#[derive(Serialize)]
struct CachedRequest<'a, R> {
    operation: Operation,
    request: &'a R,
}

/// AI service over a generation invoker and the response cache.
pub struct AiServiceImpl<G: GenerationInvoker> {
    invoker: Arc<G>,
    cache: ResponseCache,
    config: GenerationConfig,
}

impl<G: GenerationInvoker> AiServiceImpl<G> {
    /// Creates a new AI service.
    pub fn new(invoker: Arc<G>, cache: ResponseCache, config: GenerationConfig) -> Self {
        Self {
            invoker,
            cache,
            config,
        }
    }

    fn prompt(&self, system: &str, user: String) -> PromptContext {
        PromptContext {
            model: self.config.model.clone(),
            system: system.to_string(),
            user,
            max_tokens: self.config.max_tokens,
        }
    }

    /// Cache-aside around one generation call.
    async fn cached_generation<R>(
        &self,
        operation: Operation,
        request: &R,
        user_id: &UserId,
        prompt: PromptContext,
        extra_metadata: Map<String, Value>,
    ) -> CvgenResult<GenerationResponse>
    where
        R: Serialize + Sync,
    {
        let payload = CachedRequest { operation, request };

        if let Some(entry) = self.cache.lookup::<_, Value, Value>(&payload, user_id).await {
            info!(user_id = %user_id, operation = operation.verb(), "Returning cached CV");
            return Ok(entry.into());
        }

        let output = self.invoker.invoke(prompt).await.map_err(|e| {
            error!(
                user_id = %user_id,
                operation = operation.verb(),
                error = %e,
                "CV generation failed"
            );
            CvgenError::external("generation", format!("Failed to {} CV: {}", operation.verb(), e))
        })?;

        let content = parse_generated_content(&output.content);

        let mut metadata = Map::new();
        metadata.insert("model".to_string(), Value::String(self.config.model.clone()));
        metadata.insert(
            operation.timestamp_field().to_string(),
            serde_json::to_value(Utc::now())?,
        );
        metadata.extend(extra_metadata);

        let result = GenerationResult::new(content, Value::Object(metadata));
        self.cache.store(&payload, user_id, &result).await;

        Ok(result.into())
    }
}

fn insert_optional<T: Serialize>(
    metadata: &mut Map<String, Value>,
    key: &str,
    value: Option<&T>,
) -> CvgenResult<()> {
    if let Some(value) = value {
        metadata.insert(key.to_string(), serde_json::to_value(value)?);
    }
    Ok(())
}

#[async_trait]
impl<G: GenerationInvoker + 'static> AiService for AiServiceImpl<G> {
    async fn generate_cv(
        &self,
        request: GenerateCvRequest,
        user_id: &UserId,
    ) -> CvgenResult<GenerationResponse> {
        info!(user_id = %user_id, "Generating CV");
        request.validate_request()?;

        let prompt = self.prompt(GENERATION_SYSTEM_PROMPT, generate_user_message(&request));

        let mut metadata = Map::new();
        insert_optional(&mut metadata, "targetRole", request.target_role.as_ref())?;
        insert_optional(&mut metadata, "targetIndustry", request.target_industry.as_ref())?;

        self.cached_generation(Operation::Generate, &request, user_id, prompt, metadata)
            .await
    }

    async fn enhance_cv(
        &self,
        request: EnhanceCvRequest,
        user_id: &UserId,
    ) -> CvgenResult<GenerationResponse> {
        info!(user_id = %user_id, "Enhancing CV");
        request.validate_request()?;

        let prompt = self.prompt(ENHANCEMENT_SYSTEM_PROMPT, enhance_user_message(&request)?);

        let mut metadata = Map::new();
        insert_optional(&mut metadata, "targetRole", request.target_role.as_ref())?;
        insert_optional(&mut metadata, "targetIndustry", request.target_industry.as_ref())?;
        if !request.focus_areas.is_empty() {
            metadata.insert(
                "focusAreas".to_string(),
                serde_json::to_value(&request.focus_areas)?,
            );
        }

        self.cached_generation(Operation::Enhance, &request, user_id, prompt, metadata)
            .await
    }

    async fn optimize_cv(
        &self,
        request: OptimizeCvRequest,
        user_id: &UserId,
    ) -> CvgenResult<GenerationResponse> {
        info!(user_id = %user_id, "Optimizing CV for job description");
        request.validate_request()?;

        let prompt = self.prompt(OPTIMIZATION_SYSTEM_PROMPT, optimize_user_message(&request)?);

        let mut metadata = Map::new();
        metadata.insert(
            "jobDescriptionLength".to_string(),
            Value::from(request.job_description.chars().count()),
        );

        self.cached_generation(Operation::Optimize, &request, user_id, prompt, metadata)
            .await
    }

    async fn clear_user_cache(&self, user_id: &UserId) {
        self.cache.invalidate_user(user_id).await;
    }

    fn status(&self) -> AiStatusResponse {
        let cache_available = self.cache.is_available();

        if !self.config.has_api_key() {
            return AiStatusResponse {
                status: AiStatus::Misconfigured,
                message: format!("AI service requires {ANTHROPIC_API_KEY_ENV}"),
                cache_available,
            };
        }

        AiStatusResponse {
            status: AiStatus::Operational,
            message: format!("AI service is ready ({})", self.config.model),
            cache_available,
        }
    }
}
