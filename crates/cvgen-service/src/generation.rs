//! Language-model invocation seam.

use async_trait::async_trait;
use cvgen_core::CvgenResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One prompt sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptContext {
    /// Model identifier.
    pub model: String,
    /// System prompt.
    pub system: String,
    /// User message.
    pub user: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

/// Text produced by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutput {
    /// Text of the first content block.
    pub content: String,
    /// Provider response as received.
    pub raw: Value,
}

impl GenerationOutput {
    /// Output with no provider payload attached.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            raw: Value::Null,
        }
    }
}

/// Calls the language model.
///
/// Invocations are expensive and not idempotent, so implementations must
/// not retry on their own.
#[async_trait]
pub trait GenerationInvoker: Send + Sync {
    /// Sends `prompt` and returns the generated text.
    async fn invoke(&self, prompt: PromptContext) -> CvgenResult<GenerationOutput>;
}
