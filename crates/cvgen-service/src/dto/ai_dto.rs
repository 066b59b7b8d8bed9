//! Generation response DTOs.

use cvgen_cache::{CacheEntry, GenerationResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Generated resume with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    pub content: Value,
    pub metadata: Value,
}

impl From<GenerationResult> for GenerationResponse {
    fn from(result: GenerationResult) -> Self {
        Self {
            content: result.content,
            metadata: result.metadata,
        }
    }
}

impl From<CacheEntry> for GenerationResponse {
    fn from(entry: CacheEntry) -> Self {
        entry.into_result().into()
    }
}

/// Health of the generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiStatus {
    Operational,
    Misconfigured,
}

impl fmt::Display for AiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operational => write!(f, "operational"),
            Self::Misconfigured => write!(f, "misconfigured"),
        }
    }
}

/// Status report of the generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiStatusResponse {
    pub status: AiStatus,
    pub message: String,
    pub cache_available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_serialization() {
        let status = AiStatusResponse {
            status: AiStatus::Misconfigured,
            message: "missing key".to_string(),
            cache_available: false,
        };
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            json!({"status": "misconfigured", "message": "missing key", "cacheAvailable": false})
        );
    }

    #[test]
    fn test_response_from_entry_drops_timestamp() {
        let entry = CacheEntry::new(
            GenerationResult::new(json!({"a": 1}), json!({"model": "m"})),
            chrono::Utc::now(),
        );
        let response = GenerationResponse::from(entry);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"content": {"a": 1}, "metadata": {"model": "m"}})
        );
    }
}
