//! Cached generation results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A generation result as produced by the caller on a cache miss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult<C = Value, M = Value> {
    /// Generated content.
    pub content: C,
    /// Provider and request metadata.
    pub metadata: M,
}

impl<C, M> GenerationResult<C, M> {
    /// Creates a new generation result.
    pub fn new(content: C, metadata: M) -> Self {
        Self { content, metadata }
    }
}

/// A stored generation result.
///
/// Entries are immutable; storing again under the same key replaces the
/// whole entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<C = Value, M = Value> {
    /// Generated content.
    pub content: C,
    /// Provider and request metadata.
    pub metadata: M,
    /// When the entry was written.
    pub cached_at: DateTime<Utc>,
}

impl<C, M> CacheEntry<C, M> {
    /// Creates a new entry stamped with `cached_at`.
    pub fn new(result: GenerationResult<C, M>, cached_at: DateTime<Utc>) -> Self {
        Self {
            content: result.content,
            metadata: result.metadata,
            cached_at,
        }
    }

    /// Drops the timestamp and returns the original result.
    pub fn into_result(self) -> GenerationResult<C, M> {
        GenerationResult {
            content: self.content,
            metadata: self.metadata,
        }
    }
}
