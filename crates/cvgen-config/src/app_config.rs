//! Application configuration structures.

use cvgen_core::TelemetryConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name and metadata.
    #[serde(default)]
    pub app: AppMetadata,

    /// AI response cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Language-model generation configuration.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub observability: TelemetryConfig,
}

/// Application metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMetadata {
    /// Application name.
    pub name: String,
    /// Application version.
    pub version: String,
    /// Environment (development, staging, production).
    pub environment: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "cvgen-backend".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Hosts that only accept TLS connections.
const MANAGED_TLS_HOST_SUFFIXES: &[&str] = &["upstash.io"];

/// AI response cache configuration.
///
/// Leaving `url` unset disables the cache for the lifetime of the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Redis URL (`redis://` or `rediss://`).
    pub url: Option<String>,
    /// Entry time-to-live in seconds.
    pub ttl_secs: u64,
    /// Namespace prepended to every key owned by the cache.
    pub key_prefix: String,
    /// Connection attempts before the cache settles into unavailable mode.
    pub connect_max_attempts: u32,
    /// Backoff step in milliseconds; attempt `n` waits `n * step`.
    pub connect_backoff_step_ms: u64,
    /// Upper bound on the backoff delay in milliseconds.
    pub connect_backoff_cap_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: None,
            ttl_secs: 3600, // 1 hour
            key_prefix: "cv:generation:".to_string(),
            connect_max_attempts: 3,
            connect_backoff_step_ms: 50,
            connect_backoff_cap_ms: 2000,
        }
    }
}

impl CacheConfig {
    /// Returns true if a store URL is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.url.as_deref().is_some_and(|url| !url.trim().is_empty())
    }

    /// Returns the entry TTL as a Duration.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Returns the backoff step as a Duration.
    #[must_use]
    pub const fn backoff_step(&self) -> Duration {
        Duration::from_millis(self.connect_backoff_step_ms)
    }

    /// Returns the backoff cap as a Duration.
    #[must_use]
    pub const fn backoff_cap(&self) -> Duration {
        Duration::from_millis(self.connect_backoff_cap_ms)
    }

    /// Returns true if the configured endpoint must be reached over TLS.
    #[must_use]
    pub fn requires_tls(&self) -> bool {
        self.url
            .as_deref()
            .and_then(|url| Url::parse(url).ok())
            .is_some_and(|url| {
                url.scheme() == "rediss"
                    || url.host_str().is_some_and(|host| {
                        MANAGED_TLS_HOST_SUFFIXES
                            .iter()
                            .any(|suffix| host == *suffix || host.ends_with(&format!(".{suffix}")))
                    })
            })
    }

    /// Returns the URL to connect with, upgraded to `rediss://` when the
    /// endpoint requires TLS.
    ///
    /// Returns `None` when the cache is disabled.
    #[must_use]
    pub fn connection_url(&self) -> Option<String> {
        let raw = self.url.as_deref().map(str::trim).filter(|url| !url.is_empty())?;

        if !self.requires_tls() {
            return Some(raw.to_string());
        }

        match Url::parse(raw) {
            Ok(mut url) if url.scheme() == "redis" => {
                if url.set_scheme("rediss").is_ok() {
                    Some(url.to_string())
                } else {
                    Some(raw.to_string())
                }
            }
            _ => Some(raw.to_string()),
        }
    }
}

/// Language-model generation configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Provider API key. Generation is reported as misconfigured without it.
    pub api_key: Option<String>,
    /// Model identifier sent with each request.
    pub model: String,
    /// Upper bound on generated tokens per request.
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 4000,
        }
    }
}

impl GenerationConfig {
    /// Returns true if an API key is present.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}
