//! Configuration validation.
//!
//! Collects every problem in one pass so a misconfigured deployment fails
//! at startup with the full list rather than one error at a time.

use crate::AppConfig;
use std::fmt;
use url::Url;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    /// URL format is invalid.
    InvalidUrl { url_type: String, message: String },
    /// A duration or count that must be positive is zero.
    NonPositive { name: String },
    /// Backoff cap is lower than the backoff step.
    BackoffCapBelowStep { step_ms: u64, cap_ms: u64 },
    /// Key prefix is empty.
    EmptyKeyPrefix,
    /// Log level is invalid.
    InvalidLogLevel { value: String },
    /// Sampling ratio must be between 0.0 and 1.0.
    InvalidSamplingRatio { value: f64 },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl { url_type, message } => {
                write!(f, "Invalid {} URL: {}", url_type, message)
            }
            Self::NonPositive { name } => write!(f, "'{}' must be positive", name),
            Self::BackoffCapBelowStep { step_ms, cap_ms } => write!(
                f,
                "Backoff cap ({}ms) cannot be lower than the backoff step ({}ms)",
                cap_ms, step_ms
            ),
            Self::EmptyKeyPrefix => write!(f, "Cache key prefix cannot be empty"),
            Self::InvalidLogLevel { value } => write!(
                f,
                "Invalid log level: '{}' (valid: trace, debug, info, warn, error)",
                value
            ),
            Self::InvalidSamplingRatio { value } => write!(
                f,
                "Invalid sampling ratio: {} (must be between 0.0 and 1.0)",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::validate_cache(&config.cache, &mut errors);
        Self::validate_generation(&config.generation, &mut errors);
        Self::validate_observability(&config.observability, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_cache(config: &crate::CacheConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.ttl_secs == 0 {
            errors.push(ConfigValidationError::NonPositive {
                name: "cache.ttl_secs".to_string(),
            });
        }
        if config.connect_max_attempts == 0 {
            errors.push(ConfigValidationError::NonPositive {
                name: "cache.connect_max_attempts".to_string(),
            });
        }
        if config.connect_backoff_cap_ms < config.connect_backoff_step_ms {
            errors.push(ConfigValidationError::BackoffCapBelowStep {
                step_ms: config.connect_backoff_step_ms,
                cap_ms: config.connect_backoff_cap_ms,
            });
        }
        if config.key_prefix.is_empty() {
            errors.push(ConfigValidationError::EmptyKeyPrefix);
        }

        // An unset URL is valid: it disables the cache.
        if !config.is_enabled() {
            return;
        }
        let raw = config.url.as_deref().unwrap_or_default().trim();
        match Url::parse(raw) {
            Ok(url) if url.scheme() == "redis" || url.scheme() == "rediss" => {}
            Ok(url) => errors.push(ConfigValidationError::InvalidUrl {
                url_type: "cache".to_string(),
                message: format!(
                    "unsupported scheme '{}' (expected redis or rediss)",
                    url.scheme()
                ),
            }),
            Err(e) => errors.push(ConfigValidationError::InvalidUrl {
                url_type: "cache".to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn validate_generation(
        config: &crate::GenerationConfig,
        errors: &mut Vec<ConfigValidationError>,
    ) {
        if config.max_tokens == 0 {
            errors.push(ConfigValidationError::NonPositive {
                name: "generation.max_tokens".to_string(),
            });
        }
    }

    fn validate_observability(
        config: &cvgen_core::TelemetryConfig,
        errors: &mut Vec<ConfigValidationError>,
    ) {
        let level = config.log_level.to_lowercase();
        if !Self::VALID_LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ConfigValidationError::InvalidLogLevel {
                value: config.log_level.clone(),
            });
        }

        if !(0.0..=1.0).contains(&config.sampling_ratio) {
            errors.push(ConfigValidationError::InvalidSamplingRatio {
                value: config.sampling_ratio,
            });
        }

        if let Some(ref endpoint) = config.otlp_endpoint {
            if Url::parse(endpoint).is_err() {
                errors.push(ConfigValidationError::InvalidUrl {
                    url_type: "otlp_endpoint".to_string(),
                    message: format!("Invalid URL format: {}", endpoint),
                });
            }
        }
    }
}

/// Formats validation errors for display.
#[must_use]
pub fn format_validation_errors(errors: &[ConfigValidationError]) -> String {
    let mut output = String::from("Configuration validation failed:");
    for (i, error) in errors.iter().enumerate() {
        output.push_str(&format!("\n  {}. {}", i + 1, error));
    }
    output
}
