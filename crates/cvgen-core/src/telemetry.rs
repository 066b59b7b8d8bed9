//! Tracing subscriber bootstrap.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a
//! pretty or JSON formatting layer. With the `otlp` feature enabled and an
//! endpoint configured, spans are additionally exported over OTLP.

#[cfg(feature = "otlp")]
use opentelemetry::trace::TracerProvider;
#[cfg(feature = "otlp")]
use opentelemetry::KeyValue;
#[cfg(feature = "otlp")]
use opentelemetry_otlp::WithExportConfig;
#[cfg(feature = "otlp")]
use opentelemetry_sdk::{
    runtime,
    trace::{RandomIdGenerator, Sampler},
    Resource,
};
#[cfg(feature = "otlp")]
use opentelemetry_semantic_conventions::resource::SERVICE_NAME;

use crate::{CvgenError, CvgenResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

/// Output format of the console log layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-field output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = CvgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(CvgenError::Configuration(format!("Unknown log format: {other}"))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => f.write_str("pretty"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Service name attached to exported spans.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Base log level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Console output format.
    #[serde(default)]
    pub log_format: LogFormat,

    /// OTLP endpoint URL (e.g., "http://localhost:4317").
    #[serde(default)]
    pub otlp_endpoint: Option<String>,

    /// Sampling ratio (0.0 to 1.0).
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

fn default_service_name() -> String {
    "cvgen-backend".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            otlp_endpoint: None,
            sampling_ratio: default_sampling_ratio(),
        }
    }
}

impl TelemetryConfig {
    /// Filter directives applied when `RUST_LOG` is unset.
    #[must_use]
    pub fn default_directives(&self) -> String {
        format!("{},cvgen=debug", self.log_level)
    }
}

/// Initialize the global tracing subscriber.
///
/// Fails if a global subscriber is already installed.
pub fn init_telemetry(config: &TelemetryConfig) -> CvgenResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directives()));

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().with_target(true).boxed(),
    };

    let registry = tracing_subscriber::registry().with(fmt_layer).with(filter);

    #[cfg(feature = "otlp")]
    if let Some(endpoint) = &config.otlp_endpoint {
        let tracer = build_otlp_tracer(config, endpoint)?;
        registry
            .with(tracing_opentelemetry::layer().with_tracer(tracer))
            .try_init()
            .map_err(|e| {
                CvgenError::internal(format!("Failed to install tracing subscriber: {e}"))
            })?;

        tracing::info!(
            service_name = %config.service_name,
            sampling_ratio = %config.sampling_ratio,
            otlp_endpoint = %endpoint,
            "Telemetry initialized with OTLP export"
        );
        return Ok(());
    }

    registry
        .try_init()
        .map_err(|e| CvgenError::internal(format!("Failed to install tracing subscriber: {e}")))?;

    tracing::debug!(log_format = %config.log_format, "Logging initialized");
    Ok(())
}

#[cfg(feature = "otlp")]
fn build_otlp_tracer(
    config: &TelemetryConfig,
    endpoint: &str,
) -> CvgenResult<opentelemetry_sdk::trace::Tracer> {
    let sampler = if config.sampling_ratio >= 1.0 {
        Sampler::AlwaysOn
    } else if config.sampling_ratio <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(config.sampling_ratio)
    };

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| CvgenError::internal(format!("Failed to create OTLP exporter: {e}")))?;

    let tracer_provider = opentelemetry_sdk::trace::TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_sampler(sampler)
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(Resource::new(vec![KeyValue::new(
            SERVICE_NAME,
            config.service_name.clone(),
        )]))
        .build();

    let tracer = tracer_provider.tracer("cvgen-backend");
    opentelemetry::global::set_tracer_provider(tracer_provider);
    Ok(tracer)
}

/// Shutdown telemetry, flushing any pending spans.
#[cfg(feature = "otlp")]
pub fn shutdown_telemetry() {
    opentelemetry::global::shutdown_tracer_provider();
    tracing::info!("Telemetry shutdown complete");
}

/// No exporter to flush without the `otlp` feature.
#[cfg(not(feature = "otlp"))]
pub fn shutdown_telemetry() {}
