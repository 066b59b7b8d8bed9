//! Configuration loader with layered sources.

use crate::{format_validation_errors, AppConfig, ConfigValidator};
use config::{Config, ConfigError, Environment, File, Map};
use cvgen_core::CvgenError;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Unprefixed variable holding the cache URL, honoured when `cache.url`
/// is not set through any other source.
pub const REDIS_URL_ENV: &str = "REDIS_URL";

/// Unprefixed variable holding the provider API key.
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Selects the environment-specific file (`config/{environment}.toml`).
pub const ENVIRONMENT_ENV: &str = "CVGEN_ENVIRONMENT";

/// Configuration loader with runtime refresh support.
#[derive(Clone)]
pub struct ConfigLoader {
    config: Arc<RwLock<AppConfig>>,
    config_dir: String,
    /// Fixed variables used instead of the process environment.
    vars: Option<Arc<HashMap<String, String>>>,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `config/default.toml` - Default values
    /// 2. `config/{environment}.toml` - Environment-specific overrides
    /// 3. `config/local.toml` - Local overrides
    /// 4. Environment variables with `CVGEN_` prefix (after loading `.env`)
    /// 5. `REDIS_URL` / `ANTHROPIC_API_KEY` for values still unset
    pub fn new(config_dir: impl Into<String>) -> Result<Self, CvgenError> {
        Self::build(config_dir.into(), None)
    }

    /// Creates a loader that reads variables from `vars` only.
    ///
    /// Neither `.env` nor the process environment is consulted.
    pub fn with_vars(
        config_dir: impl Into<String>,
        vars: HashMap<String, String>,
    ) -> Result<Self, CvgenError> {
        Self::build(config_dir.into(), Some(Arc::new(vars)))
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, CvgenError> {
        Self::new("./config")
    }

    fn build(
        config_dir: String,
        vars: Option<Arc<HashMap<String, String>>>,
    ) -> Result<Self, CvgenError> {
        let config = Self::load_config(&config_dir, vars.as_deref())?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_dir,
            vars,
        })
    }

    /// Returns the current configuration.
    pub async fn get(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Reloads the configuration from disk.
    pub async fn reload(&self) -> Result<(), CvgenError> {
        let new_config = Self::load_config(&self.config_dir, self.vars.as_deref())?;
        let mut config = self.config.write().await;
        *config = new_config;
        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Loads configuration from the specified directory.
    fn load_config(
        config_dir: &str,
        vars: Option<&HashMap<String, String>>,
    ) -> Result<AppConfig, CvgenError> {
        if vars.is_none() {
            if let Err(e) = dotenvy::dotenv() {
                debug!("No .env file found or error loading it: {}", e);
            }
        }

        let lookup = |name: &str| match vars {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        };

        let environment = lookup(ENVIRONMENT_ENV).unwrap_or_else(|| "development".to_string());

        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        for name in ["default", environment.as_str(), "local"] {
            let path = format!("{}/{}.toml", config_dir, name);
            if Path::new(&path).exists() {
                debug!("Loading config from: {}", path);
                builder = builder.add_source(File::with_name(&path).required(false));
            }
        }

        let mut env_source = Environment::with_prefix("CVGEN")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true);
        if let Some(vars) = vars {
            let fixed: Map<String, String> =
                vars.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            env_source = env_source.source(Some(fixed));
        }
        builder = builder.add_source(env_source);

        let config = builder.build().map_err(config_error_to_cvgen_error)?;

        let mut app_config: AppConfig = config
            .try_deserialize()
            .map_err(config_error_to_cvgen_error)?;

        apply_fallback_env(&mut app_config, lookup);

        ConfigValidator::validate(&app_config)
            .map_err(|errors| CvgenError::Configuration(format_validation_errors(&errors)))?;

        Ok(app_config)
    }
}

/// Fills unset values from the unprefixed variables and normalizes blank
/// strings to `None`.
pub fn apply_fallback_env<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

    config.cache.url =
        non_blank(config.cache.url.take()).or_else(|| non_blank(lookup(REDIS_URL_ENV)));
    config.generation.api_key = non_blank(config.generation.api_key.take())
        .or_else(|| non_blank(lookup(ANTHROPIC_API_KEY_ENV)));
}

fn config_error_to_cvgen_error(err: ConfigError) -> CvgenError {
    CvgenError::Configuration(err.to_string())
}
