//! Configuration for the cost engine, with layered resolution.
//!
//! Resolution order (highest priority first):
//! 1. Environment variables (`BUILDCRAFT_*`)
//! 2. Config file (`buildcraft.toml`)
//! 3. Compiled defaults

pub mod api_config;
pub mod defaults;
pub mod observability_config;
pub mod queue_config;
pub mod store_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use api_config::ApiConfig;
pub use observability_config::ObservabilityConfig;
pub use queue_config::QueueConfig;
pub use store_config::StoreConfig;

use crate::constants::{API_TOKEN_ENV_VAR, API_URL_ENV_VAR, DEBOUNCE_ENV_VAR, LOG_ENV_VAR};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildcraftConfig {
    pub queue: QueueConfig,
    pub store: StoreConfig,
    pub api: ApiConfig,
    pub observability: ObservabilityConfig,
}

impl BuildcraftConfig {
    /// Load a config file, apply environment overrides, and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let mut config: BuildcraftConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string. Environment
    /// overrides are not applied.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: BuildcraftConfig =
            toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
                path: "<string>".to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `BUILDCRAFT_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV_VAR) {
            self.api.base_url = url;
        }
        if let Some(token) = lookup(API_TOKEN_ENV_VAR) {
            if !token.is_empty() {
                self.api.token = Some(token);
            }
        }
        if let Some(val) = lookup(DEBOUNCE_ENV_VAR) {
            if let Ok(ms) = val.parse::<u64>() {
                self.queue.debounce_ms = ms;
            }
        }
        if let Some(level) = lookup(LOG_ENV_VAR) {
            self.observability.log_level = level;
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue.debounce_ms == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "queue.debounce_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.store.staleness_ms == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "store.staleness_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationFailed {
                field: "api.base_url".to_string(),
                message: format!("must be an http(s) URL, got {url:?}"),
            });
        }
        if self.api.initial_backoff_ms > self.api.max_backoff_ms {
            return Err(ConfigError::ValidationFailed {
                field: "api.initial_backoff_ms".to_string(),
                message: "must not exceed api.max_backoff_ms".to_string(),
            });
        }
        Ok(())
    }
}
