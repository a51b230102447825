use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Item CRUD API transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL, including the `/api` prefix.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries for idempotent requests (PUT, DELETE, GET).
    pub max_retries: u32,
    /// Initial backoff, doubled after every retry.
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Bearer token. Only ever supplied through the environment.
    #[serde(skip)]
    pub token: Option<String>,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: defaults::DEFAULT_API_TIMEOUT_SECS,
            max_retries: defaults::DEFAULT_API_MAX_RETRIES,
            initial_backoff_ms: defaults::DEFAULT_API_INITIAL_BACKOFF_MS,
            max_backoff_ms: defaults::DEFAULT_API_MAX_BACKOFF_MS,
            token: None,
        }
    }
}
