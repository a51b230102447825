use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Debounced write queue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Quiet period before a burst of updates for one key is flushed.
    pub debounce_ms: u64,
    /// Upper bound on a single in-flight batch. 0 disables the watchdog.
    pub request_timeout_ms: u64,
}

impl QueueConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            debounce_ms: defaults::DEFAULT_DEBOUNCE_MS,
            request_timeout_ms: defaults::DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}
