use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Optimistic cost store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Age after which an unsettled optimistic value is no longer displayed.
    pub staleness_ms: u64,
}

impl StoreConfig {
    pub fn staleness(&self) -> Duration {
        Duration::from_millis(self.staleness_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            staleness_ms: defaults::DEFAULT_STALENESS_MS,
        }
    }
}
