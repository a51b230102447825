use crate::models::{CostCategory, CostItem, CostKey};

use super::api_error::ApiError;

/// Outcome of a queued cost write that did not succeed.
///
/// `Superseded` and `Cancelled` are control flow, not failures: callers treat
/// them as silent no-ops. Everything else is a genuine failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WriteError {
    #[error("update for {key} was superseded by a newer one")]
    Superseded { key: CostKey },

    #[error("update for {key} was cancelled")]
    Cancelled { key: CostKey },

    #[error("update for {key} timed out after {timeout_ms} ms")]
    TimedOut { key: CostKey, timeout_ms: u64 },

    #[error("update for {key} contains a {found} item")]
    CategoryMismatch { key: CostKey, found: CostCategory },

    #[error("{failed} of {total} item writes failed for {key}: {source}")]
    Api {
        key: CostKey,
        failed: usize,
        total: usize,
        /// Items the server accepted before the batch failed.
        persisted: Vec<CostItem>,
        source: ApiError,
    },

    #[error("write task for {key} failed: {reason}")]
    Internal { key: CostKey, reason: String },
}

impl WriteError {
    pub fn key(&self) -> CostKey {
        match self {
            Self::Superseded { key }
            | Self::Cancelled { key }
            | Self::TimedOut { key, .. }
            | Self::CategoryMismatch { key, .. }
            | Self::Api { key, .. }
            | Self::Internal { key, .. } => *key,
        }
    }

    /// True for outcomes callers must swallow without notifying the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Superseded { .. } | Self::Cancelled { .. })
    }
}
