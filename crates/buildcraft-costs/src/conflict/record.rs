//! Conflict records: a server value that disagrees with a pending local edit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use buildcraft_core::models::{CostCategory, CostKey, SubprojectId};

/// A detected disagreement awaiting a human decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub subproject_id: SubprojectId,
    pub category: CostCategory,
    /// The pending optimistic value.
    pub local_value: f64,
    /// The value reported by the server.
    pub server_value: f64,
    /// When the local value was entered.
    pub edited_at: DateTime<Utc>,
    /// When the server value arrived.
    pub detected_at: DateTime<Utc>,
}

impl ConflictRecord {
    pub fn key(&self) -> CostKey {
        CostKey::new(self.subproject_id, self.category)
    }

    /// The value a resolution settles on.
    pub fn chosen(&self, resolution: Resolution) -> f64 {
        match resolution {
            Resolution::KeepLocal => self.local_value,
            Resolution::UseServer => self.server_value,
        }
    }
}

/// Which side of a conflict wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    KeepLocal,
    UseServer,
}

impl Resolution {
    pub fn from_use_local(use_local: bool) -> Self {
        if use_local {
            Self::KeepLocal
        } else {
            Self::UseServer
        }
    }
}
