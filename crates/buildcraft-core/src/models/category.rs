use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The four fixed kinds of itemized subproject cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    Materials,
    Labor,
    Permits,
    Other,
}

impl CostCategory {
    /// Every category, in the order totals are summed and displayed.
    pub const ALL: [CostCategory; 4] = [
        CostCategory::Materials,
        CostCategory::Labor,
        CostCategory::Permits,
        CostCategory::Other,
    ];

    /// Wire name, also used inside cost keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Materials => "materials",
            Self::Labor => "labor",
            Self::Permits => "permits",
            Self::Other => "other",
        }
    }

    /// Human-readable name for conflict dialogs and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Materials => "Materials",
            Self::Labor => "Labor",
            Self::Permits => "Permits",
            Self::Other => "Other Costs",
        }
    }

    /// REST resource segment under `/subprojects`.
    pub fn resource_path(&self) -> &'static str {
        match self {
            Self::Materials => "materials",
            Self::Labor => "labor",
            Self::Permits => "permits",
            Self::Other => "other-costs",
        }
    }
}

impl fmt::Display for CostCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown cost category name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown cost category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for CostCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "materials" => Ok(Self::Materials),
            "labor" => Ok(Self::Labor),
            "permits" => Ok(Self::Permits),
            "other" => Ok(Self::Other),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}
