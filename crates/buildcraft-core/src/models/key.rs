use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::category::CostCategory;

/// Server-assigned subproject identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubprojectId(pub i64);

impl fmt::Display for SubprojectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubprojectId {
    type Err = InvalidKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(SubprojectId)
            .map_err(|_| InvalidKey(s.to_string()))
    }
}

impl From<i64> for SubprojectId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Server-assigned identifier of a persisted cost line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Composite key for one cost aggregate: a subproject and one category.
///
/// Displays as `"{subproject}-{category}"`, the form used by the conflict
/// surface and pending-key listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CostKey {
    pub subproject_id: SubprojectId,
    pub category: CostCategory,
}

impl CostKey {
    pub fn new(subproject_id: impl Into<SubprojectId>, category: CostCategory) -> Self {
        Self {
            subproject_id: subproject_id.into(),
            category,
        }
    }

    /// Keys for every category of a subproject.
    pub fn all_for(subproject_id: SubprojectId) -> [CostKey; 4] {
        CostCategory::ALL.map(|category| CostKey {
            subproject_id,
            category,
        })
    }
}

impl fmt::Display for CostKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.subproject_id, self.category)
    }
}

/// A string that is not a valid subproject id or cost key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid cost key: {0}")]
pub struct InvalidKey(pub String);

impl FromStr for CostKey {
    type Err = InvalidKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (subproject, category) = s.rsplit_once('-').ok_or_else(|| InvalidKey(s.to_string()))?;
        let subproject_id = subproject.parse::<SubprojectId>().map_err(|_| InvalidKey(s.to_string()))?;
        let category = category
            .parse::<CostCategory>()
            .map_err(|_| InvalidKey(s.to_string()))?;
        Ok(Self {
            subproject_id,
            category,
        })
    }
}
