//! Line-item payloads for the four cost resource families.
//!
//! Field records mirror the server's item schemas. The write path treats them
//! as opaque apart from the persisted `id`: absent means create, present means
//! update.

use serde::{Deserialize, Serialize};

use super::category::CostCategory;
use super::key::ItemId;

/// A material line: quantity of some unit at a unit cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    pub description: String,
    pub unit: String,
    pub quantity: f64,
    pub unit_cost: f64,
    /// Free-form material grouping (lumber, electrical, ...).
    #[serde(default)]
    pub category: Option<String>,
}

/// A labor line: a crew of workers billed hourly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaborItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    pub role: String,
    pub number_of_workers: u32,
    pub hourly_rate: f64,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermitItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    pub description: String,
    pub cost: f64,
    #[serde(default)]
    pub issued_date: Option<String>,
    #[serde(default)]
    pub expiration_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherCostItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    pub description: String,
    pub cost: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One line item of any cost category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CostItem {
    #[serde(rename = "materials")]
    Material(MaterialItem),
    Labor(LaborItem),
    #[serde(rename = "permits")]
    Permit(PermitItem),
    Other(OtherCostItem),
}

impl CostItem {
    pub fn category(&self) -> CostCategory {
        match self {
            Self::Material(_) => CostCategory::Materials,
            Self::Labor(_) => CostCategory::Labor,
            Self::Permit(_) => CostCategory::Permits,
            Self::Other(_) => CostCategory::Other,
        }
    }

    /// Persisted identifier, if the server has already stored this line.
    pub fn id(&self) -> Option<ItemId> {
        match self {
            Self::Material(m) => m.id,
            Self::Labor(l) => l.id,
            Self::Permit(p) => p.id,
            Self::Other(o) => o.id,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id().is_some()
    }

    /// Return a copy carrying the given persisted id.
    pub fn with_id(mut self, id: ItemId) -> Self {
        match &mut self {
            Self::Material(m) => m.id = Some(id),
            Self::Labor(l) => l.id = Some(id),
            Self::Permit(p) => p.id = Some(id),
            Self::Other(o) => o.id = Some(id),
        }
        self
    }

    /// Cost contributed by this line, using the server's summary formulas.
    pub fn line_total(&self) -> f64 {
        match self {
            Self::Material(m) => m.quantity * m.unit_cost,
            Self::Labor(l) => f64::from(l.number_of_workers) * l.hourly_rate * l.hours,
            Self::Permit(p) => p.cost,
            Self::Other(o) => o.cost,
        }
    }

    /// Serialize only the field record, as the item endpoints expect it.
    pub fn to_body(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            Self::Material(m) => serde_json::to_value(m),
            Self::Labor(l) => serde_json::to_value(l),
            Self::Permit(p) => serde_json::to_value(p),
            Self::Other(o) => serde_json::to_value(o),
        }
    }

    /// Decode an endpoint response body as an item of `category`.
    pub fn from_body(category: CostCategory, body: serde_json::Value) -> serde_json::Result<Self> {
        Ok(match category {
            CostCategory::Materials => Self::Material(serde_json::from_value(body)?),
            CostCategory::Labor => Self::Labor(serde_json::from_value(body)?),
            CostCategory::Permits => Self::Permit(serde_json::from_value(body)?),
            CostCategory::Other => Self::Other(serde_json::from_value(body)?),
        })
    }
}

/// Sum of line totals. Table components pass this to the cost store as the
/// new aggregate for a category.
pub fn category_total<'a>(items: impl IntoIterator<Item = &'a CostItem>) -> f64 {
    items.into_iter().map(CostItem::line_total).sum()
}
