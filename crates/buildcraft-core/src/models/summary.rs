use serde::{Deserialize, Serialize};

use super::category::CostCategory;

/// Per-category totals as returned by `GET /subprojects/{id}/cost-summary`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    pub total_materials: f64,
    pub total_labor: f64,
    pub total_permits: f64,
    pub total_other: f64,
    pub estimated_total: f64,
}

impl CostSummary {
    pub fn value_for(&self, category: CostCategory) -> f64 {
        match category {
            CostCategory::Materials => self.total_materials,
            CostCategory::Labor => self.total_labor,
            CostCategory::Permits => self.total_permits,
            CostCategory::Other => self.total_other,
        }
    }

    /// Build a summary from per-category values, computing the total.
    pub fn from_values(values: impl Fn(CostCategory) -> f64) -> Self {
        let total_materials = values(CostCategory::Materials);
        let total_labor = values(CostCategory::Labor);
        let total_permits = values(CostCategory::Permits);
        let total_other = values(CostCategory::Other);
        Self {
            total_materials,
            total_labor,
            total_permits,
            total_other,
            estimated_total: total_materials + total_labor + total_permits + total_other,
        }
    }
}
