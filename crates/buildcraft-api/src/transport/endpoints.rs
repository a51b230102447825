//! REST paths, relative to the configured base URL.

use buildcraft_core::models::{CostCategory, ItemId, SubprojectId};

/// `POST` target for a new line item.
pub fn create_item(subproject_id: SubprojectId, category: CostCategory) -> String {
    format!("/subprojects/{subproject_id}/{}", category.resource_path())
}

/// `PUT`/`DELETE` target for a persisted line item.
pub fn item(category: CostCategory, item_id: ItemId) -> String {
    format!("/subprojects/{}/{item_id}", category.resource_path())
}

pub fn cost_summary(subproject_id: SubprojectId) -> String {
    format!("/subprojects/{subproject_id}/cost-summary")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_match_server_routes() {
        assert_eq!(
            create_item(SubprojectId(3), CostCategory::Other),
            "/subprojects/3/other-costs"
        );
        assert_eq!(item(CostCategory::Labor, ItemId(19)), "/subprojects/labor/19");
        assert_eq!(cost_summary(SubprojectId(8)), "/subprojects/8/cost-summary");
    }
}
