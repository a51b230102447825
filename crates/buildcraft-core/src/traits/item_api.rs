//! ItemApi: the item CRUD surface the write path consumes.

use std::future::Future;

use crate::errors::ApiResult;
use crate::models::{CostCategory, CostItem, CostSummary, ItemId, SubprojectId};

/// Per-item create/update/delete across the four cost resource families.
///
/// Futures are `Send` so batches can fan out across spawned tasks.
pub trait ItemApi: Send + Sync + 'static {
    /// Persist a new line item under a subproject.
    fn create(
        &self,
        subproject_id: SubprojectId,
        item: CostItem,
    ) -> impl Future<Output = ApiResult<CostItem>> + Send;

    /// Overwrite the fields of a persisted line item.
    fn update(&self, item_id: ItemId, item: CostItem)
        -> impl Future<Output = ApiResult<CostItem>> + Send;

    fn delete(
        &self,
        category: CostCategory,
        item_id: ItemId,
    ) -> impl Future<Output = ApiResult<()>> + Send;

    /// Authoritative per-category totals for a subproject.
    fn cost_summary(
        &self,
        subproject_id: SubprojectId,
    ) -> impl Future<Output = ApiResult<CostSummary>> + Send;
}
