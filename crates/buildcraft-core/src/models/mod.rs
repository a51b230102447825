//! Cost domain model: categories, keys, line items, and server summaries.

pub mod category;
pub mod items;
pub mod key;
pub mod summary;

pub use category::{CostCategory, UnknownCategory};
pub use items::{category_total, CostItem, LaborItem, MaterialItem, OtherCostItem, PermitItem};
pub use key::{CostKey, InvalidKey, ItemId, SubprojectId};
pub use summary::CostSummary;
