//! # buildcraft-core
//!
//! Foundation crate for BuildCraft cost tracking.
//! Defines the cost domain types, the item CRUD trait, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::BuildcraftConfig;
pub use errors::{ApiError, ApiResult, BuildcraftError, BuildcraftResult, WriteError, WriteResult};
pub use models::{CostCategory, CostItem, CostKey, CostSummary, ItemId, SubprojectId};
pub use traits::ItemApi;
