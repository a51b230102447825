//! # buildcraft-costs
//!
//! Optimistic cost aggregation: a debounced per-key write queue, the cost
//! store that displays optimistic values ahead of server confirmation, and
//! the conflict surface for when a refetch disagrees with a pending edit.

pub mod conflict;
pub mod session;
pub mod store;
pub mod write_queue;

pub use conflict::{format_usd, ConflictEntry, ConflictRecord, ConflictSurface, Resolution};
pub use session::CostSession;
pub use store::{CostStore, CostValue};
pub use write_queue::{WriteQueue, WriteReceipt};
