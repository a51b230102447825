//! Conflicts between pending local edits and refetched server values.

pub mod record;
pub mod surface;

pub use record::{ConflictRecord, Resolution};
pub use surface::{format_usd, ConflictEntry, ConflictSurface};
