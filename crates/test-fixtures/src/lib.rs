//! Test fixtures for the BuildCraft cost crates.
//!
//! Provides typed loading of the JSON item samples under `fixtures/` and a
//! scriptable in-memory `ItemApi` for driving the write queue in tests.

pub mod mock_api;

use std::path::PathBuf;

use buildcraft_core::models::{CostCategory, CostItem};
use serde::de::DeserializeOwned;

pub use mock_api::{ApiCall, MockItemApi};

/// Root directory of the fixture files.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Check that a fixture file exists.
pub fn fixture_exists(relative_path: &str) -> bool {
    fixtures_root().join(relative_path).exists()
}

/// Sample line items for one category, from `fixtures/items/{category}.json`.
pub fn sample_items(category: CostCategory) -> Vec<CostItem> {
    load_fixture(&format!("items/{}.json", category.as_str()))
}

/// Sample items with every persisted id stripped, so each one is a create.
pub fn new_items(category: CostCategory) -> Vec<CostItem> {
    sample_items(category)
        .into_iter()
        .map(|item| {
            let mut body = item.to_body().unwrap_or_else(|e| panic!("fixture body: {e}"));
            if let Some(obj) = body.as_object_mut() {
                obj.remove("id");
            }
            CostItem::from_body(category, body).unwrap_or_else(|e| panic!("fixture item: {e}"))
        })
        .collect()
}
