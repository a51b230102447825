//! UI-agnostic view model for the conflict dialog.

use std::collections::BTreeSet;

use chrono::{DateTime, Local, Utc};

use buildcraft_core::models::{CostCategory, CostKey};
use buildcraft_core::traits::ItemApi;
use tokio::sync::watch;

use super::record::Resolution;
use crate::store::CostStore;

/// One conflict as the dialog presents it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictEntry {
    pub key: CostKey,
    pub category: CostCategory,
    /// e.g. "Labor Cost Conflict".
    pub title: String,
    pub local_value: f64,
    pub server_value: f64,
    pub local_display: String,
    pub server_display: String,
    pub edited_at: DateTime<Utc>,
}

impl ConflictEntry {
    /// Local time of the edit, as shown under the local value.
    pub fn edited_time(&self) -> String {
        self.edited_at
            .with_timezone(&Local)
            .format("%-I:%M:%S %p")
            .to_string()
    }
}

/// Tracks whether the conflict dialog is open and routes resolutions to
/// the store.
///
/// Opens whenever the set of conflicting keys changes and is non-empty,
/// and closes once none remain. `dismiss` hides it until that set changes.
pub struct ConflictSurface<A: ItemApi> {
    store: CostStore<A>,
    revisions: watch::Receiver<u64>,
    open: bool,
    last_keys: BTreeSet<CostKey>,
}

impl<A: ItemApi> ConflictSurface<A> {
    pub fn new(store: CostStore<A>) -> Self {
        let revisions = store.subscribe();
        let mut surface = Self {
            store,
            revisions,
            open: false,
            last_keys: BTreeSet::new(),
        };
        surface.sync();
        surface
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Re-read the store's conflicts. Returns whether the surface is open.
    pub fn sync(&mut self) -> bool {
        let keys: BTreeSet<CostKey> = self.store.get_conflicts().into_keys().collect();
        if keys.is_empty() {
            self.open = false;
        } else if keys != self.last_keys {
            self.open = true;
        }
        self.last_keys = keys;
        self.revisions.borrow_and_update();
        self.open
    }

    /// Wait for the next store change, then re-sync.
    pub async fn wait_for_change(&mut self) -> bool {
        if self.revisions.changed().await.is_err() {
            // Store dropped.
            self.open = false;
            return false;
        }
        self.sync()
    }

    /// Conflicts to render. Empty while the surface is closed.
    pub fn entries(&self) -> Vec<ConflictEntry> {
        if !self.open {
            return Vec::new();
        }
        self.store
            .get_conflicts()
            .into_iter()
            .map(|(key, record)| ConflictEntry {
                key,
                category: record.category,
                title: format!("{} Cost Conflict", record.category.label()),
                local_value: record.local_value,
                server_value: record.server_value,
                local_display: format_usd(record.local_value),
                server_display: format_usd(record.server_value),
                edited_at: record.edited_at,
            })
            .collect()
    }

    /// Apply one resolution. Returns `false` if the key has no open conflict,
    /// including when it was already resolved.
    pub fn resolve(&mut self, key: &CostKey, resolution: Resolution) -> bool {
        let resolved = self
            .store
            .resolve_conflict(key, resolution == Resolution::KeepLocal);
        self.sync();
        resolved
    }

    /// Close without resolving anything.
    pub fn dismiss(&mut self) {
        self.open = false;
    }
}

/// Format an amount as US dollars with cents: `$1,234.50`.
pub fn format_usd(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}
