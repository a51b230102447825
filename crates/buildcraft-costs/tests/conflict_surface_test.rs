//! ConflictSurface: open/close lifecycle, presentation, single resolution.

use std::sync::Arc;
use std::time::Duration;

use buildcraft_core::config::BuildcraftConfig;
use buildcraft_core::models::{CostCategory, CostKey, SubprojectId};
use buildcraft_costs::{CostSession, Resolution};
use test_fixtures::MockItemApi;

const SUBPROJECT: SubprojectId = SubprojectId(3);

fn session() -> (Arc<MockItemApi>, CostSession<MockItemApi>) {
    let api = Arc::new(MockItemApi::new());
    api.hold();
    let session = CostSession::new(Arc::clone(&api), &BuildcraftConfig::default()).unwrap();
    (api, session)
}

/// Pending local edit of `local`, then a refetch reporting `server`.
fn conflict(session: &CostSession<MockItemApi>, category: CostCategory, local: f64, server: f64) {
    let store = session.store();
    drop(store.update_cost(SUBPROJECT, category, local, Vec::new()));
    store.set_confirmed_cost(SUBPROJECT, category, server);
}

// ─── Lifecycle ───────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn opens_on_conflict_and_closes_after_last_resolution() {
    let (_api, session) = session();
    let mut surface = session.conflict_surface();
    assert!(!surface.sync());
    assert!(surface.entries().is_empty());

    conflict(&session, CostCategory::Materials, 1234.5, 1200.0);
    conflict(&session, CostCategory::Other, 80.0, 95.25);
    assert!(surface.sync());
    assert_eq!(surface.entries().len(), 2);

    let materials = CostKey::new(SUBPROJECT, CostCategory::Materials);
    assert!(surface.resolve(&materials, Resolution::KeepLocal));
    assert!(surface.is_open());
    assert_eq!(surface.entries().len(), 1);

    let other = CostKey::new(SUBPROJECT, CostCategory::Other);
    assert!(surface.resolve(&other, Resolution::UseServer));
    assert!(!surface.is_open());

    let store = session.store();
    assert_eq!(store.get_display_value(SUBPROJECT, CostCategory::Materials), 1234.5);
    assert_eq!(store.get_display_value(SUBPROJECT, CostCategory::Other), 95.25);
}

#[tokio::test(start_paused = true)]
async fn second_resolution_of_same_key_is_rejected() {
    let (_api, session) = session();
    let mut surface = session.conflict_surface();
    conflict(&session, CostCategory::Labor, 500.0, 450.0);
    surface.sync();

    let key = CostKey::new(SUBPROJECT, CostCategory::Labor);
    assert!(surface.resolve(&key, Resolution::UseServer));
    assert!(!surface.resolve(&key, Resolution::KeepLocal));
    assert_eq!(session.store().get_display_value(SUBPROJECT, CostCategory::Labor), 450.0);
}

#[tokio::test(start_paused = true)]
async fn dismissed_surface_reopens_only_when_conflicts_change() {
    let (_api, session) = session();
    let mut surface = session.conflict_surface();
    conflict(&session, CostCategory::Permits, 60.0, 75.0);
    assert!(surface.sync());

    surface.dismiss();
    assert!(!surface.sync());
    assert!(surface.entries().is_empty());
    assert_eq!(session.store().get_conflicts().len(), 1);

    conflict(&session, CostCategory::Labor, 10.0, 12.0);
    assert!(surface.sync());
}

#[tokio::test(start_paused = true)]
async fn dismissed_surface_reopens_when_one_conflict_replaces_another() {
    let (_api, session) = session();
    let mut surface = session.conflict_surface();
    conflict(&session, CostCategory::Permits, 60.0, 75.0);
    assert!(surface.sync());
    surface.dismiss();

    let permits = CostKey::new(SUBPROJECT, CostCategory::Permits);
    assert!(session.store().resolve_conflict(&permits, true));
    conflict(&session, CostCategory::Labor, 10.0, 12.0);
    assert_eq!(session.store().get_conflicts().len(), 1);

    assert!(surface.sync());
    let entries = surface.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].category, CostCategory::Labor);
}

#[tokio::test(start_paused = true)]
async fn wait_for_change_picks_up_new_conflicts() {
    let (_api, session) = session();
    let mut surface = session.conflict_surface();
    drop(session.store().update_cost(SUBPROJECT, CostCategory::Labor, 300.0, Vec::new()));
    surface.sync();

    let store = session.store().clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        store.set_confirmed_cost(SUBPROJECT, CostCategory::Labor, 275.0);
    });

    assert!(surface.wait_for_change().await);
    assert_eq!(surface.entries().len(), 1);
}

// ─── Presentation ────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn entries_carry_labels_and_currency() {
    let (_api, session) = session();
    let mut surface = session.conflict_surface();
    conflict(&session, CostCategory::Other, 1234.5, 980.0);
    surface.sync();

    let entries = surface.entries();
    let entry = &entries[0];
    assert_eq!(entry.key, CostKey::new(SUBPROJECT, CostCategory::Other));
    assert_eq!(entry.title, "Other Costs Cost Conflict");
    assert_eq!(entry.local_display, "$1,234.50");
    assert_eq!(entry.server_display, "$980.00");
    assert!(!entry.edited_time().is_empty());

    let record = &session.store().get_conflicts()[&entry.key];
    assert_eq!(entry.edited_at, record.edited_at);
    assert!(record.detected_at >= record.edited_at);
}
