use std::sync::Arc;

use buildcraft_core::config::BuildcraftConfig;
use buildcraft_core::models::{CostCategory, SubprojectId};
use buildcraft_costs::CostSession;
use proptest::prelude::*;
use test_fixtures::MockItemApi;

fn rt() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .unwrap()
}

fn amount() -> impl Strategy<Value = f64> {
    (0u64..10_000_000).prop_map(|cents| cents as f64 / 100.0)
}

proptest! {
    #[test]
    fn aggregate_is_sum_of_confirmed_values(values in prop::array::uniform4(amount())) {
        rt().block_on(async {
            let session = CostSession::new(Arc::new(MockItemApi::new()), &BuildcraftConfig::default()).unwrap();
            let store = session.store();
            let subproject = SubprojectId(1);
            for (category, value) in CostCategory::ALL.into_iter().zip(values) {
                store.set_confirmed_cost(subproject, category, value);
            }
            let expected: f64 = values.iter().sum();
            prop_assert!((store.get_aggregate_total(subproject) - expected).abs() < 1e-6);
            prop_assert_eq!(store.summary(subproject).estimated_total, store.get_aggregate_total(subproject));
            Ok(())
        })?;
    }

    #[test]
    fn last_optimistic_value_is_displayed(edits in prop::collection::vec(amount(), 1..10)) {
        rt().block_on(async {
            let session = CostSession::new(Arc::new(MockItemApi::new()), &BuildcraftConfig::default()).unwrap();
            let store = session.store();
            let subproject = SubprojectId(2);
            let mut writes = Vec::new();
            for value in &edits {
                writes.push(store.update_cost(subproject, CostCategory::Labor, *value, Vec::new()));
            }
            let last = *edits.last().unwrap();
            prop_assert_eq!(store.get_display_value(subproject, CostCategory::Labor), last);
            for write in writes {
                prop_assert!(write.await.is_ok());
            }
            let record = store.record(subproject, CostCategory::Labor).unwrap();
            prop_assert_eq!(record.confirmed, last);
            prop_assert!(!record.is_pending);
            Ok(())
        })?;
    }

    #[test]
    fn conflict_only_when_server_disagrees(local in amount(), server in amount()) {
        rt().block_on(async {
            let session = CostSession::new(Arc::new(MockItemApi::new()), &BuildcraftConfig::default()).unwrap();
            let store = session.store();
            let subproject = SubprojectId(3);
            let _write = store.update_cost(subproject, CostCategory::Permits, local, Vec::new());
            store.set_confirmed_cost(subproject, CostCategory::Permits, server);
            prop_assert_eq!(store.get_conflicts().len(), usize::from(local != server));
            Ok(())
        })?;
    }
}
