//! Scriptable in-memory `ItemApi`.
//!
//! Records every call, assigns ids to created items, and can be told to
//! delay, fail, or hold requests so tests can observe in-flight states.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use buildcraft_core::errors::{ApiError, ApiResult};
use buildcraft_core::models::{CostCategory, CostItem, CostSummary, ItemId, SubprojectId};
use buildcraft_core::traits::ItemApi;
use tokio::sync::watch;

/// One recorded request against the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Create {
        subproject_id: SubprojectId,
        item: CostItem,
    },
    Update {
        item_id: ItemId,
        item: CostItem,
    },
    Delete {
        category: CostCategory,
        item_id: ItemId,
    },
    Summary {
        subproject_id: SubprojectId,
    },
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<ApiCall>,
    latency: Duration,
    /// Errors handed out to the next calls, in order.
    scripted: VecDeque<ApiError>,
    /// Item descriptions that always fail.
    poisoned: HashMap<String, ApiError>,
    summaries: HashMap<SubprojectId, CostSummary>,
}

/// In-memory item API for tests.
#[derive(Debug)]
pub struct MockItemApi {
    state: Mutex<MockState>,
    next_id: AtomicI64,
    /// `true` while requests may proceed.
    gate: watch::Sender<bool>,
}

impl Default for MockItemApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockItemApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            next_id: AtomicI64::new(1000),
            gate: watch::Sender::new(true),
        }
    }

    /// Delay every request by `latency` (virtual time under a paused runtime).
    pub fn with_latency(self, latency: Duration) -> Self {
        self.lock().latency = latency;
        self
    }

    /// Fail the next request with `error`. Repeated calls queue further failures.
    pub fn fail_next(&self, error: ApiError) {
        self.lock().scripted.push_back(error);
    }

    /// Fail every create/update of an item with this description.
    pub fn fail_item(&self, description: &str, error: ApiError) {
        self.lock().poisoned.insert(description.to_string(), error);
    }

    pub fn set_summary(&self, subproject_id: SubprojectId, summary: CostSummary) {
        self.lock().summaries.insert(subproject_id, summary);
    }

    /// Block requests (after they are recorded) until `release` is called.
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    pub fn release(&self) {
        self.gate.send_replace(true);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Items sent to create or update, in call order.
    pub fn written_items(&self) -> Vec<CostItem> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                ApiCall::Create { item, .. } | ApiCall::Update { item, .. } => Some(item.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record the call and pick its scripted outcome, then wait out latency
    /// and the gate.
    async fn begin(&self, call: ApiCall) -> ApiResult<()> {
        let (latency, outcome) = {
            let mut state = self.lock();
            let poisoned = match &call {
                ApiCall::Create { item, .. } | ApiCall::Update { item, .. } => {
                    state.poisoned.get(description_of(item)).cloned()
                }
                _ => None,
            };
            state.calls.push(call);
            let outcome = match state.scripted.pop_front().or(poisoned) {
                Some(err) => Err(err),
                None => Ok(()),
            };
            (state.latency, outcome)
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        let mut gate = self.gate.subscribe();
        // The sender lives as long as `self`.
        let _ = gate.wait_for(|open| *open).await;
        outcome
    }
}

fn description_of(item: &CostItem) -> &str {
    match item {
        CostItem::Material(m) => &m.description,
        CostItem::Labor(l) => &l.role,
        CostItem::Permit(p) => &p.description,
        CostItem::Other(o) => &o.description,
    }
}

impl ItemApi for MockItemApi {
    async fn create(&self, subproject_id: SubprojectId, item: CostItem) -> ApiResult<CostItem> {
        self.begin(ApiCall::Create {
            subproject_id,
            item: item.clone(),
        })
        .await?;
        let id = ItemId(self.next_id.fetch_add(1, Ordering::SeqCst));
        Ok(item.with_id(id))
    }

    async fn update(&self, item_id: ItemId, item: CostItem) -> ApiResult<CostItem> {
        self.begin(ApiCall::Update {
            item_id,
            item: item.clone(),
        })
        .await?;
        Ok(item.with_id(item_id))
    }

    async fn delete(&self, category: CostCategory, item_id: ItemId) -> ApiResult<()> {
        self.begin(ApiCall::Delete { category, item_id }).await
    }

    async fn cost_summary(&self, subproject_id: SubprojectId) -> ApiResult<CostSummary> {
        self.begin(ApiCall::Summary { subproject_id }).await?;
        Ok(self
            .lock()
            .summaries
            .get(&subproject_id)
            .copied()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample_items;

    #[tokio::test]
    async fn create_assigns_ids_and_records_call() {
        let api = MockItemApi::new();
        let item = sample_items(CostCategory::Other).remove(0);
        let created = api.create(SubprojectId(1), item.clone()).await.unwrap();
        assert!(created.is_persisted());
        assert_eq!(
            api.calls(),
            vec![ApiCall::Create {
                subproject_id: SubprojectId(1),
                item
            }]
        );
    }

    #[tokio::test]
    async fn scripted_failures_are_consumed_in_order() {
        let api = MockItemApi::new();
        api.fail_next(ApiError::Network {
            reason: "reset".into(),
        });
        let item = sample_items(CostCategory::Permits).remove(0);

        assert!(api.update(ItemId(301), item.clone()).await.is_err());
        assert!(api.update(ItemId(301), item).await.is_ok());
        assert_eq!(api.call_count(), 2);
    }

    #[tokio::test]
    async fn poisoned_items_always_fail() {
        let api = MockItemApi::new();
        api.fail_item(
            "Framer",
            ApiError::Http {
                status: 422,
                detail: "bad rate".into(),
            },
        );
        let items = sample_items(CostCategory::Labor);
        assert!(api.create(SubprojectId(2), items[0].clone()).await.is_err());
        assert!(api.create(SubprojectId(2), items[1].clone()).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn held_requests_wait_for_release() {
        let api = std::sync::Arc::new(MockItemApi::new());
        api.hold();
        let task = {
            let api = api.clone();
            tokio::spawn(async move { api.cost_summary(SubprojectId(5)).await })
        };
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(!task.is_finished());
        assert_eq!(api.call_count(), 1);

        api.release();
        assert_eq!(task.await.unwrap().unwrap(), CostSummary::default());
    }
}
