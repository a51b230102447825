//! Optimistic cost store.
//!
//! Holds, per `CostKey`, the value the user just entered next to the value
//! the server last confirmed, and decides which one to display. Writes go
//! through the `WriteQueue`; their settlements only touch a record while
//! the write's ticket is still the key's latest.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use buildcraft_core::config::StoreConfig;
use buildcraft_core::errors::{WriteError, WriteResult};
use buildcraft_core::models::{CostCategory, CostItem, CostKey, CostSummary, SubprojectId};
use buildcraft_core::traits::ItemApi;
use buildcraft_observability::events;
use chrono::{DateTime, Utc};
use tokio::sync::{oneshot, watch};
use tokio::time::Instant;

use crate::conflict::{ConflictRecord, Resolution};
use crate::write_queue::{WriteQueue, WriteReceipt};

/// Display state of one cost key.
#[derive(Debug, Clone, PartialEq)]
pub struct CostValue {
    pub optimistic: f64,
    pub confirmed: f64,
    /// When `optimistic` was last set, for the staleness check.
    pub set_at: Instant,
    /// Wall-clock counterpart of `set_at`.
    pub edited_at: DateTime<Utc>,
    pub is_pending: bool,
    ticket: u64,
}

impl CostValue {
    fn settled(value: f64) -> Self {
        Self {
            optimistic: value,
            confirmed: value,
            set_at: Instant::now(),
            edited_at: Utc::now(),
            is_pending: false,
            ticket: 0,
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    costs: HashMap<CostKey, CostValue>,
    conflicts: BTreeMap<CostKey, ConflictRecord>,
    next_ticket: u64,
}

impl StoreState {
    fn issue_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    /// The record for `key` if `ticket` is still its latest write.
    fn current(&mut self, key: &CostKey, ticket: u64) -> Option<&mut CostValue> {
        self.costs.get_mut(key).filter(|v| v.ticket == ticket)
    }
}

struct StoreInner<A: ItemApi> {
    queue: WriteQueue<A>,
    staleness: Duration,
    state: Mutex<StoreState>,
    revision: watch::Sender<u64>,
}

/// Process-wide cost state for one session. Cheap to clone; clones share state.
pub struct CostStore<A: ItemApi> {
    inner: Arc<StoreInner<A>>,
}

impl<A: ItemApi> Clone for CostStore<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: ItemApi> std::fmt::Debug for CostStore<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("CostStore")
            .field("keys", &state.costs.len())
            .field("conflicts", &state.conflicts.len())
            .field("staleness", &self.inner.staleness)
            .finish()
    }
}

impl<A: ItemApi> CostStore<A> {
    pub fn new(queue: WriteQueue<A>, config: &StoreConfig) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                queue,
                staleness: config.staleness(),
                state: Mutex::new(StoreState::default()),
                revision: watch::Sender::new(0),
            }),
        }
    }

    pub fn queue(&self) -> &WriteQueue<A> {
        &self.inner.queue
    }

    /// Value to show for a key: the optimistic one while its write is
    /// pending and fresh, the confirmed one otherwise, 0 if unknown.
    pub fn get_display_value(&self, subproject_id: SubprojectId, category: CostCategory) -> f64 {
        let key = CostKey::new(subproject_id, category);
        let state = self.inner.lock();
        match state.costs.get(&key) {
            Some(v) if v.is_pending && v.set_at.elapsed() < self.inner.staleness => v.optimistic,
            Some(v) => v.confirmed,
            None => 0.0,
        }
    }

    /// Snapshot of a key's record.
    pub fn record(&self, subproject_id: SubprojectId, category: CostCategory) -> Option<CostValue> {
        let key = CostKey::new(subproject_id, category);
        self.inner.lock().costs.get(&key).cloned()
    }

    /// Show `value` immediately and queue `items` for writing.
    ///
    /// The optimistic value is visible as soon as this returns. The future
    /// resolves once the write settles: superseded and cancelled writes
    /// resolve `Ok`, genuine failures roll the value back and return the
    /// error. Settlement happens whether or not the future is polled.
    pub fn update_cost(
        &self,
        subproject_id: SubprojectId,
        category: CostCategory,
        value: f64,
        items: Vec<CostItem>,
    ) -> impl Future<Output = WriteResult<()>> + Send + 'static {
        let key = CostKey::new(subproject_id, category);
        let ticket = {
            let mut state = self.inner.lock();
            let ticket = state.issue_ticket();
            let confirmed = state.costs.get(&key).map_or(0.0, |v| v.confirmed);
            state.costs.insert(
                key,
                CostValue {
                    optimistic: value,
                    confirmed,
                    set_at: Instant::now(),
                    edited_at: Utc::now(),
                    is_pending: true,
                    ticket,
                },
            );
            ticket
        };
        self.inner.bump();
        events::update_requested(&key, value, items.len());

        let write = self.inner.queue.enqueue(subproject_id, category, items);
        let inner = Arc::clone(&self.inner);
        let (tx, rx) = oneshot::channel();
        self.inner.queue.runtime().spawn(async move {
            let outcome = write.await;
            let _ = tx.send(inner.settle(key, ticket, value, outcome));
        });

        async move { rx.await.unwrap_or(Ok(())) }
    }

    /// Record a value fetched from the server outside this store's own
    /// write path. A pending edit with a different value is not
    /// overwritten; a conflict is recorded instead. A server value equal to
    /// the local one closes any conflict still open for the key.
    pub fn set_confirmed_cost(&self, subproject_id: SubprojectId, category: CostCategory, value: f64) {
        let key = CostKey::new(subproject_id, category);
        {
            let mut state = self.inner.lock();
            let (conflict, agrees) = match state.costs.get_mut(&key) {
                None => {
                    state.costs.insert(key, CostValue::settled(value));
                    (None, false)
                }
                Some(v) if v.is_pending && v.optimistic != value => (
                    Some(ConflictRecord {
                        subproject_id,
                        category,
                        local_value: v.optimistic,
                        server_value: value,
                        edited_at: v.edited_at,
                        detected_at: Utc::now(),
                    }),
                    false,
                ),
                Some(v) => {
                    let agrees = v.optimistic == value;
                    v.confirmed = value;
                    v.optimistic = value;
                    v.is_pending = false;
                    (None, agrees)
                }
            };
            if let Some(record) = conflict {
                events::conflict_detected(&key, record.local_value, value);
                state.conflicts.insert(key, record);
            } else if agrees && state.conflicts.remove(&key).is_some() {
                tracing::debug!(key = %key, value, "server agreed with local value, conflict closed");
            }
        }
        self.inner.bump();
    }

    /// Settle a conflict on one side. Returns `false` when the key has no
    /// open conflict.
    ///
    /// Either way the outstanding write can no longer change the record.
    /// Choosing the server value also cancels that write.
    pub fn resolve_conflict(&self, key: &CostKey, use_local_value: bool) -> bool {
        let resolution = Resolution::from_use_local(use_local_value);
        let chosen = {
            let mut state = self.inner.lock();
            let Some(record) = state.conflicts.remove(key) else {
                return false;
            };
            let chosen = record.chosen(resolution);
            let ticket = state.issue_ticket();
            if let Some(v) = state.costs.get_mut(key) {
                v.optimistic = chosen;
                v.confirmed = chosen;
                v.is_pending = false;
                v.ticket = ticket;
            }
            chosen
        };
        if resolution == Resolution::UseServer {
            self.inner.queue.cancel(key);
        }
        events::conflict_resolved(key, use_local_value, chosen);
        self.inner.bump();
        true
    }

    /// Open conflicts, ordered by key.
    pub fn get_conflicts(&self) -> BTreeMap<CostKey, ConflictRecord> {
        self.inner.lock().conflicts.clone()
    }

    pub fn has_conflicts(&self) -> bool {
        !self.inner.lock().conflicts.is_empty()
    }

    /// Sum of the display values of all four categories.
    pub fn get_aggregate_total(&self, subproject_id: SubprojectId) -> f64 {
        CostCategory::ALL
            .iter()
            .map(|c| self.get_display_value(subproject_id, *c))
            .sum()
    }

    /// Display values of a subproject in the server's summary shape.
    pub fn summary(&self, subproject_id: SubprojectId) -> CostSummary {
        CostSummary::from_values(|c| self.get_display_value(subproject_id, c))
    }

    /// Feed a refetched server summary through `set_confirmed_cost`.
    pub fn apply_server_summary(&self, subproject_id: SubprojectId, summary: &CostSummary) {
        for category in CostCategory::ALL {
            self.set_confirmed_cost(subproject_id, category, summary.value_for(category));
        }
    }

    pub fn is_pending(&self, subproject_id: SubprojectId, category: CostCategory) -> bool {
        let key = CostKey::new(subproject_id, category);
        self.inner.lock().costs.get(&key).is_some_and(|v| v.is_pending)
    }

    /// Keys whose optimistic value is still pending, sorted.
    pub fn pending_keys(&self) -> Vec<CostKey> {
        let mut keys: Vec<CostKey> = self
            .inner
            .lock()
            .costs
            .iter()
            .filter(|(_, v)| v.is_pending)
            .map(|(k, _)| *k)
            .collect();
        keys.sort();
        keys
    }

    /// Receiver of a revision counter bumped on every state change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Cancel queued and in-flight writes of every subproject with a
    /// pending key or outstanding queue work.
    ///
    /// The queue is consulted too: a write kept after a local-wins
    /// resolution, or one whose value the server already confirmed, is
    /// no longer pending here but still holds a request open.
    pub fn teardown(&self) {
        let subprojects: BTreeSet<SubprojectId> = self
            .pending_keys()
            .into_iter()
            .chain(self.inner.queue.list_pending_keys())
            .map(|k| k.subproject_id)
            .collect();
        for subproject_id in subprojects {
            let cancelled = self.inner.queue.cancel_for_subproject(subproject_id);
            tracing::debug!(subproject = %subproject_id, cancelled, "teardown cancelled writes");
        }
    }
}

impl<A: ItemApi> StoreInner<A> {
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn bump(&self) {
        self.revision.send_modify(|r| *r += 1);
    }

    fn settle(
        &self,
        key: CostKey,
        ticket: u64,
        value: f64,
        outcome: WriteResult<WriteReceipt>,
    ) -> WriteResult<()> {
        let result = {
            let mut state = self.lock();
            let current = state.current(&key, ticket);
            match outcome {
                Ok(_) => {
                    if let Some(v) = current {
                        v.confirmed = value;
                        v.optimistic = value;
                        v.is_pending = false;
                    }
                    Ok(())
                }
                Err(e) if e.is_silent() => {
                    if let Some(v) = current {
                        v.is_pending = false;
                    }
                    Ok(())
                }
                Err(e) => {
                    if let Some(v) = current {
                        events::rollback_applied(&key, v.optimistic, v.confirmed);
                        v.optimistic = v.confirmed;
                        v.is_pending = false;
                    }
                    if let WriteError::Api { persisted, .. } = &e {
                        if !persisted.is_empty() {
                            tracing::warn!(
                                key = %key,
                                persisted = persisted.len(),
                                "batch failed after some items were saved"
                            );
                        }
                    }
                    Err(e)
                }
            }
        };
        self.bump();
        result
    }
}
