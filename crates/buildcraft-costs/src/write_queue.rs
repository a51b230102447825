//! Debounced per-key write queue.
//!
//! Bursts of updates for one `CostKey` collapse into a single batch of item
//! writes. Each key has at most one debounce timer and one in-flight batch;
//! starting either one aborts its predecessor first.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use buildcraft_core::config::QueueConfig;
use buildcraft_core::errors::{ApiError, SessionError, WriteError, WriteResult};
use buildcraft_core::models::{CostCategory, CostItem, CostKey, SubprojectId};
use buildcraft_core::traits::ItemApi;
use buildcraft_observability::{events, flush_span};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::{AbortHandle, JoinSet};
use tokio::time::Instant;
use tracing::Instrument;

/// Successful outcome of a queued write.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteReceipt {
    /// Every item was written; server copies in submission order.
    Applied(Vec<CostItem>),
    /// Nothing to send. The new total is a local recomputation only.
    LocalOnly,
}

type Reply = oneshot::Sender<WriteResult<WriteReceipt>>;

struct QueuedWrite {
    items: Vec<CostItem>,
    reply: Reply,
}

struct Timer {
    generation: u64,
    handle: AbortHandle,
}

/// Bookkeeping for the batch currently executing against the API.
struct InFlight {
    generation: u64,
    handle: AbortHandle,
    started_at: Instant,
    item_count: usize,
}

#[derive(Default)]
struct KeySlot {
    queued: Vec<QueuedWrite>,
    timer: Option<Timer>,
    in_flight: Option<InFlight>,
}

impl KeySlot {
    fn is_idle(&self) -> bool {
        self.queued.is_empty() && self.timer.is_none() && self.in_flight.is_none()
    }

    /// Abort timer and batch; queued senders are dropped, which their
    /// callers observe as `Cancelled`.
    fn cancel(self, key: &CostKey, reason: &str) {
        if let Some(timer) = self.timer {
            timer.handle.abort();
        }
        if let Some(in_flight) = self.in_flight {
            in_flight.handle.abort();
            tracing::debug!(
                key = %key,
                items = in_flight.item_count,
                elapsed_ms = in_flight.started_at.elapsed().as_millis() as u64,
                "aborting in-flight batch"
            );
        }
        events::write_cancelled(key, reason);
    }
}

struct QueueInner<A: ItemApi> {
    api: Arc<A>,
    debounce: Duration,
    request_timeout: Option<Duration>,
    runtime: Handle,
    slots: Mutex<HashMap<CostKey, KeySlot>>,
    generation: AtomicU64,
}

/// Debounced write queue over an `ItemApi`. Cheap to clone; clones share state.
pub struct WriteQueue<A: ItemApi> {
    inner: Arc<QueueInner<A>>,
}

impl<A: ItemApi> Clone for WriteQueue<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: ItemApi> std::fmt::Debug for WriteQueue<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteQueue")
            .field("debounce", &self.inner.debounce)
            .field("request_timeout", &self.inner.request_timeout)
            .field("pending", &self.list_pending_keys())
            .finish()
    }
}

impl<A: ItemApi> WriteQueue<A> {
    /// Create a queue bound to the current Tokio runtime.
    pub fn new(api: Arc<A>, config: &QueueConfig) -> Result<Self, SessionError> {
        let runtime = Handle::try_current().map_err(|e| SessionError::NoRuntime {
            reason: e.to_string(),
        })?;
        Ok(Self {
            inner: Arc::new(QueueInner {
                api,
                debounce: config.debounce(),
                request_timeout: config.request_timeout(),
                runtime,
                slots: Mutex::new(HashMap::new()),
                generation: AtomicU64::new(0),
            }),
        })
    }

    pub fn debounce(&self) -> Duration {
        self.inner.debounce
    }

    pub(crate) fn runtime(&self) -> &Handle {
        &self.inner.runtime
    }

    /// Queue `items` for the key and (re)start its debounce timer.
    ///
    /// Bookkeeping happens before this returns; the returned future only
    /// waits for the outcome. Dropping it does not cancel the write.
    pub fn enqueue(
        &self,
        subproject_id: SubprojectId,
        category: CostCategory,
        items: Vec<CostItem>,
    ) -> impl Future<Output = WriteResult<WriteReceipt>> + Send + 'static {
        let key = CostKey::new(subproject_id, category);
        let (reply, rx) = oneshot::channel();

        if let Some(found) = items.iter().map(CostItem::category).find(|c| *c != category) {
            let _ = reply.send(Err(WriteError::CategoryMismatch { key, found }));
        } else {
            self.inner.push(key, QueuedWrite { items, reply });
        }

        async move {
            match rx.await {
                Ok(outcome) => outcome,
                Err(_) => Err(WriteError::Cancelled { key }),
            }
        }
    }

    /// Cancel the debounce timer, queued entries, and in-flight batch of one key.
    pub fn cancel(&self, key: &CostKey) -> bool {
        let slot = self.inner.lock().remove(key);
        match slot {
            Some(slot) => {
                slot.cancel(key, "cancelled");
                true
            }
            None => false,
        }
    }

    /// Cancel every key of a subproject. Returns the number of keys cancelled.
    pub fn cancel_for_subproject(&self, subproject_id: SubprojectId) -> usize {
        let removed: Vec<(CostKey, KeySlot)> = {
            let mut slots = self.inner.lock();
            let keys: Vec<CostKey> = slots
                .keys()
                .filter(|k| k.subproject_id == subproject_id)
                .copied()
                .collect();
            keys.into_iter()
                .filter_map(|k| slots.remove(&k).map(|slot| (k, slot)))
                .collect()
        };
        let count = removed.len();
        for (key, slot) in removed {
            slot.cancel(&key, "subproject cancelled");
        }
        count
    }

    /// Whether the key has queued, debouncing, or in-flight work.
    pub fn is_pending(&self, subproject_id: SubprojectId, category: CostCategory) -> bool {
        let key = CostKey::new(subproject_id, category);
        self.inner
            .lock()
            .get(&key)
            .is_some_and(|slot| !slot.is_idle())
    }

    /// Keys with outstanding work, sorted.
    pub fn list_pending_keys(&self) -> Vec<CostKey> {
        let mut keys: Vec<CostKey> = self
            .inner
            .lock()
            .iter()
            .filter(|(_, slot)| !slot.is_idle())
            .map(|(k, _)| *k)
            .collect();
        keys.sort();
        keys
    }
}

impl<A: ItemApi> QueueInner<A> {
    fn lock(&self) -> MutexGuard<'_, HashMap<CostKey, KeySlot>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn push(self: &Arc<Self>, key: CostKey, write: QueuedWrite) {
        let generation = self.next_generation();
        let mut slots = self.lock();
        let slot = slots.entry(key).or_default();
        if let Some(timer) = slot.timer.take() {
            timer.handle.abort();
        }
        slot.queued.push(write);

        let inner = Arc::clone(self);
        let debounce = self.debounce;
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(debounce).await;
            inner.flush(key, generation);
        });
        slot.timer = Some(Timer {
            generation,
            handle: task.abort_handle(),
        });
    }

    /// Debounce timer fired: keep the newest entry, supersede the rest,
    /// and start its batch in place of any older one.
    fn flush(self: &Arc<Self>, key: CostKey, generation: u64) {
        let mut slots = self.lock();
        let Some(slot) = slots.get_mut(&key) else {
            return;
        };
        // A newer enqueue re-armed the timer after this one fired.
        if slot.timer.as_ref().map(|t| t.generation) != Some(generation) {
            return;
        }
        slot.timer = None;

        let mut queued = std::mem::take(&mut slot.queued);
        let Some(latest) = queued.pop() else {
            if slot.is_idle() {
                slots.remove(&key);
            }
            return;
        };
        if !queued.is_empty() {
            events::write_superseded(&key, queued.len());
            for older in queued {
                let _ = older.reply.send(Err(WriteError::Superseded { key }));
            }
        }

        if let Some(previous) = slot.in_flight.take() {
            previous.handle.abort();
            events::write_cancelled(&key, "superseded by a newer batch");
        }

        if latest.items.is_empty() {
            if slot.is_idle() {
                slots.remove(&key);
            }
            drop(slots);
            let _ = latest.reply.send(Ok(WriteReceipt::LocalOnly));
            return;
        }

        let item_count = latest.items.len();
        let inner = Arc::clone(self);
        let span = flush_span!(key, item_count);
        let task = self.runtime.spawn(
            async move {
                let started = Instant::now();
                let outcome = inner.run_batch(key, latest.items).await;
                inner.finish(&key, generation);
                match &outcome {
                    Ok(_) => events::write_flushed(&key, item_count, started.elapsed().as_millis()),
                    Err(e) => events::write_failed(&key, e),
                }
                let _ = latest.reply.send(outcome);
            }
            .instrument(span),
        );
        slot.in_flight = Some(InFlight {
            generation,
            handle: task.abort_handle(),
            started_at: Instant::now(),
            item_count,
        });
    }

    /// Clear the in-flight slot if it still belongs to this batch.
    fn finish(&self, key: &CostKey, generation: u64) {
        let mut slots = self.lock();
        if let Some(slot) = slots.get_mut(key) {
            if slot.in_flight.as_ref().map(|f| f.generation) == Some(generation) {
                slot.in_flight = None;
            }
            if slot.is_idle() {
                slots.remove(key);
            }
        }
    }

    async fn run_batch(&self, key: CostKey, items: Vec<CostItem>) -> WriteResult<WriteReceipt> {
        match self.request_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.write_items(key, items)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(WriteError::TimedOut {
                    key,
                    timeout_ms: limit.as_millis() as u64,
                }),
            },
            None => self.write_items(key, items).await,
        }
    }

    /// Write every item concurrently. All calls run to completion so the
    /// error can report which items the server already accepted.
    async fn write_items(&self, key: CostKey, items: Vec<CostItem>) -> WriteResult<WriteReceipt> {
        let total = items.len();
        let mut tasks = JoinSet::new();
        for (index, item) in items.into_iter().enumerate() {
            let api = Arc::clone(&self.api);
            let subproject_id = key.subproject_id;
            tasks.spawn(async move {
                let result = match item.id() {
                    Some(id) => api.update(id, item).await,
                    None => api.create(subproject_id, item).await,
                };
                (index, result)
            });
        }

        let mut written: Vec<Option<CostItem>> = vec![None; total];
        let mut first_error: Option<ApiError> = None;
        let mut failed = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(item))) => written[index] = Some(item),
                Ok((_, Err(e))) => {
                    failed += 1;
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    return Err(WriteError::Internal {
                        key,
                        reason: e.to_string(),
                    })
                }
            }
        }

        match first_error {
            None => Ok(WriteReceipt::Applied(written.into_iter().flatten().collect())),
            Some(source) => Err(WriteError::Api {
                key,
                failed,
                total,
                persisted: written.into_iter().flatten().collect(),
                source,
            }),
        }
    }
}
