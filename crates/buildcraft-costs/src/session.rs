//! CostSession: the per-session context that owns the write queue, the
//! cost store, and the item API they write through.

use std::sync::Arc;

use buildcraft_api::HttpItemApi;
use buildcraft_core::config::BuildcraftConfig;
use buildcraft_core::errors::{ApiResult, BuildcraftResult, SessionError};
use buildcraft_core::models::{CostSummary, SubprojectId};
use buildcraft_core::traits::ItemApi;
use buildcraft_observability::refetch_span;
use tracing::Instrument;

use crate::conflict::ConflictSurface;
use crate::store::CostStore;
use crate::write_queue::WriteQueue;

/// Construct once per application session and hand to the components that
/// read or edit costs. Dropping it cancels every write still pending.
pub struct CostSession<A: ItemApi> {
    api: Arc<A>,
    store: CostStore<A>,
}

impl<A: ItemApi> CostSession<A> {
    /// Build a session on the current Tokio runtime.
    pub fn new(api: Arc<A>, config: &BuildcraftConfig) -> Result<Self, SessionError> {
        let queue = WriteQueue::new(Arc::clone(&api), &config.queue)?;
        let store = CostStore::new(queue, &config.store);
        tracing::info!(
            debounce_ms = config.queue.debounce_ms,
            staleness_ms = config.store.staleness_ms,
            "cost session started"
        );
        Ok(Self { api, store })
    }

    pub fn store(&self) -> &CostStore<A> {
        &self.store
    }

    pub fn queue(&self) -> &WriteQueue<A> {
        self.store.queue()
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    /// A fresh conflict dialog model over this session's store.
    pub fn conflict_surface(&self) -> ConflictSurface<A> {
        ConflictSurface::new(self.store.clone())
    }

    /// Refetch a subproject's totals and feed them to the store as
    /// confirmed values. Pending edits that disagree become conflicts.
    pub async fn refresh_from_server(&self, subproject_id: SubprojectId) -> ApiResult<CostSummary> {
        async {
            let summary = self.api.cost_summary(subproject_id).await?;
            self.store.apply_server_summary(subproject_id, &summary);
            tracing::debug!(total = summary.estimated_total, "server totals applied");
            Ok(summary)
        }
        .instrument(refetch_span!(subproject_id))
        .await
    }
}

impl<A: ItemApi> std::fmt::Debug for CostSession<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CostSession")
            .field("store", &self.store)
            .field("queue", self.store.queue())
            .finish_non_exhaustive()
    }
}

impl CostSession<HttpItemApi> {
    /// Session over the HTTP item API described by `config`.
    pub fn connect(config: &BuildcraftConfig) -> BuildcraftResult<Self> {
        let api = HttpItemApi::from_config(&config.api)?;
        Ok(Self::new(Arc::new(api), config)?)
    }
}

impl<A: ItemApi> Drop for CostSession<A> {
    fn drop(&mut self) {
        self.store.teardown();
    }
}
