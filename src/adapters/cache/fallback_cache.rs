//! Degraded-mode fallback cache decorating a `RepositoryService`.
//!
//! Every batch the inner service produces (including partial batches from
//! interrupted calls) is offered to a small merge queue. A single background
//! task folds those batches into a [`CacheStore`]. When the inner service
//! runs out of time, the short result is padded from the store instead of
//! failing the caller.
//!
//! Offers never block: when the merge task falls behind and the queue is
//! full, the batch is dropped. The store only ever grows.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::store::CacheStore;
use crate::domain::errors::{FetchError, FetchResult};
use crate::domain::models::{FetchContext, FetchRequest, RepositoryRecord};
use crate::domain::ports::RepositoryService;

/// Default number of batches waiting to be merged before offers are dropped.
pub const DEFAULT_MERGE_QUEUE_CAPACITY: usize = 5;

/// Fallback cache decorator.
///
/// Must be constructed inside a Tokio runtime: construction spawns the merge
/// task, which lives until [`shutdown`](Self::shutdown) or until the cache
/// is dropped.
pub struct FallbackCache<S: RepositoryService + ?Sized> {
    inner: Arc<S>,
    store: Arc<RwLock<CacheStore>>,
    incoming: mpsc::Sender<Vec<RepositoryRecord>>,
    merge_task: JoinHandle<()>,
}

impl<S: RepositoryService + ?Sized> FallbackCache<S> {
    /// Wrap `inner` with an empty cache.
    pub fn new(inner: Arc<S>) -> Self {
        Self::with_store(inner, CacheStore::new(), DEFAULT_MERGE_QUEUE_CAPACITY)
    }

    /// Wrap `inner` with an empty cache and a custom merge queue capacity.
    pub fn with_capacity(inner: Arc<S>, merge_queue_capacity: usize) -> Self {
        Self::with_store(inner, CacheStore::new(), merge_queue_capacity)
    }

    /// Wrap `inner` with a pre-populated store.
    pub fn with_store(inner: Arc<S>, store: CacheStore, merge_queue_capacity: usize) -> Self {
        let store = Arc::new(RwLock::new(store));
        let (incoming, rx) = mpsc::channel(merge_queue_capacity.max(1));
        let merge_task = tokio::spawn(feed_cache(Arc::clone(&store), rx));

        Self {
            inner,
            store,
            incoming,
            merge_task,
        }
    }

    /// Number of distinct records cached so far.
    pub async fn cached_len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Copy of the cached records in first-seen order.
    pub async fn snapshot(&self) -> Vec<RepositoryRecord> {
        self.store.read().await.records().to_vec()
    }

    /// Stop accepting offers and wait for queued batches to be merged.
    pub async fn shutdown(self) {
        let Self {
            incoming,
            merge_task,
            ..
        } = self;
        drop(incoming);
        if let Err(err) = merge_task.await {
            warn!(error = %err, "cache merge task ended abnormally");
        }
    }

    /// Offer records to the merge task without waiting.
    ///
    /// Returns whether the batch was queued.
    fn offer(&self, records: &[RepositoryRecord]) -> bool {
        if records.is_empty() {
            return false;
        }
        match self.incoming.try_send(records.to_vec()) {
            Ok(()) => true,
            Err(TrySendError::Full(batch)) => {
                debug!(dropped = batch.len(), "cache merge queue busy, dropping batch");
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!("cache merge task is gone, dropping batch");
                false
            }
        }
    }

    /// Top up a short result with cached records.
    ///
    /// Without a uniqueness requirement the candidates are cycled until the
    /// result is full. With one, candidates whose IDs are already present
    /// are excluded and each remaining candidate is used at most once, so
    /// the result may stay short.
    async fn pad(
        &self,
        mut found: Vec<RepositoryRecord>,
        request: FetchRequest,
    ) -> Vec<RepositoryRecord> {
        let missing = request.count.saturating_sub(found.len());
        if missing == 0 {
            return found;
        }

        let candidates = {
            let store = self.store.read().await;
            if request.unique {
                store.candidates_excluding(&found)
            } else {
                store.records().to_vec()
            }
        };

        let fetched = found.len();
        if request.unique {
            found.extend(candidates.into_iter().take(missing));
        } else {
            found.extend(candidates.iter().cycle().take(missing).cloned());
        }

        info!(
            fetched,
            padded = found.len() - fetched,
            requested = request.count,
            "serving degraded result from cache"
        );
        found
    }
}

#[async_trait]
impl<S: RepositoryService + ?Sized + 'static> RepositoryService for FallbackCache<S> {
    #[instrument(skip(self, ctx), fields(count = request.count, unique = request.unique))]
    async fn fetch_batch(
        &self,
        ctx: &FetchContext,
        request: FetchRequest,
    ) -> FetchResult<Vec<RepositoryRecord>> {
        match self.inner.fetch_batch(ctx, request).await {
            Ok(records) => {
                self.offer(&records);
                Ok(records)
            }
            Err(FetchError::DeadlineExceeded { partial }) => {
                self.offer(&partial);
                Ok(self.pad(partial, request).await)
            }
            Err(err) => {
                self.offer(err.partial());
                Err(err)
            }
        }
    }
}

/// Single consumer folding offered batches into the store.
async fn feed_cache(
    store: Arc<RwLock<CacheStore>>,
    mut incoming: mpsc::Receiver<Vec<RepositoryRecord>>,
) {
    while let Some(batch) = incoming.recv().await {
        let mut store = store.write().await;
        let added = store.merge(batch);
        if added > 0 {
            debug!(added, total = store.len(), "merged batch into fallback cache");
        }
    }
    debug!("cache merge task stopped");
}
