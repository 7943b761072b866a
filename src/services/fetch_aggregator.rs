//! Concurrent fetch-and-dedup aggregation over a single-record source.
//!
//! A batch of `count` records is assembled by a pool of workers pulling
//! work units from a shared queue. Each unit is one "fetch one record"
//! obligation; under a uniqueness requirement a duplicate record sends a
//! fresh unit back to the queue, so the pool keeps producing until enough
//! distinct records have arrived. Completion is counted in accepted
//! records, never in queue emptiness.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn, Instrument};

use crate::domain::errors::{FetchError, FetchResult};
use crate::domain::models::{
    AggregatorConfig, FetchContext, FetchRequest, RepositoryId, RepositoryRecord,
};
use crate::domain::ports::{RecordSource, RepositoryService};
use crate::infrastructure::upstream::RetryPolicy;

/// One pending "fetch one record" obligation.
#[derive(Debug, Clone, Copy)]
struct WorkUnit;

/// Result of processing one work unit.
type FetchOutcome = Result<RepositoryRecord, FetchError>;

/// Aggregates single-record fetches into batches.
pub struct FetchAggregator {
    source: Arc<dyn RecordSource>,
    retry_policy: RetryPolicy,
    max_concurrency: usize,
}

impl FetchAggregator {
    /// Create an aggregator with the default retry policy and pool cap.
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self::with_config(source, RetryPolicy::default(), &AggregatorConfig::default())
    }

    pub fn with_config(
        source: Arc<dyn RecordSource>,
        retry_policy: RetryPolicy,
        config: &AggregatorConfig,
    ) -> Self {
        Self {
            source,
            retry_policy,
            max_concurrency: config.max_concurrency.max(1),
        }
    }

    fn pool_size(&self, count: usize) -> usize {
        count.min(self.max_concurrency)
    }
}

#[async_trait]
impl RepositoryService for FetchAggregator {
    #[instrument(skip(self, ctx), fields(count = request.count, unique = request.unique))]
    async fn fetch_batch(
        &self,
        ctx: &FetchContext,
        request: FetchRequest,
    ) -> FetchResult<Vec<RepositoryRecord>> {
        request.validate()?;

        let count = request.count;
        let pool_size = self.pool_size(count);

        // Queue and collector are sized by the pool, not by `count`: at most
        // `pool_size` units are ever queued or in flight. The rest are held
        // back in `unqueued` and released one per finished unit.
        let (work_tx, work_rx) = async_channel::bounded::<WorkUnit>(pool_size);
        for _ in 0..pool_size {
            let _ = work_tx.try_send(WorkUnit);
        }
        let mut unqueued = count - pool_size;

        let (results_tx, mut results_rx) = mpsc::channel::<FetchOutcome>(pool_size);

        // Workers run under a child context so finishing the batch can stop
        // them without cancelling the caller. Dropping this future (e.g. the
        // HTTP client went away) stops them too.
        let worker_ctx = ctx.child();
        let _stop_workers = worker_ctx.cancel_on_drop();

        for worker in 0..pool_size {
            tokio::spawn(
                run_worker(
                    Arc::clone(&self.source),
                    self.retry_policy.clone(),
                    worker_ctx.clone(),
                    work_rx.clone(),
                    results_tx.clone(),
                )
                .instrument(tracing::debug_span!("fetch_worker", worker)),
            );
        }
        // Only workers hold senders now: `recv` yields `None` once they have all exited.
        drop(results_tx);
        drop(work_rx);

        let mut accepted: Vec<RepositoryRecord> = Vec::new();
        let mut seen: HashSet<RepositoryId> = HashSet::new();

        loop {
            tokio::select! {
                biased;

                reason = ctx.done() => {
                    work_tx.close();
                    worker_ctx.cancel();
                    // Drain until every worker has exited so none is left
                    // blocked on a send and nothing is stranded in the channel.
                    while results_rx.recv().await.is_some() {}

                    info!(
                        collected = accepted.len(),
                        requested = count,
                        reason = %reason,
                        "batch fetch interrupted"
                    );
                    return Err(FetchError::from_cancel(reason, accepted));
                }

                outcome = results_rx.recv() => match outcome {
                    Some(Ok(record)) => {
                        let replace = if request.unique && !seen.insert(record.id) {
                            debug!(id = record.id, "duplicate record, requeueing work unit");
                            true
                        } else {
                            accepted.push(record);
                            if accepted.len() == count {
                                work_tx.close();
                                debug!(pool_size, "batch complete");
                                return Ok(accepted);
                            }
                            if unqueued > 0 {
                                unqueued -= 1;
                                true
                            } else {
                                false
                            }
                        };

                        // One unit finished, so the queue has room for one more.
                        if replace && work_tx.send(WorkUnit).await.is_err() {
                            return Err(FetchError::WorkerPoolExited);
                        }
                    }
                    Some(Err(err)) => {
                        work_tx.close();
                        warn!(error = %err, "batch fetch failed");
                        return Err(err);
                    }
                    None => {
                        warn!(collected = accepted.len(), "all workers exited early");
                        return Err(FetchError::WorkerPoolExited);
                    }
                },
            }
        }
    }
}

/// Pull work units until the queue closes or the context finishes.
async fn run_worker(
    source: Arc<dyn RecordSource>,
    retry_policy: RetryPolicy,
    ctx: FetchContext,
    work: async_channel::Receiver<WorkUnit>,
    results: mpsc::Sender<FetchOutcome>,
) {
    while let Ok(WorkUnit) = work.recv().await {
        let outcome = tokio::select! {
            biased;
            _ = ctx.done() => break,
            outcome = retry_policy.execute(|| source.fetch_one()) => outcome,
        };

        if results.send(outcome).await.is_err() {
            break;
        }
    }
}
