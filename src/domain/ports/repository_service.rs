use async_trait::async_trait;

use crate::domain::errors::FetchResult;
use crate::domain::models::{FetchContext, FetchRequest, RepositoryRecord};

/// Produces batches of repositories.
///
/// Implemented by the fetch aggregator and by the fallback cache that
/// decorates it. Records come back in arrival order; only the count and
/// uniqueness constraints are guaranteed.
#[async_trait]
pub trait RepositoryService: Send + Sync {
    /// Fetch `request.count` records, honouring `request.unique`.
    ///
    /// When `ctx` finishes first the error carries the records collected so
    /// far (see [`FetchError::partial`](crate::domain::errors::FetchError::partial)).
    async fn fetch_batch(
        &self,
        ctx: &FetchContext,
        request: FetchRequest,
    ) -> FetchResult<Vec<RepositoryRecord>>;
}
