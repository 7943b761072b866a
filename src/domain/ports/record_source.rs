use async_trait::async_trait;

use crate::domain::errors::UpstreamError;
use crate::domain::models::RepositoryRecord;

/// Fetches one repository per call from upstream.
///
/// Implementations perform a single attempt; retrying is the caller's job.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch a single record.
    async fn fetch_one(&self) -> Result<RepositoryRecord, UpstreamError>;
}
