//! Domain errors for the repositories service.

use thiserror::Error;

use super::models::{CancelReason, RepositoryRecord};

/// A single upstream fetch failed. Always eligible for retry.
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Network(String),

    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("upstream body could not be decoded: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for UpstreamError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Errors surfaced by a batch fetch.
///
/// Cancellation variants carry whatever records were collected before the
/// context finished so a caller can salvage them.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("upstream fetch failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: UpstreamError,
    },

    #[error("context deadline exceeded")]
    DeadlineExceeded { partial: Vec<RepositoryRecord> },

    #[error("context canceled")]
    Cancelled { partial: Vec<RepositoryRecord> },

    #[error("worker pool exited before the batch was complete")]
    WorkerPoolExited,
}

pub type FetchResult<T> = Result<T, FetchError>;

impl FetchError {
    /// Build the error for a context that finished mid-batch.
    pub fn from_cancel(reason: CancelReason, partial: Vec<RepositoryRecord>) -> Self {
        match reason {
            CancelReason::DeadlineExceeded => Self::DeadlineExceeded { partial },
            CancelReason::Cancelled => Self::Cancelled { partial },
        }
    }

    pub const fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Self::DeadlineExceeded { .. })
    }

    /// Records collected before the failure. Empty for fatal errors.
    pub fn partial(&self) -> &[RepositoryRecord] {
        match self {
            Self::DeadlineExceeded { partial } | Self::Cancelled { partial } => partial,
            _ => &[],
        }
    }

    /// Whether the caller sent a request that can never succeed.
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_))
    }
}
