//! Repository records as served by the upstream single-record endpoint.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upstream-assigned identity of a repository.
pub type RepositoryId = i64;

/// A single repository fetched from upstream.
///
/// Records are immutable once constructed. Equality and hashing only look
/// at [`id`](Self::id): two fetches of the same repository taken at
/// different times are the same record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryRecord {
    /// Upstream identity, unique across the upstream's universe
    pub id: RepositoryId,

    /// Display name
    pub name: String,

    /// When upstream produced this record
    #[serde(rename = "fetchedAt")]
    pub fetched_at: DateTime<Utc>,
}

impl RepositoryRecord {
    /// Create a record stamped with the current time.
    pub fn new(id: RepositoryId, name: impl Into<String>) -> Self {
        Self::fetched_at(id, name, Utc::now())
    }

    /// Create a record with an explicit fetch timestamp.
    pub fn fetched_at(id: RepositoryId, name: impl Into<String>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            fetched_at,
        }
    }
}

impl PartialEq for RepositoryRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RepositoryRecord {}

impl Hash for RepositoryRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Body returned by `GET /repository` on the upstream service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryEnvelope {
    /// The wrapped record
    pub repository: RepositoryRecord,
}
