//! Batch fetch requests.

use serde::{Deserialize, Serialize};

use crate::domain::errors::FetchError;

/// How many repositories a caller wants and whether they must be distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Number of records to return (at least 1)
    pub count: usize,

    /// Whether every returned record must have a distinct ID
    pub unique: bool,
}

impl Default for FetchRequest {
    fn default() -> Self {
        Self {
            count: 1,
            unique: false,
        }
    }
}

impl FetchRequest {
    /// A request for a single, possibly repeated, record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of records to fetch.
    #[must_use]
    pub const fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Require distinct record IDs.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Reject requests that can never be satisfied.
    pub fn validate(&self) -> Result<(), FetchError> {
        if self.count == 0 {
            return Err(FetchError::InvalidRequest(
                "count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
