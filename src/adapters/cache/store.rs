use std::collections::HashSet;

use crate::domain::models::{RepositoryId, RepositoryRecord};

/// Append-only, deduplicated record store backing the fallback cache.
///
/// Records are kept in first-seen order. Once an ID is stored it is never
/// removed or overwritten.
#[derive(Debug, Clone, Default)]
pub struct CacheStore {
    records: Vec<RepositoryRecord>,
    seen: HashSet<RepositoryId>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records, keeping the first occurrence of each ID.
    pub fn from_records(records: impl IntoIterator<Item = RepositoryRecord>) -> Self {
        let mut store = Self::new();
        store.merge(records);
        store
    }

    /// Fold a batch into the store. Returns how many records were new.
    pub fn merge(&mut self, batch: impl IntoIterator<Item = RepositoryRecord>) -> usize {
        let before = self.records.len();
        for record in batch {
            if self.seen.insert(record.id) {
                self.records.push(record);
            }
        }
        self.records.len() - before
    }

    pub fn contains(&self, id: RepositoryId) -> bool {
        self.seen.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[RepositoryRecord] {
        &self.records
    }

    /// Stored records whose IDs do not appear in `found`.
    pub fn candidates_excluding(&self, found: &[RepositoryRecord]) -> Vec<RepositoryRecord> {
        let found: HashSet<RepositoryId> = found.iter().map(|r| r.id).collect();
        self.records
            .iter()
            .filter(|r| !found.contains(&r.id))
            .cloned()
            .collect()
    }
}
