//! In-memory fallback caching for batch fetches.
//!
//! Wraps a `RepositoryService` as a decorator: observed records are merged
//! into an append-only store in the background, and timed-out requests are
//! padded from it.

pub mod fallback_cache;
pub mod store;

pub use fallback_cache::{FallbackCache, DEFAULT_MERGE_QUEUE_CAPACITY};
pub use store::CacheStore;
