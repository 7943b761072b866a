//! Repositories - batch repository fetcher with a fallback cache
//!
//! Assembles batches of repository records from an upstream service that
//! returns one record per call. Fetches run on a bounded pool of retrying
//! workers, optionally deduplicated by ID, and bounded by a caller deadline.
//! When the deadline passes, the fallback cache pads the batch from records
//! seen on earlier requests.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Records, requests, fetch contexts, errors and ports
//! - **Service Layer** (`services`): The concurrent fetch aggregator
//! - **Adapters** (`adapters`): Fallback cache decorator and HTTP routing
//! - **Infrastructure Layer** (`infrastructure`): Upstream client, config, logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use repositories::{FallbackCache, FetchAggregator, FetchContext, FetchRequest, UpstreamClient};
//! use repositories::domain::ports::RepositoryService;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = UpstreamClient::new("http://localhost:7080")?;
//!     let service = FallbackCache::new(Arc::new(FetchAggregator::new(Arc::new(client))));
//!
//!     let ctx = FetchContext::background().with_timeout(Duration::from_secs(1));
//!     let records = service.fetch_batch(&ctx, FetchRequest::new().with_count(3).unique()).await?;
//!     println!("{records:?}");
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::cache::{CacheStore, FallbackCache};
pub use domain::errors::{FetchError, FetchResult, UpstreamError};
pub use domain::models::{
    Config, FetchContext, FetchRequest, RepositoryId, RepositoryRecord,
};
pub use domain::ports::{RecordSource, RepositoryService};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::upstream::{RetryPolicy, UpstreamClient};
pub use services::FetchAggregator;
