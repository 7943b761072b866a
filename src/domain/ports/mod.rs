//! Port trait definitions (Hexagonal Architecture)
//!
//! - RecordSource: single-record upstream fetches
//! - RepositoryService: batch fetches, implemented by the aggregator and
//!   the fallback cache decorator

pub mod record_source;
pub mod repository_service;

pub use record_source::RecordSource;
pub use repository_service::RepositoryService;
