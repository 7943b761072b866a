//! Service layer: batch assembly over the upstream record source.

pub mod fetch_aggregator;

pub use fetch_aggregator::FetchAggregator;
