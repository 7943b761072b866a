//! Upstream single-record service integration
//!
//! - reqwest client implementing the `RecordSource` port
//! - retry policy with exponential backoff

pub mod client;
pub mod retry;

pub use client::UpstreamClient;
pub use retry::RetryPolicy;
