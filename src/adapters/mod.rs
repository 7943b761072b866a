//! Adapters wrapping the domain ports.

pub mod cache;
pub mod http;
