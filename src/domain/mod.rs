//! Domain layer for the repositories service
//!
//! This module contains the record model, request/context types, error
//! taxonomy and the ports the services are written against.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{FetchError, FetchResult, UpstreamError};
