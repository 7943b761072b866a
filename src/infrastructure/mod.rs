//! Infrastructure layer module
//!
//! - Upstream HTTP client and retry policy
//! - Configuration management
//! - Logging infrastructure
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod logging;
pub mod setup;
pub mod upstream;
