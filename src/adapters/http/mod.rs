//! HTTP surface of the repositories service.

pub mod repositories_http;

pub use repositories_http::{router, serve, ApiError, RepositoriesQuery};
