pub mod config;
pub mod context;
pub mod repository;
pub mod request;

pub use config::{
    AggregatorConfig, CacheConfig, Config, LogFormat, LoggingConfig, RetryConfig,
    RotationPolicy, ServerConfig, UpstreamConfig,
};
pub use context::{CancelReason, FetchContext};
pub use repository::{RepositoryEnvelope, RepositoryId, RepositoryRecord};
pub use request::FetchRequest;
