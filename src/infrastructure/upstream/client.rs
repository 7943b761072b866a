//! HTTP client for the upstream single-record repository service.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Url};
use tracing::{debug, instrument};

use crate::domain::errors::UpstreamError;
use crate::domain::models::{RepositoryEnvelope, RepositoryRecord, UpstreamConfig};
use crate::domain::ports::RecordSource;

/// Resource path of the single-record endpoint.
const REPOSITORY_PATH: &str = "/repository";

/// Fetches one repository per call from `{base_url}/repository`.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: ReqwestClient,
    target: Url,
}

impl UpstreamClient {
    /// Create a client for the service at `base_url` with default settings.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(&UpstreamConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
    }

    pub fn with_config(config: &UpstreamConfig) -> Result<Self> {
        let base = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid upstream base URL: {}", config.base_url))?;
        let target = base
            .join(REPOSITORY_PATH)
            .context("Failed to build upstream repository URL")?;

        let mut builder = ReqwestClient::builder().tcp_nodelay(true);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { http, target })
    }

    /// The fully resolved record endpoint.
    pub const fn target(&self) -> &Url {
        &self.target
    }
}

#[async_trait]
impl RecordSource for UpstreamClient {
    #[instrument(skip(self), fields(target = %self.target))]
    async fn fetch_one(&self) -> Result<RepositoryRecord, UpstreamError> {
        let response = self.http.get(self.target.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let envelope: RepositoryEnvelope = serde_json::from_slice(&bytes)?;

        debug!(id = envelope.repository.id, "fetched repository");
        Ok(envelope.repository)
    }
}
