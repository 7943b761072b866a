//! Service wiring and project initialization
//!
//! - Assembling upstream client, aggregator and fallback cache from config
//! - Default config file creation

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::cache::{CacheStore, FallbackCache};
use crate::domain::models::Config;
use crate::domain::ports::RepositoryService;
use crate::infrastructure::upstream::{RetryPolicy, UpstreamClient};
use crate::services::FetchAggregator;

/// Default configuration template content
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Repositories service configuration
# Override settings by editing this file or setting environment variables
# with REPOSITORIES_ prefix
#
# Example environment variables:
#   export REPOSITORIES_UPSTREAM__BASE_URL=http://upstream:7080
#   export REPOSITORIES_RETRY__MAX_ATTEMPTS=5
#   export REPOSITORIES_LOGGING__LEVEL=debug

server:
  # Address the HTTP server binds to
  addr: "0.0.0.0:8080"

upstream:
  # Records are fetched from {base_url}/repository
  base_url: "http://localhost:7080"
  # Optional per-attempt timeout, e.g. "2s"
  # request_timeout: "2s"

retry:
  # Total attempts per record, including the first
  max_attempts: 3
  initial_backoff_ms: 50
  max_backoff_ms: 1000

aggregator:
  # Maximum concurrent upstream fetches per batch
  max_concurrency: 64

cache:
  # Pad timed-out batches from previously seen records
  enabled: true
  # Batches waiting to be merged before new ones are dropped
  merge_queue_capacity: 5

logging:
  # Log level: trace, debug, info, warn, error
  level: "info"
  # Log format: json, pretty
  format: "json"
  # Uncomment to also write rolling JSON log files
  # log_dir: "logs"
  # rotation: daily
"#;

/// Build the batch service described by `config`.
///
/// The aggregator is wrapped in the fallback cache unless `cache.enabled`
/// is false. Must be called inside a Tokio runtime.
pub fn build_repository_service(config: &Config) -> Result<Arc<dyn RepositoryService>> {
    let client = UpstreamClient::with_config(&config.upstream)
        .context("Failed to create upstream client")?;
    info!(target = %client.target(), "upstream client ready");

    let aggregator = Arc::new(FetchAggregator::with_config(
        Arc::new(client),
        RetryPolicy::from_config(&config.retry),
        &config.aggregator,
    ));

    if !config.cache.enabled {
        info!("fallback cache disabled");
        return Ok(aggregator);
    }

    Ok(Arc::new(FallbackCache::with_store(
        aggregator,
        CacheStore::new(),
        config.cache.merge_queue_capacity,
    )))
}

/// Write the default config file to `path`.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), "wrote default configuration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::ConfigLoader;

    #[test]
    fn test_template_is_valid_config() {
        let config: Config =
            serde_yaml::from_str(DEFAULT_CONFIG_TEMPLATE).expect("template should parse");
        ConfigLoader::validate(&config).expect("template should validate");
        assert_eq!(config.upstream.base_url, "http://localhost:7080");
    }

    #[test]
    fn test_write_default_config_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("repositories.yaml");

        write_default_config(&path, false).unwrap();
        assert!(path.exists());

        let err = write_default_config(&path, false).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        write_default_config(&path, true).unwrap();
    }

    #[tokio::test]
    async fn test_build_service_with_and_without_cache() {
        let mut config = Config::default();
        assert!(build_repository_service(&config).is_ok());

        config.cache.enabled = false;
        assert!(build_repository_service(&config).is_ok());

        config.upstream.base_url = "::not a url::".to_string();
        assert!(build_repository_service(&config).is_err());
    }
}
