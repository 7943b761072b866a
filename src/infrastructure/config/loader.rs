use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Default project config file, merged when present
pub const DEFAULT_CONFIG_FILE: &str = "repositories.yaml";

/// Prefix for environment variable overrides (`REPOSITORIES_RETRY__MAX_ATTEMPTS=5`)
pub const ENV_PREFIX: &str = "REPOSITORIES_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Upstream base URL cannot be empty")]
    EmptyBaseUrl,

    #[error("Server address cannot be empty")]
    EmptyServerAddr,

    #[error("Invalid max_attempts: {0}. Must be at least 1")]
    InvalidMaxAttempts(u32),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must not exceed max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Invalid max_concurrency: {0}. Must be at least 1")]
    InvalidMaxConcurrency(usize),

    #[error("Invalid merge_queue_capacity: {0}. Must be at least 1")]
    InvalidMergeQueueCapacity(usize),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. `repositories.yaml` in the working directory (optional)
    /// 3. Environment variables (`REPOSITORIES_*` prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        Self::load_with(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Load configuration, reading YAML from `path` instead of the default file
    pub fn load_with(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Self::figment(path.as_ref())
            .extract()
            .with_context(|| {
                format!(
                    "Failed to load configuration from {}",
                    path.as_ref().display()
                )
            })?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.server.addr.trim().is_empty() {
            return Err(ConfigError::EmptyServerAddr);
        }

        if config.upstream.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }

        if config.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts(config.retry.max_attempts));
        }

        if config.retry.initial_backoff_ms > config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        if config.aggregator.max_concurrency == 0 {
            return Err(ConfigError::InvalidMaxConcurrency(
                config.aggregator.max_concurrency,
            ));
        }

        if config.cache.merge_queue_capacity == 0 {
            return Err(ConfigError::InvalidMergeQueueCapacity(
                config.cache.merge_queue_capacity,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::{LogFormat, RotationPolicy};
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    const OVERRIDDEN_VARS: [&str; 2] = [
        "REPOSITORIES_RETRY__MAX_ATTEMPTS",
        "REPOSITORIES_UPSTREAM__BASE_URL",
    ];

    /// Run without the env overrides other tests set.
    fn without_overrides<R>(f: impl FnOnce() -> R) -> R {
        temp_env::with_vars_unset(OVERRIDDEN_VARS, f)
    }

    fn yaml_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.addr, "0.0.0.0:8080");
        assert_eq!(config.upstream.base_url, "http://localhost:7080");
        assert!(config.upstream.request_timeout.is_none());
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.aggregator.max_concurrency, 64);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.merge_queue_capacity, 5);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Json);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
server:
  addr: 127.0.0.1:9000
upstream:
  base_url: http://upstream:7080
  request_timeout: 750ms
retry:
  max_attempts: 5
cache:
  enabled: false
logging:
  level: debug
  format: pretty
  rotation: hourly
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.server.addr, "127.0.0.1:9000");
        assert_eq!(config.upstream.base_url, "http://upstream:7080");
        assert_eq!(
            config.upstream.request_timeout,
            Some(Duration::from_millis(750))
        );
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.initial_backoff_ms, 50, "unset fields keep defaults");
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.merge_queue_capacity, 5);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.logging.rotation, RotationPolicy::Hourly);

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_load_with_file() {
        let file = yaml_file("aggregator:\n  max_concurrency: 8\n");

        let config = without_overrides(|| ConfigLoader::load_with(file.path())).unwrap();

        assert_eq!(config.aggregator.max_concurrency, 8);
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config =
            without_overrides(|| ConfigLoader::load_with("/nonexistent/repositories.yaml"))
                .unwrap();
        assert_eq!(config.server.addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_env_override() {
        let file = yaml_file("retry:\n  max_attempts: 4\nlogging:\n  level: warn\n");

        temp_env::with_vars(
            [
                ("REPOSITORIES_RETRY__MAX_ATTEMPTS", Some("7")),
                ("REPOSITORIES_UPSTREAM__BASE_URL", Some("http://env-upstream:1234")),
            ],
            || {
                let config = ConfigLoader::load_with(file.path()).unwrap();
                assert_eq!(config.retry.max_attempts, 7, "env should win over file");
                assert_eq!(config.upstream.base_url, "http://env-upstream:1234");
                assert_eq!(config.logging.level, "warn", "file value should persist");
            },
        );
    }

    #[test]
    fn test_invalid_file_value_fails_validation() {
        let file = yaml_file("retry:\n  max_attempts: 0\n");
        let err = without_overrides(|| ConfigLoader::load_with(file.path())).unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn test_validate_empty_base_url() {
        let mut config = Config::default();
        config.upstream.base_url = String::new();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyBaseUrl)
        ));
    }

    #[test]
    fn test_validate_zero_max_attempts() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxAttempts(0))
        ));
    }

    #[test]
    fn test_validate_invalid_backoff() {
        let mut config = Config::default();
        config.retry.initial_backoff_ms = 5_000;
        config.retry.max_backoff_ms = 1_000;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidBackoff(5_000, 1_000))
        ));
    }

    #[test]
    fn test_validate_zero_concurrency() {
        let mut config = Config::default();
        config.aggregator.max_concurrency = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxConcurrency(0))
        ));
    }

    #[test]
    fn test_validate_zero_merge_queue() {
        let mut config = Config::default();
        config.cache.merge_queue_capacity = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMergeQueueCapacity(0))
        ));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidLogLevel(level)) => assert_eq!(level, "verbose"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }
}
