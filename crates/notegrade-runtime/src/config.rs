//! Configuration for notegrade-runtime.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use notegrade_core::{Evaluator, DEFAULT_MAX_LENGTH};

/// Errors from loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Profiles processed concurrently by the batch driver
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Character limit for the length criterion
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Timeout configuration
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,

    /// Where collaborators read their data
    #[serde(default)]
    pub sources: SourceConfig,

    /// Where batch results are written
    #[serde(default = "default_results_path")]
    pub results_path: PathBuf,
}

fn default_concurrency() -> usize {
    4
}

fn default_max_length() -> usize {
    DEFAULT_MAX_LENGTH
}

fn default_results_path() -> PathBuf {
    PathBuf::from("connection_notes.json")
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            max_length: DEFAULT_MAX_LENGTH,
            timeouts: TimeoutConfig::default(),
            retry: RetryConfig::default(),
            sources: SourceConfig::default(),
            results_path: default_results_path(),
        }
    }
}

impl RuntimeConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, choosing the format by extension (`.json` or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            Self::from_json(&contents)
        } else {
            Self::from_yaml(&contents)
        }
    }

    /// Reject values the drivers cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "concurrency must be at least 1".to_string(),
            ));
        }

        if self.timeouts.collaborator.is_zero() {
            return Err(ConfigError::Invalid(
                "timeouts.collaborator must be greater than zero".to_string(),
            ));
        }

        if !(self.retry.multiplier >= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "retry.multiplier must be at least 1.0, got {}",
                self.retry.multiplier
            )));
        }

        if self.retry.initial_backoff > self.retry.max_backoff {
            return Err(ConfigError::Invalid(
                "retry.initial_backoff exceeds retry.max_backoff".to_string(),
            ));
        }

        Ok(())
    }

    /// Build the evaluator this configuration describes.
    pub fn evaluator(&self) -> Evaluator {
        Evaluator::new().with_max_length(self.max_length)
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Bound on a single profile fetch or note generation call
    #[serde(with = "humantime_serde", default = "default_collaborator_timeout")]
    pub collaborator: Duration,
}

fn default_collaborator_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            collaborator: Duration::from_secs(30),
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff
    #[serde(with = "humantime_serde", default = "default_initial_backoff")]
    pub initial_backoff: Duration,

    /// Maximum backoff
    #[serde(with = "humantime_serde", default = "default_max_backoff")]
    pub max_backoff: Duration,

    /// Backoff multiplier
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_max_retries() -> u32 {
    2
}

fn default_initial_backoff() -> Duration {
    Duration::from_millis(200)
}

fn default_max_backoff() -> Duration {
    Duration::from_secs(5)
}

fn default_multiplier() -> f64 {
    2.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (zero-based), capped at `max_backoff`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(attempt.min(i32::MAX as u32) as i32);
        let millis = self.initial_backoff.as_millis() as f64 * factor;
        let capped = millis.min(self.max_backoff.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }
}

/// Locations of the local collaborator data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Profile directory or bundle file
    #[serde(default)]
    pub profiles: Option<PathBuf>,

    /// Pre-generated notes file
    #[serde(default)]
    pub notes: Option<PathBuf>,
}

// Custom serialization for Duration using humantime format
mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RuntimeConfig::default();
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.max_length, 300);
        assert_eq!(config.results_path, PathBuf::from("connection_notes.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_overrides() {
        let yaml = r#"
concurrency: 8
max_length: 280
timeouts:
  collaborator: "5s"
retry:
  max_retries: 1
  initial_backoff: "50ms"
sources:
  profiles: "./profiles"
  notes: "./notes.json"
"#;
        let config = RuntimeConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.max_length, 280);
        assert_eq!(config.timeouts.collaborator, Duration::from_secs(5));
        assert_eq!(config.retry.max_retries, 1);
        assert_eq!(config.retry.initial_backoff, Duration::from_millis(50));
        // Unspecified fields keep their defaults
        assert_eq!(config.retry.max_backoff, Duration::from_secs(5));
        assert_eq!(config.sources.profiles, Some(PathBuf::from("./profiles")));
        assert_eq!(config.evaluator().max_length(), 280);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = RuntimeConfig::from_yaml("{}").unwrap();
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.timeouts.collaborator, Duration::from_secs(30));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let result = RuntimeConfig::from_json(r#"{"concurrency": 0}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_bad_duration_rejected() {
        let result = RuntimeConfig::from_yaml("timeouts:\n  collaborator: \"soon\"\n");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let retry = RetryConfig {
            max_retries: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(350),
            multiplier: 2.0,
        };
        assert_eq!(retry.backoff(0), Duration::from_millis(100));
        assert_eq!(retry.backoff(1), Duration::from_millis(200));
        assert_eq!(retry.backoff(2), Duration::from_millis(350));
        assert_eq!(retry.backoff(10), Duration::from_millis(350));
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = RuntimeConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"collaborator\":\"30s\""));

        let parsed = RuntimeConfig::from_json(&json).unwrap();
        assert_eq!(parsed.timeouts.collaborator, config.timeouts.collaborator);
        assert_eq!(parsed.retry.initial_backoff, config.retry.initial_backoff);
    }
}
