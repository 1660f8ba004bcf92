//! Configuration for the warden.
//!
//! Loaded from a YAML file, overridden by `ES_*` environment variables,
//! and validated before the control loop starts. Budget strings are
//! parsed at validation time so a typo fails the process at startup
//! rather than mid-run.
//!
//! # Example
//!
//! ```yaml
//! cluster:
//!   url: https://es.example.com:9200
//!   username: warden
//!   password: hunter2
//!   ca_cert_path: /etc/ssl/es-ca.pem
//!   skip_tls_verify: false
//! aliases:
//!   - name: logs-app
//!     max_size: 50GB
//!   - name: logs-audit
//!     max_size: 2TiB
//! poll_interval: 120
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::snapshot::AliasTarget;
use crate::units::{parse_size, SizeParseError};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Connection settings for the search cluster.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Path to a PEM-encoded CA certificate to trust in addition to the
    /// system roots.
    #[serde(default)]
    pub ca_cert_path: Option<String>,
    /// Disable TLS certificate verification. Logged loudly at startup.
    #[serde(default)]
    pub skip_tls_verify: bool,
}

/// One alias to keep under budget.
#[derive(Debug, Clone, Deserialize)]
pub struct AliasConfig {
    pub name: String,
    pub max_size: String,
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WardenConfig {
    pub cluster: ClusterConfig,
    #[serde(default)]
    pub aliases: Vec<AliasConfig>,
    /// Seconds between evaluation cycles.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

fn default_poll_interval() -> u64 {
    120
}

impl WardenConfig {
    /// Read and parse the config file, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        let mut cfg: WardenConfig = serde_yaml::from_str(&data)?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Environment variables win over file values when set and non-empty.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("ES_CLUSTER_URL") {
            if !url.is_empty() {
                self.cluster.url = url;
            }
        }
        if let Ok(username) = std::env::var("ES_USERNAME") {
            if !username.is_empty() {
                self.cluster.username = username;
            }
        }
        if let Ok(password) = std::env::var("ES_PASSWORD") {
            if !password.is_empty() {
                self.cluster.password = password;
            }
        }
        if let Ok(ca_cert_path) = std::env::var("ES_CA_CERT_PATH") {
            if !ca_cert_path.is_empty() {
                self.cluster.ca_cert_path = Some(ca_cert_path);
            }
        }
        if let Ok(skip_verify) = std::env::var("ES_SKIP_TLS_VERIFY") {
            if !skip_verify.is_empty() {
                self.cluster.skip_tls_verify = skip_verify == "true";
            }
        }
    }

    /// Check the configuration is complete enough to start the loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cluster.url.is_empty() {
            return Err(ConfigError::Invalid("missing cluster URL".to_string()));
        }
        if self.cluster.username.is_empty() || self.cluster.password.is_empty() {
            return Err(ConfigError::Invalid(
                "missing cluster credentials".to_string(),
            ));
        }
        if self.aliases.is_empty() {
            return Err(ConfigError::Invalid("no aliases defined".to_string()));
        }
        if self.poll_interval == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval must be positive".to_string(),
            ));
        }
        self.targets().map(|_| ())
    }

    /// Resolve the configured aliases into targets with byte budgets.
    pub fn targets(&self) -> Result<Vec<AliasTarget>, ConfigError> {
        self.aliases
            .iter()
            .map(|alias| {
                let max_size_bytes = parse_size(&alias.max_size).map_err(|err| {
                    ConfigError::Invalid(format!(
                        "bad max_size for alias '{}': {}",
                        alias.name, err
                    ))
                })?;
                if max_size_bytes < 0 {
                    return Err(ConfigError::Invalid(format!(
                        "negative max_size for alias '{}'",
                        alias.name
                    )));
                }
                Ok(AliasTarget {
                    name: alias.name.clone(),
                    max_size: alias.max_size.clone(),
                    max_size_bytes,
                })
            })
            .collect()
    }
}

impl From<SizeParseError> for ConfigError {
    fn from(err: SizeParseError) -> Self {
        ConfigError::Invalid(err.to_string())
    }
}
