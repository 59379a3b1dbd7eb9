use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to read configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unable to parse configuration file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("No dashboard URL configured")]
    MissingUrl,
}

/// Connection settings for the dashboard, read from YAML and then
/// overridden by command line flags and environment variables.
#[derive(Validate, Getters, CopyGetters, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    #[getset(get = "pub")]
    url: Option<Url>,

    #[getset(get = "pub")]
    username: Option<String>,

    #[getset(get = "pub")]
    #[serde(skip_serializing)]
    password: Option<String>,

    /// Skip TLS certificate verification; dashboards commonly run with
    /// self-signed certificates.
    #[getset(get_copy = "pub")]
    insecure: bool,

    #[validate(minimum = 1)]
    #[validate(maximum = 300)]
    timeout_secs: u64,

    #[validate(minimum = 100)]
    #[validate(maximum = 60000)]
    task_poll_interval_ms: u64,

    /// How long background tasks are followed before giving up.
    #[validate(minimum = 1)]
    #[validate(maximum = 86400)]
    task_timeout_secs: u64,

    #[validate(maximum = 5000)]
    debounce_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: None,
            username: None,
            password: None,
            insecure: false,
            timeout_secs: 30,
            task_poll_interval_ms: 2000,
            task_timeout_secs: 600,
            debounce_ms: 0,
        }
    }
}

impl ClientConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config
            .validate()
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    #[must_use]
    pub fn with_url(mut self, url: Option<Url>) -> Self {
        if url.is_some() {
            self.url = url;
        }
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, username: Option<String>, password: Option<String>) -> Self {
        if username.is_some() {
            self.username = username;
        }
        if password.is_some() {
            self.password = password;
        }
        self
    }

    #[must_use]
    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure |= insecure;
        self
    }

    pub fn dashboard_url(&self) -> Result<&Url, ConfigError> {
        self.url.as_ref().ok_or(ConfigError::MissingUrl)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn task_poll_interval(&self) -> Duration {
        Duration::from_millis(self.task_poll_interval_ms)
    }

    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
