//! Client configuration.
//!
//! Loaded via the `config` crate from an optional TOML file, then from
//! environment variables prefixed `AGENTFLOW` with `__` as the separator,
//! e.g. `AGENTFLOW__BASE_URL=https://flows.example.com/api`.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "AGENTFLOW";

/// Configuration for talking to the workflow service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the service API, without a trailing `/workflows`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for create, fetch, list, save and delete requests.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Local deadline for a workflow execution. The remote run is not
    /// cancelled when it passes.
    #[serde(default = "default_execute_timeout_secs")]
    pub execute_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8004/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_execute_timeout_secs() -> u64 {
    60
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            execute_timeout_secs: default_execute_timeout_secs(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from `file` (if given) and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or unreadable, or a value
    /// has the wrong type.
    pub fn load(file: Option<&Path>) -> Result<Self, config::ConfigError> {
        Self::load_with(file, config::Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with(
        file: Option<&Path>,
        environment: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(config::File::from(file).required(true));
        }
        builder
            .add_source(
                environment
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn execute_timeout(&self) -> Duration {
        Duration::from_secs(self.execute_timeout_secs)
    }
}
