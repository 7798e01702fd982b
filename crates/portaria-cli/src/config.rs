//! `portaria.toml` configuration.
//!
//! Every field has a default, so an empty file (or no file at all) is a
//! valid configuration.

use portaria_controller::ControllerConfig;
use portaria_core::{
    Error, Result,
    constants::{
        DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_SERVER_ADDR, MAX_REQUEST_TIMEOUT_MS,
        MIN_REQUEST_TIMEOUT_MS,
    },
};
use portaria_network::AuthorizationClientConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Configuration file used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "portaria.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortariaConfig {
    pub server: ServerConfig,
    pub controller: ControllerConfig,
}

/// Authorization server connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// `host:port` to connect to.
    pub address: String,
    /// `Host` header; defaults to `address`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    pub timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_SERVER_ADDR.to_string(),
            host: None,
            timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl ServerConfig {
    pub fn client_config(&self) -> AuthorizationClientConfig {
        let config = AuthorizationClientConfig::new(self.address.clone())
            .with_timeout(Duration::from_millis(self.timeout_ms));
        match &self.host {
            Some(host) => config.with_host(host.clone()),
            None => config,
        }
    }
}

impl PortariaConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the document does not parse or does not
    /// validate.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read, `Error::Config` if
    /// it is not a valid configuration.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load the configuration.
    ///
    /// An explicit `path` must exist. Without one, `portaria.toml` in the
    /// working directory is used when present, and the defaults otherwise.
    ///
    /// # Errors
    ///
    /// See [`from_file`](Self::from_file).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    debug!("No {DEFAULT_CONFIG_PATH} found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// # Errors
    ///
    /// Returns `Error::Config` describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.server.address.trim().is_empty() {
            return Err(Error::Config("server.address cannot be empty".to_string()));
        }
        if !(MIN_REQUEST_TIMEOUT_MS..=MAX_REQUEST_TIMEOUT_MS).contains(&self.server.timeout_ms) {
            return Err(Error::Config(format!(
                "server.timeout_ms must be between {MIN_REQUEST_TIMEOUT_MS} and {MAX_REQUEST_TIMEOUT_MS}, got {}",
                self.server.timeout_ms
            )));
        }
        self.controller
            .validate()
            .map_err(|e| Error::Config(e.to_string()))
    }

    /// Render the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}
