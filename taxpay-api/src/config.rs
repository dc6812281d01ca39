use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use taxpay_core::backend::BackendConfig;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid port '{0}'")]
    InvalidPort(String),
}

/// Service settings. Every field has a default, so an empty or absent file
/// is a valid configuration.
///
/// ```toml
/// host = "127.0.0.1"
/// port = 8080
/// backend = "mock"
/// log_level = "debug"
/// log_file = "taxpay.log"
/// schedule_file = "schedules.csv"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub backend: String,
    /// Bare level or full `EnvFilter` directive; `RUST_LOG` wins when set.
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    /// CSV of bracket schedules replacing the built-in tables per tax type.
    pub schedule_file: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            backend: BackendConfig::default().backend,
            log_level: "info".to_string(),
            log_file: None,
            schedule_file: None,
        }
    }
}

impl ServiceConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Reads `path` if given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Applies a `PORT` environment value on top of the file setting.
    pub fn apply_port_override(
        &mut self,
        value: Option<&str>,
    ) -> Result<(), ConfigError> {
        if let Some(raw) = value {
            self.port = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.to_string()))?;
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            backend: self.backend.clone(),
        }
    }
}
