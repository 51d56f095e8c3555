//! Configuration
//!
//! `CodecConfig` is carried by every variant registry. `Config` is the file
//! format read by the `tagwire` binary: the codec settings plus the default
//! log filter.
//!
//! ```json
//! { "tag_field": "type", "unknown_fields": "reject", "log_filter": "debug" }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// How deserialization treats wire fields a variant does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFields {
    /// Skip undeclared fields
    #[default]
    Ignore,
    /// Fail with `UndeclaredField`
    Reject,
}

/// Settings shared by the union codecs of one registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Name of the discriminant field (default "type")
    #[serde(default = "default_tag_field")]
    pub tag_field: String,

    /// Undeclared field policy (default: ignore)
    #[serde(default)]
    pub unknown_fields: UnknownFields,
}

fn default_tag_field() -> String {
    "type".to_string()
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            tag_field: default_tag_field(),
            unknown_fields: UnknownFields::default(),
        }
    }
}

impl CodecConfig {
    /// Returns a copy using a different tag field.
    pub fn with_tag_field(mut self, tag_field: impl Into<String>) -> Self {
        self.tag_field = tag_field.into();
        self
    }

    /// Returns a copy using a different undeclared field policy.
    pub fn with_unknown_fields(mut self, unknown_fields: UnknownFields) -> Self {
        self.unknown_fields = unknown_fields;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.tag_field.trim().is_empty() {
            return Err(ConfigError::Invalid("tag_field must not be empty".into()));
        }
        Ok(())
    }
}

/// Configuration file structure for the `tagwire` binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Codec settings, flattened into the top-level object
    #[serde(flatten)]
    pub codec: CodecConfig,

    /// Default `tracing` filter when `RUST_LOG` is unset (default "info")
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            codec: CodecConfig::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Loads and validates a JSON configuration file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.codec.validate()?;
        Ok(config)
    }
}
