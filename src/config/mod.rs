//! Configuration management
//!
//! Handles TOML configuration parsing, defaults and validation. Command-line
//! flags are applied on top of whatever the file provides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::{APP_NAME, CONFIG_FILE_NAME, DEFAULT_MAX_LINE_LENGTH};
use crate::ingest::IngestOptions;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid max_line_length: {0}. Must be greater than zero")]
    InvalidMaxLineLength(usize),
}

/// Report rendering format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub ingest: IngestSettings,
    pub report: ReportSettings,
}

/// Line handling settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// Lines longer than this many characters are rejected
    pub max_line_length: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

/// Report settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub format: OutputFormat,
    /// Limit for listed pages and domains; 0 lists everything
    pub top: usize,
}

impl AnalyzerConfig {
    /// Load and validate a TOML configuration file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// `<config dir>/logtally/config.toml`, if the platform has a config dir
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE_NAME))
    }

    /// Resolve the effective configuration: an explicit path must load, the
    /// default path is used only when it exists, otherwise defaults apply.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            log::debug!("Loading configuration from {}", path.display());
            return Self::load_from_file(path);
        }

        match Self::default_config_path() {
            Some(path) if path.is_file() => {
                log::debug!("Loading configuration from {}", path.display());
                Self::load_from_file(&path)
            }
            _ => {
                log::debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ingest.max_line_length == 0 {
            return Err(ConfigError::InvalidMaxLineLength(self.ingest.max_line_length));
        }
        Ok(())
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            max_line_length: self.ingest.max_line_length,
        }
    }
}
