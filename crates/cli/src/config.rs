//! Configuration loading from waypoint.toml.

use llm::{Credentials, ProfileOverrides, ProviderKind, ProviderSelector};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Top-level configuration. Every section is optional.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    /// Per-vendor overrides, keyed `openai`, `anthropic` or `gemini`.
    #[serde(default)]
    pub providers: HashMap<ProviderKind, ProfileOverrides>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StorageConfig {
    /// Database file. Defaults to the platform data directory.
    pub path: Option<PathBuf>,

    /// Profile to operate on.
    pub user: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Load the file if it exists, otherwise use defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// A provider selector with this configuration's overrides applied.
    pub fn selector(&self, credentials: Credentials) -> ProviderSelector {
        self.providers
            .iter()
            .fold(ProviderSelector::new(credentials), |selector, (kind, overrides)| {
                selector.with_overrides(*kind, overrides.clone())
            })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),
}
