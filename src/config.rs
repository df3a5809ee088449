//! Compiler and CLI configuration (`relq.toml`).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{RelqError, RelqResult};
use crate::transpiler::{DEFAULT_MAX_DEPTH, Dialect};

/// Project-local config file name.
pub const CONFIG_FILE: &str = "relq.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub dialect: Dialect,
    pub max_depth: usize,
    pub database_url: Option<String>,
    /// Schema file (TOML or JSON), relative to the working directory.
    pub schema: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            database_url: None,
            schema: None,
        }
    }
}

impl Config {
    pub fn from_toml_str(input: &str) -> RelqResult<Self> {
        toml::from_str(input).map_err(|e| RelqError::Config(e.to_string()))
    }

    pub fn load_from(path: impl AsRef<Path>) -> RelqResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// `./relq.toml`, then `<config dir>/relq/config.toml`, then defaults.
    pub fn load() -> RelqResult<Self> {
        let candidates = [
            Some(PathBuf::from(CONFIG_FILE)),
            dirs::config_dir().map(|dir| dir.join("relq").join("config.toml")),
        ];
        for path in candidates.into_iter().flatten() {
            if path.exists() {
                debug!(path = %path.display(), "loading config");
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }
}
