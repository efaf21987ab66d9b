//! Configuration module - JSON config file loading

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::parser::WORLD;

/// Tracker configuration, loaded once at startup from a JSON file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Player names excluded from ranking and display
    #[serde(default)]
    pub ignored_players: Vec<String>,

    /// Player names whose score renders in ciders instead of beers
    #[serde(default)]
    pub drinking_cider_players: Vec<String>,

    /// Round identifiers whose close/save step is skipped
    #[serde(default)]
    pub skip_rounds: Vec<String>,
}

impl Config {
    /// Load configuration from a JSON file. The `<world>` sentinel is always
    /// treated as ignored, whether or not the file lists it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: Config = serde_json::from_str(&data)?;
        if !config.ignored_players.iter().any(|name| name == WORLD) {
            config.ignored_players.push(WORLD.to_string());
        }

        Ok(config)
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        name == WORLD || self.ignored_players.iter().any(|n| n == name)
    }

    pub fn drinks_cider(&self, name: &str) -> bool {
        self.drinking_cider_players.iter().any(|n| n == name)
    }

    pub fn is_skipped(&self, round_id: &str) -> bool {
        self.skip_rounds.iter().any(|id| id == round_id)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
