use crate::counting::{Strategy, DEFAULT_POOL_SIZE};
use crate::export::DEFAULT_OUTPUT_PREFIX;
use crate::samples::DEFAULT_SAMPLE_SUFFIXES;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Defaults for a run, read from `config.toml`. Command-line flags win.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_threads")]
    pub threads: usize,
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default = "default_sample_suffixes")]
    pub sample_suffixes: Vec<String>,
}

fn default_threads() -> usize {
    DEFAULT_POOL_SIZE
}

fn default_output_prefix() -> String {
    DEFAULT_OUTPUT_PREFIX.to_string()
}

fn default_sample_suffixes() -> Vec<String> {
    DEFAULT_SAMPLE_SUFFIXES.iter().map(|s| s.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            output_prefix: default_output_prefix(),
            strategy: Strategy::default(),
            sample_suffixes: default_sample_suffixes(),
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "sgrna-count", "sgrna-count")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Read the config from the platform config directory. A missing file
    /// gives the defaults; an unreadable one is reported and ignored.
    pub fn load() -> Self {
        let Some(config_path) = Self::default_path() else {
            return Config::default();
        };
        if !config_path.exists() {
            return Config::default();
        }

        match Self::load_from(&config_path) {
            Ok(config) => {
                debug!("Using configuration from {}", config_path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring {}: {:#}", config_path.display(), e);
                Config::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
