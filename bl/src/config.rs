//! Configuration types and loading

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::level::LevelRegistry;

/// File name looked up in the working directory
pub const LOCAL_CONFIG: &str = ".buildlog.yml";

/// When to color output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Color when stderr is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn enabled(self, is_terminal: bool) -> bool {
        match self {
            Self::Auto => is_terminal,
            Self::Always => true,
            Self::Never => false,
        }
    }
}

/// Main buildlog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Threshold level; falls back to the environment when unset
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Show a progress bar on interactive terminals
    pub progress: bool,

    pub color: ColorMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: None,
            progress: true,
            color: ColorMode::Auto,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // An explicit path must load
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let mut candidates = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("buildlog").join("buildlog.yml"));
        }
        Ok(Self::load_first(&candidates))
    }

    /// First candidate that exists and parses, else defaults
    fn load_first(candidates: &[PathBuf]) -> Self {
        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }
        tracing::info!("No config file found, using defaults");
        Self::default()
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Threshold source: command line, then this config, then the environment
    pub fn level_registry(&self, cli_level: Option<&str>) -> LevelRegistry {
        match cli_level.or(self.log_level.as_deref()) {
            Some(raw) => LevelRegistry::with_threshold(raw),
            None => LevelRegistry::from_env(),
        }
    }
}
