//! Configuration for the DehaTrack daemon.
//!
//! Loads configuration from a TOML file; the filter geometry and threshold
//! are the tuning surface, everything else has sensible defaults.

use crate::error::Result;
use crate::filter::FilterConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Density filter geometry and threshold
    #[serde(default)]
    pub filter: FilterConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Debug/diagnostic settings
    #[serde(default)]
    pub debug: DebugConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error);
    /// `RUST_LOG` still takes precedence
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Debug/diagnostic configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DebugConfig {
    /// When set, every frame's candidate points are dumped to
    /// `points_<n>.log` files in this directory (`x y z retained` per line)
    pub dump_points_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<()> {
        self.filter.validate()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            logging: LoggingConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}
