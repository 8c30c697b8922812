//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/fyncakes/config.toml)
//! 3. Environment variables (FYNCAKES_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
const ENV_PREFIX: &str = "FYNCAKES";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Connection string of a real document database (optional)
    #[serde(default)]
    pub mongo_uri: Option<String>,

    /// Fail instead of falling back to the in-memory store
    #[serde(default)]
    pub require_database: bool,

    /// Seed the in-memory store with the sample bakery data
    #[serde(default = "default_seed_sample_data")]
    pub seed_sample_data: bool,

    /// Log filter directive, e.g. `fyncakes_core=debug`
    #[serde(default)]
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mongo_uri: None,
            require_database: false,
            seed_sample_data: default_seed_sample_data(),
            log_filter: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (FYNCAKES_MONGO_URI, FYNCAKES_REQUIRE_DATABASE,
    ///    FYNCAKES_SEED_SAMPLE_DATA)
    /// 2. Config file (~/.config/fyncakes/config.toml or FYNCAKES_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // FYNCAKES_MONGO_URI
        if let Ok(val) = std::env::var(format!("{}_MONGO_URI", ENV_PREFIX)) {
            self.mongo_uri = if val.is_empty() { None } else { Some(val) };
        }

        // FYNCAKES_REQUIRE_DATABASE
        if let Ok(val) = std::env::var(format!("{}_REQUIRE_DATABASE", ENV_PREFIX)) {
            self.require_database = parse_flag(&val);
        }

        // FYNCAKES_SEED_SAMPLE_DATA
        if let Ok(val) = std::env::var(format!("{}_SEED_SAMPLE_DATA", ENV_PREFIX)) {
            self.seed_sample_data = parse_flag(&val);
        }
    }

    /// Save configuration to a file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with FYNCAKES_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fyncakes")
            .join("config.toml")
    }
}

fn default_seed_sample_data() -> bool {
    true
}

fn parse_flag(val: &str) -> bool {
    val.eq_ignore_ascii_case("true") || val == "1"
}
