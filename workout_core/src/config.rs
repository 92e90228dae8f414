//! Configuration file support for wkmigrate.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/wkmigrate/config.toml`.
//! Every key is optional; missing sections fall back to their defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "wkmigrate";

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub migration: MigrationConfig,

    #[serde(default)]
    pub conversion: ConversionConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Batch orchestration defaults
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MigrationConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_true")]
    pub validate_before_migration: bool,

    #[serde(default)]
    pub stop_on_error: bool,

    #[serde(default = "default_true")]
    pub preserve_original: bool,

    #[serde(default = "default_batch_pause_ms")]
    pub batch_pause_ms: u64,

    #[serde(default = "default_pause_poll_ms")]
    pub pause_poll_ms: u64,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            validate_before_migration: true,
            stop_on_error: false,
            preserve_original: true,
            batch_pause_ms: default_batch_pause_ms(),
            pause_poll_ms: default_pause_poll_ms(),
        }
    }
}

/// Per-record conversion defaults
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConversionConfig {
    #[serde(default = "default_seconds_per_set")]
    pub seconds_per_set: u32,

    #[serde(default = "default_created_by")]
    pub created_by: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_true")]
    pub preserve_ids: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            seconds_per_set: default_seconds_per_set(),
            created_by: default_created_by(),
            language: default_language(),
            preserve_ids: true,
        }
    }
}

/// Where migrated sessions and reports are written
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl OutputConfig {
    /// JSONL file migrated sessions are appended to
    pub fn sessions_path(&self) -> PathBuf {
        self.data_dir.join("sessions.jsonl")
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_batch_size() -> usize {
    10
}

fn default_batch_pause_ms() -> u64 {
    10
}

fn default_pause_poll_ms() -> u64 {
    25
}

fn default_seconds_per_set() -> u32 {
    60
}

fn default_created_by() -> String {
    "migration".into()
}

fn default_language() -> String {
    "en".into()
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject values the batch engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.migration.batch_size == 0 {
            return Err(Error::Config("migration.batch_size must be at least 1".into()));
        }
        if self.conversion.seconds_per_set == 0 {
            return Err(Error::Config(
                "conversion.seconds_per_set must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
