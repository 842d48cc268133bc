//! Configuration manager for loading and saving controller configuration
//!
//! Configuration lives in `$AEAWB_HOME/config.json` (current directory when
//! `AEAWB_HOME` is unset). Writes go through a temporary file that is
//! atomically persisted over the old one.

use crate::config::models::AppConfig;
use crate::error::{AeAwbError, Result};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// Environment variable naming the configuration and log directory
pub const HOME_ENV_VAR: &str = "AEAWB_HOME";

/// Configuration manager
pub struct ConfigManager;

impl ConfigManager {
    /// Directory holding the configuration file and logs
    pub fn get_config_dir() -> PathBuf {
        std::env::var_os(HOME_ENV_VAR).map_or_else(|| PathBuf::from("."), PathBuf::from)
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> PathBuf {
        Self::get_config_dir().join("config.json")
    }

    /// Ensure the configuration directory exists
    pub fn ensure_config_dir() -> Result<PathBuf> {
        let config_dir = Self::get_config_dir();
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    /// Load configuration from disk
    ///
    /// If the configuration file doesn't exist or is corrupt, returns default configuration.
    pub fn load() -> Result<AppConfig> {
        let config_path = Self::get_config_path();

        if !config_path.exists() {
            info!("Configuration file not found, using defaults");
            return Ok(AppConfig::default());
        }

        let json = std::fs::read_to_string(&config_path)?;

        match serde_json::from_str(&json) {
            Ok(config) => {
                info!("Configuration loaded from {}", config_path.display());
                Ok(config)
            }
            Err(e) => {
                warn!("Failed to parse configuration, using defaults: {}", e);
                Ok(AppConfig::default())
            }
        }
    }

    /// Save configuration to disk with atomic write
    pub fn save(config: &AppConfig) -> Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        let json = serde_json::to_string_pretty(config)?;
        let mut temp_file = NamedTempFile::new_in(&config_dir)?;
        temp_file.write_all(json.as_bytes())?;
        temp_file
            .persist(&config_path)
            .map_err(|e| AeAwbError::IoError(e.error))?;

        info!("Configuration saved to {}", config_path.display());
        Ok(())
    }
}
