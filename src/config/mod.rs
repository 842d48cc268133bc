//! Configuration management module
//!
//! This module handles loading, saving, and validating controller configuration.
//! Configuration is stored in `$AEAWB_HOME/config.json` with atomic writes
//! to prevent corruption.

pub mod manager;
pub mod models;

pub use manager::{ConfigManager, HOME_ENV_VAR};
pub use models::{AppConfig, ControllerConfig, InitialSensorSettings};
