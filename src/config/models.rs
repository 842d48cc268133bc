//! Configuration data models
//!
//! This module defines the data structures used for controller configuration.

use crate::error::{AeAwbError, Result, StringError};
use crate::sensor::{GAIN_MAX, GAIN_MIN, SensorState};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Controller toggles and bounds
    pub controller: ControllerConfig,
    /// Sensor values used before the first frame is processed
    pub initial_sensor: InitialSensorSettings,
}

/// Controller toggles and bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Whether the exposure step runs
    pub auto_exposure_enabled: bool,
    /// Whether the white-balance step runs
    pub auto_white_balance_enabled: bool,
    /// Lower bound for both colour gains
    pub gain_min: f32,
    /// Upper bound for both colour gains
    pub gain_max: f32,
    /// Frame period in milliseconds
    pub frame_interval_ms: u64,
}

/// Sensor values used before the first frame is processed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialSensorSettings {
    /// Starting exposure (sensor time units)
    pub exposure: f32,
    /// Starting red gain
    pub gain_red: f32,
    /// Starting blue gain
    pub gain_blue: f32,
}

impl ControllerConfig {
    /// Frame period as a `Duration`
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Check the bounds for consistency
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a gain bound is not a positive finite number,
    /// when `gain_min > gain_max`, or when the frame interval is zero.
    pub fn validate(&self) -> Result<()> {
        let invalid =
            |msg: String| -> Result<()> { Err(AeAwbError::ConfigError(StringError::new(msg))) };

        if !self.gain_min.is_finite() || self.gain_min <= 0.0 {
            return invalid(format!("gain_min must be positive, got {}", self.gain_min));
        }
        if !self.gain_max.is_finite() || self.gain_max <= 0.0 {
            return invalid(format!("gain_max must be positive, got {}", self.gain_max));
        }
        if self.gain_min > self.gain_max {
            return invalid(format!(
                "gain_min ({}) exceeds gain_max ({})",
                self.gain_min, self.gain_max
            ));
        }
        if self.frame_interval_ms == 0 {
            return invalid("frame_interval_ms must be at least 1".to_string());
        }
        Ok(())
    }
}

impl InitialSensorSettings {
    /// Sensor state matching these settings
    pub fn to_sensor_state(&self) -> SensorState {
        SensorState::new(self.exposure, self.gain_red, self.gain_blue)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            auto_exposure_enabled: true,
            auto_white_balance_enabled: true,
            gain_min: GAIN_MIN,
            gain_max: GAIN_MAX,
            frame_interval_ms: 33,
        }
    }
}

impl Default for InitialSensorSettings {
    fn default() -> Self {
        let state = SensorState::default();
        Self {
            exposure: state.real_exposure,
            gain_red: state.gain_red,
            gain_blue: state.gain_blue,
        }
    }
}
