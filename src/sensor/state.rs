//! Sensor exposure and gain state

use serde::{Deserialize, Serialize};

/// Lowest analog gain the white-balance step may write
pub const GAIN_MIN: f32 = 2.0;

/// Highest analog gain the white-balance step may write
pub const GAIN_MAX: f32 = 75.0;

/// Exposure and colour gains shared between the controller and the sensor driver
///
/// The controller reads `real_exposure` and the gains at the start of a frame
/// and writes `target_exposure` and the gains at the end. The driver applies
/// the targets and reports back what the hardware actually uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorState {
    /// Exposure currently applied by the sensor (sensor time units)
    pub real_exposure: f32,
    /// Exposure the driver should apply next
    pub target_exposure: f32,
    /// Analog gain of the red channel
    pub gain_red: f32,
    /// Analog gain of the blue channel
    pub gain_blue: f32,
}

impl SensorState {
    /// State with the given exposure and gains, with no pending exposure change
    pub fn new(exposure: f32, gain_red: f32, gain_blue: f32) -> Self {
        Self {
            real_exposure: exposure,
            target_exposure: exposure,
            gain_red,
            gain_blue,
        }
    }
}

impl Default for SensorState {
    fn default() -> Self {
        Self::new(30.0, 2.0, 2.0)
    }
}
