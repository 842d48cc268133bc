//! Simulated sensor driver
//!
//! Stands in for real sensor registers when replaying recorded statistics.
//! Exposure commits are bounded to the sensor's exposure range and quantised to
//! its row time, the way a rolling-shutter sensor programs integration time in
//! whole rows. Gain commits are taken as-is.

use crate::error::Result;
use crate::sensor::{SensorDriver, SensorState};
use crate::utils::clamp;
use tracing::{debug, trace};

/// Sensor model that applies commits immediately
#[derive(Debug, Clone)]
pub struct SimulatedSensor {
    /// Shortest programmable exposure
    min_exposure: f32,
    /// Longest programmable exposure (bounded by the frame time)
    max_exposure: f32,
    /// Exposure granularity, `0.0` for continuous exposure
    exposure_step: f32,
    exposure_commits: u64,
    gain_commits: u64,
}

impl SimulatedSensor {
    /// Sensor with a continuous, unbounded exposure range
    pub fn new() -> Self {
        Self {
            min_exposure: 0.0,
            max_exposure: f32::MAX,
            exposure_step: 0.0,
            exposure_commits: 0,
            gain_commits: 0,
        }
    }

    /// Bound the programmable exposure to `[min, max]`
    #[must_use]
    pub fn with_exposure_range(mut self, min: f32, max: f32) -> Self {
        self.min_exposure = min;
        self.max_exposure = max;
        self
    }

    /// Quantise exposure to multiples of `step`
    #[must_use]
    pub fn with_exposure_step(mut self, step: f32) -> Self {
        self.exposure_step = step.max(0.0);
        self
    }

    /// Number of exposure commits received
    pub fn exposure_commits(&self) -> u64 {
        self.exposure_commits
    }

    /// Number of gain commits received
    pub fn gain_commits(&self) -> u64 {
        self.gain_commits
    }

    fn quantise(&self, exposure: f32) -> f32 {
        if self.exposure_step > 0.0 {
            (exposure / self.exposure_step).round() * self.exposure_step
        } else {
            exposure
        }
    }
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorDriver for SimulatedSensor {
    fn commit_exposure(&mut self, state: &mut SensorState) -> Result<()> {
        self.exposure_commits += 1;
        let applied = clamp(
            self.quantise(state.target_exposure),
            self.min_exposure,
            self.max_exposure,
        );
        trace!(
            "Exposure commit: target {:.4} -> applied {:.4}",
            state.target_exposure, applied
        );
        state.real_exposure = applied;
        Ok(())
    }

    fn commit_gains(&mut self, state: &mut SensorState) -> Result<()> {
        self.gain_commits += 1;
        debug!(
            "Gain commit: red {:.4}, blue {:.4}",
            state.gain_red, state.gain_blue
        );
        Ok(())
    }
}
