//! Sensor driver interface

use crate::error::Result;
use crate::sensor::SensorState;

/// Programs exposure and gain updates into the sensor
///
/// Both operations receive the whole state so the driver can write back the
/// values the hardware actually settled on (register quantisation, frame-time
/// limits).
pub trait SensorDriver {
    /// Apply `state.target_exposure`, updating `state.real_exposure`
    fn commit_exposure(&mut self, state: &mut SensorState) -> Result<()>;

    /// Apply `state.gain_red` and `state.gain_blue` together
    fn commit_gains(&mut self, state: &mut SensorState) -> Result<()>;
}
