//! Sensor control module
//!
//! This module models the sensor side of the loop: the exposure and gain state
//! the controller updates, and the driver that programs it into hardware.
//!
//! # Architecture
//!
//! - `SensorState`: exposure and gain values, passed by `&mut` to the controller
//! - `SensorDriver`: exposure commit and gain commit operations
//! - `SimulatedSensor`: driver used for replaying recorded statistics

pub mod driver;
pub mod simulated;
pub mod state;

pub use driver::SensorDriver;
pub use simulated::SimulatedSensor;
pub use state::{GAIN_MAX, GAIN_MIN, SensorState};
