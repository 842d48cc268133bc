//! `aeawb` - Auto-exposure and auto-white-balance control for camera sensors
//!
//! Turns per-frame ISP statistics (a luminance histogram plus chroma sums over
//! grey pixels) into exposure and colour-gain updates for the sensor. A frame
//! loop polls a `StatisticsSource`, the `AeAwbController` decides, and a
//! `SensorDriver` commits the result to hardware.
//!
//! # Components
//!
//! - `isp`: statistics record and sources (JSON Lines replay)
//! - `controller`: exposure and white-balance decisions
//! - `sensor`: sensor state and the driver seam
//! - `monitor`: the periodic frame loop
//! - `config`: persisted controller settings

// Module declarations
pub mod config;
pub mod controller;
pub mod error;
pub mod isp;
pub mod monitor;
pub mod sensor;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use error::{AeAwbError, Result};
