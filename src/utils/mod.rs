//! Utility modules
//!
//! Provides logging initialization and the numeric helpers used by the control steps.

pub mod logging;
pub mod math;

pub use logging::init_logging;
pub use math::{clamp, sign};
