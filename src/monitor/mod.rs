//! Frame scheduling module
//!
//! This module runs the controller periodically against a statistics source.
//!
//! # Overview
//!
//! The frame loop provides:
//! - **Periodic polling** of the statistics source at the configured frame interval
//! - **Frame skipping** when no valid statistics are available
//! - **Clean shutdown** through a stop flag, an optional frame limit, or source exhaustion
//! - **Running totals** shared with other threads through a `parking_lot::Mutex`
//!
//! # Architecture
//!
//! - `FrameLoop`: owns the source, the driver and the sensor state; runs inline or on a thread
//! - `FrameLoopHandle`: stop, inspect and join a loop started with `FrameLoop::start`
//! - `LoopSummary`: frame and commit counters plus the latest state and report
//!
//! # Example Usage
//!
//! ```no_run
//! use aeawb::controller::AeAwbController;
//! use aeawb::isp::ReplaySource;
//! use aeawb::monitor::FrameLoop;
//! use aeawb::sensor::{SensorState, SimulatedSensor};
//! use std::path::Path;
//!
//! let source = ReplaySource::open(Path::new("stats.jsonl")).unwrap();
//! let mut frame_loop = FrameLoop::new(
//!     AeAwbController::default(),
//!     source,
//!     SimulatedSensor::new(),
//!     SensorState::default(),
//! );
//!
//! let summary = frame_loop.run();
//! println!("{} frames processed", summary.frames_processed);
//! ```

pub mod frame_loop;

pub use frame_loop::{FrameLoop, FrameLoopHandle, LoopSummary};
