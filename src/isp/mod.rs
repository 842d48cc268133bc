//! ISP statistics input
//!
//! The image signal processor summarises every frame as a luminance histogram
//! and chroma sums over near-neutral ("grey") pixels. This module holds the
//! validated snapshot type and the sources that deliver snapshots to the
//! frame loop.
//!
//! # Architecture
//!
//! - `HistogramStats`: one frame of statistics, validated on construction
//! - `StatisticsSource`: per-frame query; failure skips the frame
//! - `ReplaySource`: JSON Lines recordings, used by the CLI and tests

pub mod source;
pub mod stats;

pub use source::{ReplaySource, StatisticsSource};
pub use stats::{H_BINS, HistogramStats, SENSOR_HISTOGRAM_BINS};
