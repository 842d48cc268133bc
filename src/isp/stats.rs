//! Per-frame ISP statistics snapshot
//!
//! The ISP reports a 256-bin luminance histogram plus chroma sums over the
//! pixels it classified as grey. Only the lower [`H_BINS`] bins are usable;
//! the topmost bins sit next to the clipping point and are ignored.

use crate::error::{AeAwbError, Result};
use serde::{Deserialize, Serialize};

/// Number of bins in the histogram produced by the sensor
pub const SENSOR_HISTOGRAM_BINS: usize = 256;

/// Number of usable luminance bins (the 10 topmost sensor bins are dropped)
pub const H_BINS: usize = SENSOR_HISTOGRAM_BINS - 10;

/// Statistics for one frame, validated on construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StatsRecord", into = "StatsRecord")]
pub struct HistogramStats {
    luminance_histogram: Vec<u32>,
    valid_luminance_pixel_count: u32,
    chroma_u_sum: u64,
    chroma_v_sum: u64,
    grey_pixel_count: u32,
}

/// Wire form of [`HistogramStats`], checked before it becomes one
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StatsRecord {
    luminance_histogram: Vec<u32>,
    valid_luminance_pixel_count: u32,
    chroma_u_sum: u64,
    chroma_v_sum: u64,
    grey_pixel_count: u32,
}

impl HistogramStats {
    /// Build a snapshot from raw ISP values
    ///
    /// Accepts either exactly [`H_BINS`] bins or a full
    /// [`SENSOR_HISTOGRAM_BINS`] sensor histogram, in which case the topmost
    /// bins are discarded.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStatistics` for any other histogram length, or when the
    /// usable bins count more pixels than `valid_luminance_pixel_count`.
    pub fn new(
        mut luminance_histogram: Vec<u32>,
        valid_luminance_pixel_count: u32,
        chroma_u_sum: u64,
        chroma_v_sum: u64,
        grey_pixel_count: u32,
    ) -> Result<Self> {
        match luminance_histogram.len() {
            H_BINS => {}
            SENSOR_HISTOGRAM_BINS => luminance_histogram.truncate(H_BINS),
            len => {
                return Err(AeAwbError::InvalidStatistics(format!(
                    "histogram has {len} bins, expected {H_BINS} or {SENSOR_HISTOGRAM_BINS}"
                )));
            }
        }

        let counted: u64 = luminance_histogram.iter().map(|&c| u64::from(c)).sum();
        if counted > u64::from(valid_luminance_pixel_count) {
            return Err(AeAwbError::InvalidStatistics(format!(
                "histogram counts {counted} pixels but only {valid_luminance_pixel_count} are valid"
            )));
        }

        Ok(Self {
            luminance_histogram,
            valid_luminance_pixel_count,
            chroma_u_sum,
            chroma_v_sum,
            grey_pixel_count,
        })
    }

    /// Usable luminance bins, ascending luminance, always [`H_BINS`] long
    pub fn luminance_histogram(&self) -> &[u32] {
        &self.luminance_histogram
    }

    /// Total number of pixels that contributed to the luminance histogram
    pub fn valid_luminance_pixel_count(&self) -> u32 {
        self.valid_luminance_pixel_count
    }

    /// Sum of the U (blue-difference) channel over grey pixels
    pub fn chroma_u_sum(&self) -> u64 {
        self.chroma_u_sum
    }

    /// Sum of the V (red-difference) channel over grey pixels
    pub fn chroma_v_sum(&self) -> u64 {
        self.chroma_v_sum
    }

    /// Number of pixels contributing to the chroma sums
    pub fn grey_pixel_count(&self) -> u32 {
        self.grey_pixel_count
    }
}

impl TryFrom<StatsRecord> for HistogramStats {
    type Error = AeAwbError;

    fn try_from(record: StatsRecord) -> Result<Self> {
        Self::new(
            record.luminance_histogram,
            record.valid_luminance_pixel_count,
            record.chroma_u_sum,
            record.chroma_v_sum,
            record.grey_pixel_count,
        )
    }
}

impl From<HistogramStats> for StatsRecord {
    fn from(stats: HistogramStats) -> Self {
        Self {
            luminance_histogram: stats.luminance_histogram,
            valid_luminance_pixel_count: stats.valid_luminance_pixel_count,
            chroma_u_sum: stats.chroma_u_sum,
            chroma_v_sum: stats.chroma_v_sum,
            grey_pixel_count: stats.grey_pixel_count,
        }
    }
}
