//! Grey-world white balance from ISP chroma sums
//!
//! The ISP sums U and V over pixels it considers neutral. For a balanced
//! image both averages sit at mid-scale; the offset from mid-scale drives a
//! unit-gain proportional correction of the blue gain (from U) and the red
//! gain (from V).

use crate::isp::HistogramStats;
use crate::sensor::SensorState;
use crate::utils::clamp;
use serde::Serialize;
use tracing::debug;

/// Offsets at or below this magnitude leave the gain alone
pub const WB_THRESHOLD: f32 = 0.002;

/// Proportional gain of the correction
const WB_GAIN: f32 = 1.0;

/// Chroma averages over grey pixels, rescaled to be centred on zero
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChromaAverages {
    /// Mean U offset (blue-difference)
    pub u: f32,
    /// Mean V offset (red-difference)
    pub v: f32,
}

/// What the white-balance step did in one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WhiteBalanceOutcome {
    /// Averages used, `None` when the frame had no grey pixels
    pub averages: Option<ChromaAverages>,
    /// Amount subtracted from the blue gain before bounding
    pub blue_correction: Option<f32>,
    /// Amount subtracted from the red gain before bounding
    pub red_correction: Option<f32>,
    /// Whether the gains were handed to the sensor driver
    pub committed: bool,
}

impl WhiteBalanceOutcome {
    /// Whether either gain was corrected
    pub fn changed(&self) -> bool {
        self.blue_correction.is_some() || self.red_correction.is_some()
    }
}

/// Average chroma per grey pixel, mapped from the [0, 255] sensor scale to
/// roughly [-0.5, 0.5]
///
/// Returns `None` when no grey pixels were found, which leaves the averages
/// undefined.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    reason = "Averages are computed in f32 like the sensor firmware; the result lies in [-0.5, 0.5]"
)]
pub fn chroma_averages(stats: &HistogramStats) -> Option<ChromaAverages> {
    let grey = stats.grey_pixel_count();
    if grey == 0 {
        return None;
    }

    let average = |sum: u64| {
        let per_pixel = sum as f32 / grey as f32;
        (f64::from(per_pixel) / 256.0 - 0.5) as f32
    };

    Some(ChromaAverages {
        u: average(stats.chroma_u_sum()),
        v: average(stats.chroma_v_sum()),
    })
}

/// Correct the gains in `state` from the chroma averages
///
/// Each channel outside the dead-band is corrected independently. When either
/// changed, both gains are bounded to `[gain_min, gain_max]`. The returned
/// outcome has `committed == false`; committing is up to the caller.
pub fn apply_white_balance(
    averages: Option<ChromaAverages>,
    state: &mut SensorState,
    gain_min: f32,
    gain_max: f32,
) -> WhiteBalanceOutcome {
    let mut outcome = WhiteBalanceOutcome {
        averages,
        blue_correction: None,
        red_correction: None,
        committed: false,
    };

    let Some(ChromaAverages { u, v }) = averages else {
        debug!("No grey pixels in frame, skipping white balance");
        return outcome;
    };

    if u.abs() > WB_THRESHOLD {
        let correction = WB_GAIN * u;
        state.gain_blue -= correction;
        outcome.blue_correction = Some(correction);
    }
    if v.abs() > WB_THRESHOLD {
        let correction = WB_GAIN * v;
        state.gain_red -= correction;
        outcome.red_correction = Some(correction);
    }

    if outcome.changed() {
        state.gain_blue = clamp(state.gain_blue, gain_min, gain_max);
        state.gain_red = clamp(state.gain_red, gain_min, gain_max);
        debug!(
            "White balance: avgU {:.4}, avgV {:.4} -> gains red {:.4}, blue {:.4}",
            u, v, state.gain_red, state.gain_blue
        );
    } else {
        debug!("White balance within dead-band: avgU {:.4}, avgV {:.4}", u, v);
    }

    outcome
}
