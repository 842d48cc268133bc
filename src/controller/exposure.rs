//! Histogram-driven exposure adjustment
//!
//! The exposure step looks at the brightest part of the luminance histogram.
//! It keeps roughly 10% of the valid pixels in the top 20 usable bins and at
//! most 0.25% in the top 5 bins:
//!
//! 1. **Saturated**: too many pixels in the top 5 bins. Darken in proportion to
//!    the excess. This always wins over the other branches.
//! 2. **Under target**: fewer than 90% of the target in the top 20 bins. Widen
//!    the bright window downward until it holds the target and brighten by the
//!    ratio of the window positions.
//! 3. **Over target**: more than 110% of the target in the top 20 bins. Shrink
//!    the window from below until it holds no more than the target and darken
//!    by the squared ratio of the window positions.
//! 4. **Hold**: inside the dead-band.
//!
//! The multiplier is bounded to four stops in each direction.

use crate::isp::{H_BINS, HistogramStats};
use crate::sensor::SensorState;
use crate::utils::{clamp, sign};
use serde::Serialize;
use tracing::debug;

/// Width of the window whose pixel count is steered toward the target
pub const BRIGHT_WINDOW_BINS: usize = 20;

/// Width of the window counted as saturated
pub const SATURATED_WINDOW_BINS: usize = 5;

/// Smallest exposure multiplier applied in one frame
pub const MIN_ADJUSTMENT: f32 = 1.0 / 16.0;

/// Largest exposure multiplier applied in one frame
pub const MAX_ADJUSTMENT: f32 = 4.0;

/// Target share of bright pixels is `1 / TARGET_BRIGHT_DIVISOR` (10%)
const TARGET_BRIGHT_DIVISOR: u32 = 10;

/// Saturated share ceiling is `1 / MAX_SATURATED_DIVISOR` (0.25%)
const MAX_SATURATED_DIVISOR: u32 = 400;

/// Bin where the brightening search starts
const UNDER_SEARCH_START: usize = H_BINS - 11;

/// Bin where the darkening search starts
const OVER_SEARCH_START: usize = H_BINS - BRIGHT_WINDOW_BINS;

/// Prefix sums over a luminance histogram, ascending luminance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CumulativeDistribution {
    cdf: Vec<u32>,
}

impl CumulativeDistribution {
    /// Build `cdf[i] = h[0] + ... + h[i]`
    ///
    /// Sums saturate at `u32::MAX`; validated statistics never get there
    /// because their bins add up to at most the valid pixel count.
    pub fn from_histogram(histogram: &[u32]) -> Self {
        let cdf = histogram
            .iter()
            .scan(0u32, |running, &count| {
                *running = running.saturating_add(count);
                Some(*running)
            })
            .collect();
        Self { cdf }
    }

    /// Number of bins
    pub fn len(&self) -> usize {
        self.cdf.len()
    }

    /// Whether the distribution has no bins
    pub fn is_empty(&self) -> bool {
        self.cdf.is_empty()
    }

    /// Pixels counted over all bins
    pub fn total(&self) -> u32 {
        self.cdf.last().copied().unwrap_or(0)
    }

    /// Pixels counted in the topmost `bins` bins
    ///
    /// Covers the whole histogram when `bins` reaches its length.
    pub fn pixels_in_top(&self, bins: usize) -> u32 {
        match self.cdf.len().checked_sub(bins + 1) {
            Some(lower) => self.total() - self.cdf[lower],
            None => self.total(),
        }
    }

    /// Pixels in bin `index`, recovered from the prefix sums
    fn bin(&self, index: usize) -> u32 {
        match index {
            0 => self.cdf[0],
            i => self.cdf[i] - self.cdf[i - 1],
        }
    }

    /// Prefix sums as a slice
    pub fn as_slice(&self) -> &[u32] {
        &self.cdf
    }
}

/// Which rule produced the exposure multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExposureBranch {
    /// Too many saturated pixels
    Saturated,
    /// Too few bright pixels
    UnderTarget,
    /// Too many bright pixels
    OverTarget,
    /// Within the dead-band
    Hold,
}

/// Direction of an exposure change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExposureDirection {
    /// Shorter exposure
    Darken,
    /// Unchanged exposure
    Hold,
    /// Longer exposure
    Brighten,
}

/// Result of the exposure rule for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExposureDecision {
    /// Rule that fired
    pub branch: ExposureBranch,
    /// Pixels in the top [`BRIGHT_WINDOW_BINS`] bins
    pub bright_pixels: u32,
    /// Pixels in the top [`SATURATED_WINDOW_BINS`] bins
    pub saturated_pixels: u32,
    /// Desired bright pixel count
    pub target_bright_pixels: u32,
    /// Allowed saturated pixel count
    pub max_saturated_pixels: u32,
    /// Bin index where the window search stopped, for the searching branches
    pub search_index: Option<usize>,
    /// Multiplier before bounding
    pub raw_adjustment: f32,
    /// Multiplier after bounding to `[MIN_ADJUSTMENT, MAX_ADJUSTMENT]`
    pub adjustment: f32,
}

impl ExposureDecision {
    /// Whether the exposure gets shorter, stays, or gets longer
    pub fn direction(&self) -> ExposureDirection {
        match sign(self.adjustment - 1.0) {
            s if s < 0.0 => ExposureDirection::Darken,
            s if s > 0.0 => ExposureDirection::Brighten,
            _ => ExposureDirection::Hold,
        }
    }
}

/// Run the exposure rule on one frame of statistics
#[expect(
    clippy::cast_precision_loss,
    reason = "Bin indices convert exactly; rounding of pixel counts above 2^24 is far below the dead-band"
)]
pub fn compute_exposure(stats: &HistogramStats) -> ExposureDecision {
    let cdf = CumulativeDistribution::from_histogram(stats.luminance_histogram());
    let valid = stats.valid_luminance_pixel_count();

    let bright_pixels = cdf.pixels_in_top(BRIGHT_WINDOW_BINS);
    let saturated_pixels = cdf.pixels_in_top(SATURATED_WINDOW_BINS);
    let target_bright_pixels = valid / TARGET_BRIGHT_DIVISOR;
    let max_saturated_pixels = valid / MAX_SATURATED_DIVISOR;
    let tolerance = target_bright_pixels / 10;

    // saturated > max_saturated implies at least one valid pixel, so the
    // division below is always defined
    let (branch, search_index, raw_adjustment) = if saturated_pixels > max_saturated_pixels {
        let excess = saturated_pixels - max_saturated_pixels;
        (
            ExposureBranch::Saturated,
            None,
            1.0 - excess as f32 / valid as f32,
        )
    } else if u64::from(bright_pixels) + u64::from(tolerance) < u64::from(target_bright_pixels) {
        let index = search_brighter(&cdf, bright_pixels, target_bright_pixels);
        (
            ExposureBranch::UnderTarget,
            Some(index),
            (UNDER_SEARCH_START + 1) as f32 / (index + 1) as f32,
        )
    } else if bright_pixels.saturating_sub(tolerance) > target_bright_pixels {
        let index = search_darker(&cdf, bright_pixels, target_bright_pixels);
        let ratio = OVER_SEARCH_START as f32 / index as f32;
        (ExposureBranch::OverTarget, Some(index), ratio * ratio)
    } else {
        (ExposureBranch::Hold, None, 1.0)
    };

    let adjustment = clamp(raw_adjustment, MIN_ADJUSTMENT, MAX_ADJUSTMENT);

    debug!(
        "Exposure {:?}: bright {}/{}, saturated {}/{}, adjustment {:.4} (raw {:.4})",
        branch,
        bright_pixels,
        target_bright_pixels,
        saturated_pixels,
        max_saturated_pixels,
        adjustment,
        raw_adjustment
    );

    ExposureDecision {
        branch,
        bright_pixels,
        saturated_pixels,
        target_bright_pixels,
        max_saturated_pixels,
        search_index,
        raw_adjustment,
        adjustment,
    }
}

/// Walk down from [`UNDER_SEARCH_START`], adding one bin per step, until the
/// count reaches `target` or the walk hits bin 0
fn search_brighter(cdf: &CumulativeDistribution, bright_pixels: u32, target: u32) -> usize {
    let target = u64::from(target);
    let mut bright = u64::from(bright_pixels);
    let mut index = UNDER_SEARCH_START;
    while bright < target && index > 0 {
        bright += u64::from(cdf.bin(index));
        index -= 1;
    }
    index
}

/// Walk up from [`OVER_SEARCH_START`], dropping the lowest bin of the window
/// per step, until the count falls to `target` or the walk reaches the top
fn search_darker(cdf: &CumulativeDistribution, bright_pixels: u32, target: u32) -> usize {
    let mut bright = bright_pixels;
    let mut index = OVER_SEARCH_START;
    while bright > target && index < cdf.len() {
        bright = bright.saturating_sub(cdf.bin(index));
        index += 1;
    }
    index
}

/// Set the target exposure from the current exposure and the decision
pub fn apply_exposure(decision: &ExposureDecision, state: &mut SensorState) {
    state.target_exposure = state.real_exposure * decision.adjustment;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::stats_with_bins;

    const TOP_BIN: usize = H_BINS - 1;

    #[test]
    fn test_cumulative_distribution() {
        let cdf = CumulativeDistribution::from_histogram(&[1, 0, 2, 3]);
        assert_eq!(cdf.as_slice(), &[1, 1, 3, 6]);
        assert_eq!(cdf.len(), 4);
        assert_eq!(cdf.total(), 6);
        assert_eq!(cdf.pixels_in_top(2), 5);
        assert_eq!(cdf.pixels_in_top(4), 6);
        assert_eq!(cdf.bin(0), 1);
        assert_eq!(cdf.bin(2), 2);
    }

    #[test]
    fn test_empty_cumulative_distribution() {
        let cdf = CumulativeDistribution::from_histogram(&[]);
        assert!(cdf.is_empty());
        assert_eq!(cdf.total(), 0);
        assert_eq!(cdf.pixels_in_top(5), 0);
    }

    #[test]
    fn test_uniform_histogram_saturates() {
        let bins: Vec<(usize, u32)> = (0..H_BINS).map(|bin| (bin, 1)).collect();
        let stats = stats_with_bins(&bins, 246);

        let decision = compute_exposure(&stats);

        assert_eq!(decision.branch, ExposureBranch::Saturated);
        assert_eq!(decision.saturated_pixels, 5);
        assert_eq!(decision.max_saturated_pixels, 0);
        assert!((decision.adjustment - (1.0 - 5.0 / 246.0)).abs() < 1e-6);
        assert!((decision.adjustment - 0.9797).abs() < 1e-4);
        assert_eq!(decision.direction(), ExposureDirection::Darken);
    }

    #[test]
    fn test_full_saturation_hits_lower_bound() {
        let stats = stats_with_bins(&[(TOP_BIN, 10_000)], 10_000);

        let decision = compute_exposure(&stats);

        assert_eq!(decision.branch, ExposureBranch::Saturated);
        assert_eq!(decision.saturated_pixels, 10_000);
        assert!(decision.raw_adjustment < MIN_ADJUSTMENT);
        assert!((decision.adjustment - MIN_ADJUSTMENT).abs() < f32::EPSILON);
    }

    #[test]
    fn test_saturation_takes_precedence_over_bright_target() {
        // Bright count far below target, but the top bins hold too many pixels
        let stats = stats_with_bins(&[(0, 99_000), (TOP_BIN, 1_000)], 100_000);

        let decision = compute_exposure(&stats);

        assert_eq!(decision.branch, ExposureBranch::Saturated);
        let expected = 1.0 - (1_000.0 - 250.0) / 100_000.0;
        assert!((decision.adjustment - expected).abs() < 1e-6);
    }

    #[test]
    fn test_under_target_widens_window() {
        let stats = stats_with_bins(&[(100, 1_000)], 1_000);

        let decision = compute_exposure(&stats);

        assert_eq!(decision.branch, ExposureBranch::UnderTarget);
        assert_eq!(decision.search_index, Some(99));
        assert!((decision.adjustment - 236.0 / 100.0).abs() < 1e-6);
        assert_eq!(decision.direction(), ExposureDirection::Brighten);
    }

    #[test]
    fn test_under_target_search_stops_at_bin_zero() {
        let stats = stats_with_bins(&[(0, 1_000)], 1_000);

        let decision = compute_exposure(&stats);

        assert_eq!(decision.branch, ExposureBranch::UnderTarget);
        assert_eq!(decision.search_index, Some(0));
        assert!((decision.raw_adjustment - 236.0).abs() < f32::EPSILON);
        assert!((decision.adjustment - MAX_ADJUSTMENT).abs() < f32::EPSILON);
    }

    #[test]
    fn test_under_target_recounts_bins_inside_window() {
        // 60 pixels already inside the bright window; the walk starts inside the
        // window and counts bin 230 a second time
        let stats = stats_with_bins(&[(0, 940), (230, 60)], 1_000);

        let decision = compute_exposure(&stats);

        assert_eq!(decision.branch, ExposureBranch::UnderTarget);
        assert_eq!(decision.bright_pixels, 60);
        assert_eq!(decision.search_index, Some(229));
        assert!((decision.adjustment - 236.0 / 230.0).abs() < 1e-6);
    }

    #[test]
    fn test_over_target_shrinks_window_with_speedup() {
        let stats = stats_with_bins(&[(0, 500), (230, 500)], 1_000);

        let decision = compute_exposure(&stats);

        assert_eq!(decision.branch, ExposureBranch::OverTarget);
        assert_eq!(decision.search_index, Some(231));
        let expected = (226.0_f32 / 231.0).powi(2);
        assert!((decision.adjustment - expected).abs() < 1e-6);
    }

    #[test]
    fn test_over_target_walks_to_highest_unsaturated_bin() {
        // Bright pixels sit just below the saturated window
        let stats = stats_with_bins(&[(0, 500), (H_BINS - 6, 500)], 1_000);

        let decision = compute_exposure(&stats);

        assert_eq!(decision.branch, ExposureBranch::OverTarget);
        assert_eq!(decision.saturated_pixels, 0);
        assert_eq!(decision.search_index, Some(H_BINS - 5));
        let expected = (226.0_f32 / 241.0).powi(2);
        assert!((decision.adjustment - expected).abs() < 1e-6);
    }

    #[test]
    fn test_dead_band_holds_exposure() {
        let stats = stats_with_bins(&[(0, 90_000), (235, 10_000)], 100_000);
        let mut state = SensorState::new(20.0, 2.0, 2.0);

        let decision = compute_exposure(&stats);
        apply_exposure(&decision, &mut state);

        assert_eq!(decision.branch, ExposureBranch::Hold);
        assert!((decision.adjustment - 1.0).abs() < f32::EPSILON);
        assert_eq!(decision.direction(), ExposureDirection::Hold);
        assert!((state.target_exposure - state.real_exposure).abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_frame_holds() {
        let stats = stats_with_bins(&[], 0);
        let decision = compute_exposure(&stats);
        assert_eq!(decision.branch, ExposureBranch::Hold);
        assert!((decision.adjustment - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_apply_exposure_scales_real_exposure() {
        let stats = stats_with_bins(&[(100, 1_000)], 1_000);
        let mut state = SensorState::new(10.0, 2.0, 2.0);

        let decision = compute_exposure(&stats);
        apply_exposure(&decision, &mut state);

        assert!((state.target_exposure - 23.6).abs() < 1e-4);
        assert!((state.real_exposure - 10.0).abs() < f32::EPSILON);
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "Generated pixel counts are small and non-negative"
    )]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn histogram_strategy() -> impl Strategy<Value = (Vec<u32>, u32)> {
            (prop::collection::vec(0u32..2_000, H_BINS), 0u32..100_000)
        }

        fn stats_from(histogram: Vec<u32>, extra: u32) -> HistogramStats {
            let valid = histogram.iter().sum::<u32>() + extra;
            HistogramStats::new(histogram, valid, 0, 0, 1).unwrap()
        }

        proptest! {
            /// Property: the applied multiplier is always within four stops
            #[test]
            fn adjustment_is_bounded((histogram, extra) in histogram_strategy()) {
                let decision = compute_exposure(&stats_from(histogram, extra));
                prop_assert!(decision.adjustment >= MIN_ADJUSTMENT);
                prop_assert!(decision.adjustment <= MAX_ADJUSTMENT);
            }

            /// Property: saturation always selects the saturation formula
            #[test]
            fn saturation_takes_precedence((histogram, extra) in histogram_strategy()) {
                let stats = stats_from(histogram, extra);
                let decision = compute_exposure(&stats);
                if decision.saturated_pixels > decision.max_saturated_pixels {
                    let valid = stats.valid_luminance_pixel_count() as f32;
                    let excess = (decision.saturated_pixels - decision.max_saturated_pixels) as f32;
                    prop_assert_eq!(decision.branch, ExposureBranch::Saturated);
                    prop_assert_eq!(
                        decision.adjustment,
                        clamp(1.0 - excess / valid, MIN_ADJUSTMENT, MAX_ADJUSTMENT)
                    );
                } else {
                    prop_assert_ne!(decision.branch, ExposureBranch::Saturated);
                }
            }

            /// Property: inside the dead-band the exposure is left alone
            #[test]
            fn dead_band_is_idempotent(valid in 1_000u32..1_000_000, offset in -1.0f64..1.0) {
                let target = valid / 10;
                let tolerance = target / 10;
                let bright = (f64::from(target) + offset * f64::from(tolerance)).round() as u32;
                let stats = stats_with_bins(&[(0, valid - bright), (235, bright)], valid);
                let mut state = SensorState::new(17.0, 2.0, 2.0);

                let decision = compute_exposure(&stats);
                apply_exposure(&decision, &mut state);

                prop_assert_eq!(decision.branch, ExposureBranch::Hold);
                prop_assert_eq!(state.target_exposure, state.real_exposure);
            }

            /// Property: more saturated pixels at a fixed valid count darken more
            #[test]
            fn saturation_is_monotonic(low in 251u32..50_000, step in 1u32..50_000) {
                let valid = 100_000;
                let high = low + step;
                let less = compute_exposure(&stats_with_bins(&[(0, valid - low), (H_BINS - 1, low)], valid));
                let more = compute_exposure(&stats_with_bins(&[(0, valid - high), (H_BINS - 1, high)], valid));

                prop_assert!(more.raw_adjustment < less.raw_adjustment);
                prop_assert!(more.adjustment <= less.adjustment);
            }
        }
    }
}
