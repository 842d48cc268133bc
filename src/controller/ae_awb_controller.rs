//! Per-frame AE/AWB controller
//!
//! This module combines the exposure and white-balance steps into the single
//! operation the frame loop calls once per frame.

use crate::config::ControllerConfig;
use crate::controller::exposure::{ExposureDecision, apply_exposure, compute_exposure};
use crate::controller::white_balance::{WhiteBalanceOutcome, apply_white_balance, chroma_averages};
use crate::isp::HistogramStats;
use crate::sensor::{SensorDriver, SensorState};
use serde::Serialize;
use tracing::{debug, warn};

/// What the exposure step did in one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExposureOutcome {
    /// Decision taken from the histogram
    pub decision: ExposureDecision,
    /// Exposure handed to the driver
    pub target_exposure: f32,
    /// Whether the driver accepted the commit
    pub committed: bool,
}

/// Everything the controller did for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameReport {
    /// Exposure step result, `None` when auto-exposure is disabled
    pub exposure: Option<ExposureOutcome>,
    /// White-balance step result, `None` when auto-white-balance is disabled
    pub white_balance: Option<WhiteBalanceOutcome>,
}

/// Auto-exposure and auto-white-balance controller
///
/// Stateless between frames: everything carried over lives in the
/// [`SensorState`] passed to [`AeAwbController::process_frame`].
#[derive(Debug, Clone)]
pub struct AeAwbController {
    config: ControllerConfig,
}

impl AeAwbController {
    /// Create a controller with the given toggles and gain bounds
    pub fn new(config: ControllerConfig) -> Self {
        Self { config }
    }

    /// Controller configuration
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Process one frame of statistics
    ///
    /// The exposure step commits on every frame it runs, even when the
    /// exposure is unchanged. The white-balance step commits both gains in one
    /// call, and only when at least one of them was corrected. Driver failures
    /// are logged and reported as `committed == false`.
    pub fn process_frame<D>(
        &self,
        stats: &HistogramStats,
        state: &mut SensorState,
        driver: &mut D,
    ) -> FrameReport
    where
        D: SensorDriver + ?Sized,
    {
        let exposure = self
            .config
            .auto_exposure_enabled
            .then(|| Self::run_exposure(stats, state, driver));

        let white_balance = self
            .config
            .auto_white_balance_enabled
            .then(|| self.run_white_balance(stats, state, driver));

        FrameReport {
            exposure,
            white_balance,
        }
    }

    fn run_exposure<D>(
        stats: &HistogramStats,
        state: &mut SensorState,
        driver: &mut D,
    ) -> ExposureOutcome
    where
        D: SensorDriver + ?Sized,
    {
        let decision = compute_exposure(stats);
        apply_exposure(&decision, state);
        let target_exposure = state.target_exposure;

        let committed = match driver.commit_exposure(state) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to commit exposure {:.4}: {}", target_exposure, e);
                false
            }
        };

        ExposureOutcome {
            decision,
            target_exposure,
            committed,
        }
    }

    fn run_white_balance<D>(
        &self,
        stats: &HistogramStats,
        state: &mut SensorState,
        driver: &mut D,
    ) -> WhiteBalanceOutcome
    where
        D: SensorDriver + ?Sized,
    {
        let mut outcome = apply_white_balance(
            chroma_averages(stats),
            state,
            self.config.gain_min,
            self.config.gain_max,
        );

        if outcome.changed() {
            match driver.commit_gains(state) {
                Ok(()) => outcome.committed = true,
                Err(e) => warn!(
                    "Failed to commit gains (red {:.4}, blue {:.4}): {}",
                    state.gain_red, state.gain_blue, e
                ),
            }
        } else {
            debug!("Gains unchanged, no gain commit");
        }

        outcome
    }
}

impl Default for AeAwbController {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}
