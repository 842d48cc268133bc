#![expect(
    clippy::unwrap_used,
    reason = "Test utilities use .unwrap() for brevity"
)]

//! Shared test utilities for unit tests.
//!
//! This module provides common test infrastructure used across multiple test modules.
//! It is only compiled during testing (`#[cfg(test)]`).

use crate::config::HOME_ENV_VAR;
use crate::error::{AeAwbError, Result, StringError};
use crate::isp::{H_BINS, HistogramStats};
use crate::sensor::{SensorDriver, SensorState};
use std::sync::Mutex;
use tempfile::TempDir;

/// Global mutex to serialize tests that modify the `AEAWB_HOME` environment variable.
static HOME_LOCK: Mutex<()> = Mutex::new(());

/// Helper function to create a temporary test directory using tempfile.
/// Returns a `TempDir` that automatically cleans up when dropped.
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// RAII guard that points `AEAWB_HOME` at a temp directory for a test scope
/// and restores the original value when dropped.
///
/// # Safety Considerations
///
/// `std::env::set_var` and `std::env::remove_var` are unsafe because other
/// threads may read the environment concurrently. `HOME_LOCK` is held for the
/// lifetime of the guard, so only one test touches the variable at a time, and
/// the original value is restored on drop even if the test panics.
pub struct HomeGuard {
    original: Option<std::ffi::OsString>,
    // Held for the lifetime of the guard
    _lock: std::sync::MutexGuard<'static, ()>,
}

#[expect(
    unsafe_code,
    reason = "Test-only code that modifies environment variables under a global lock"
)]
impl HomeGuard {
    /// Create a new guard that sets `AEAWB_HOME` to the given temp directory path.
    pub fn new(temp_dir: &TempDir) -> Self {
        // A panicking test poisons the lock; the guarded data is `()`, so recover it
        let lock = HOME_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let original = std::env::var_os(HOME_ENV_VAR);
        // SAFETY: HOME_LOCK serializes all writers; see struct-level documentation.
        unsafe {
            std::env::set_var(HOME_ENV_VAR, temp_dir.path());
        }
        Self {
            original,
            _lock: lock,
        }
    }
}

#[expect(
    unsafe_code,
    reason = "Test-only code that restores environment variables under a global lock"
)]
impl Drop for HomeGuard {
    fn drop(&mut self) {
        // SAFETY: the lock is still held by this guard; see struct-level documentation.
        if let Some(ref original) = self.original {
            unsafe {
                std::env::set_var(HOME_ENV_VAR, original);
            }
        } else {
            unsafe {
                std::env::remove_var(HOME_ENV_VAR);
            }
        }
    }
}

/// One commit observed by [`RecordingDriver`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Commit {
    /// Exposure commit with the target exposure
    Exposure(f32),
    /// Gain commit with (red, blue)
    Gains(f32, f32),
}

/// Driver that records every commit and applies exposure targets verbatim
#[derive(Debug, Default)]
pub struct RecordingDriver {
    /// Commits in the order received
    pub commits: Vec<Commit>,
    /// Reject every commit when set
    pub fail: bool,
}

impl RecordingDriver {
    /// Driver that rejects all commits
    pub fn failing() -> Self {
        Self {
            commits: Vec::new(),
            fail: true,
        }
    }

    /// Number of exposure commits recorded
    pub fn exposure_commits(&self) -> usize {
        self.commits
            .iter()
            .filter(|c| matches!(c, Commit::Exposure(_)))
            .count()
    }

    /// Number of gain commits recorded
    pub fn gain_commits(&self) -> usize {
        self.commits
            .iter()
            .filter(|c| matches!(c, Commit::Gains(..)))
            .count()
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            Err(AeAwbError::SensorCommitFailed(StringError::new(
                "sensor offline",
            )))
        } else {
            Ok(())
        }
    }
}

impl SensorDriver for RecordingDriver {
    fn commit_exposure(&mut self, state: &mut SensorState) -> Result<()> {
        self.check()?;
        self.commits.push(Commit::Exposure(state.target_exposure));
        state.real_exposure = state.target_exposure;
        Ok(())
    }

    fn commit_gains(&mut self, state: &mut SensorState) -> Result<()> {
        self.check()?;
        self.commits
            .push(Commit::Gains(state.gain_red, state.gain_blue));
        Ok(())
    }
}

/// Chroma sum for `grey` pixels averaging `value` on the [0, 255] sensor scale
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "Test inputs are non-negative and far below u64::MAX"
)]
pub fn chroma_sum(value: f64, grey: u32) -> u64 {
    (value * 256.0 * f64::from(grey)).round() as u64
}

/// Statistics with the given bins set, neutral chroma, and `valid` total pixels
///
/// Pixels not placed in `bins` are treated as valid but outside the histogram.
pub fn stats_with_bins(bins: &[(usize, u32)], valid: u32) -> HistogramStats {
    let mut histogram = vec![0; H_BINS];
    for &(bin, count) in bins {
        histogram[bin] += count;
    }
    HistogramStats::new(histogram, valid, chroma_sum(0.5, 100), chroma_sum(0.5, 100), 100).unwrap()
}

/// Statistics with a flat histogram and the given chroma sums
pub fn stats_with_chroma(u_sum: u64, v_sum: u64, grey: u32) -> HistogramStats {
    HistogramStats::new(vec![0; H_BINS], 0, u_sum, v_sum, grey).unwrap()
}
