//! Periodic frame loop
//!
//! Polls a statistics source once per frame period, runs the controller and
//! commits through the sensor driver. Frames without valid statistics are
//! skipped; the loop simply tries again on the next period.

use crate::controller::{AeAwbController, FrameReport};
use crate::error::AeAwbError;
use crate::isp::StatisticsSource;
use crate::sensor::{SensorDriver, SensorState};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Running totals of a frame loop
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoopSummary {
    /// Frames with valid statistics that went through the controller
    pub frames_processed: u64,
    /// Frame periods skipped for lack of valid statistics
    pub frames_skipped: u64,
    /// Exposure commits accepted by the driver
    pub exposure_commits: u64,
    /// Gain commits accepted by the driver
    pub gain_commits: u64,
    /// Sensor state after the most recent frame
    pub sensor_state: Option<SensorState>,
    /// Report of the most recent processed frame
    pub last_report: Option<FrameReport>,
    /// Read failure that ended the loop, if any
    pub source_error: Option<String>,
}

impl LoopSummary {
    /// Frame periods seen, processed or skipped
    pub fn frames_seen(&self) -> u64 {
        self.frames_processed + self.frames_skipped
    }

    fn record(&mut self, report: FrameReport, state: SensorState) {
        self.frames_processed += 1;
        if report.exposure.is_some_and(|e| e.committed) {
            self.exposure_commits += 1;
        }
        if report.white_balance.is_some_and(|wb| wb.committed) {
            self.gain_commits += 1;
        }
        self.sensor_state = Some(state);
        self.last_report = Some(report);
    }
}

/// Drives the controller at frame rate
///
/// Owns the statistics source, the sensor driver and the sensor state, so the
/// controller always has exclusive access to the state while a frame is
/// processed. Other threads only see the stop flag and the summary.
pub struct FrameLoop<S, D> {
    controller: AeAwbController,
    source: S,
    driver: D,
    state: SensorState,
    interval: Duration,
    max_frames: Option<u64>,
    stop: Arc<AtomicBool>,
    summary: Arc<Mutex<LoopSummary>>,
}

impl<S, D> FrameLoop<S, D>
where
    S: StatisticsSource,
    D: SensorDriver,
{
    /// Create a frame loop; the interval comes from the controller configuration
    pub fn new(controller: AeAwbController, source: S, driver: D, state: SensorState) -> Self {
        let interval = controller.config().frame_interval();
        Self {
            controller,
            source,
            driver,
            state,
            interval,
            max_frames: None,
            stop: Arc::new(AtomicBool::new(false)),
            summary: Arc::new(Mutex::new(LoopSummary::default())),
        }
    }

    /// Override the frame period (`Duration::ZERO` runs as fast as frames arrive)
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Stop after this many frame periods
    #[must_use]
    pub fn with_max_frames(mut self, max_frames: u64) -> Self {
        self.max_frames = Some(max_frames);
        self
    }

    /// Flag that stops the loop at the next frame boundary when set
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Shared summary, updated after every frame period
    pub fn summary_ref(&self) -> Arc<Mutex<LoopSummary>> {
        Arc::clone(&self.summary)
    }

    /// Current sensor state
    pub fn sensor_state(&self) -> SensorState {
        self.state
    }

    /// Sensor driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Run one frame period without sleeping
    ///
    /// Returns `false` once the source is exhausted or can no longer be read.
    /// Read failures repeat on every call, so they end the loop instead of
    /// being skipped like a frame without statistics.
    pub fn step(&mut self) -> bool {
        match self.source.fetch_statistics() {
            Ok(stats) => {
                let report = self
                    .controller
                    .process_frame(&stats, &mut self.state, &mut self.driver);
                self.summary.lock().record(report, self.state);
                true
            }
            Err(AeAwbError::SourceExhausted) => {
                debug!("Statistics source exhausted");
                false
            }
            Err(AeAwbError::StatisticsUnavailable) => {
                debug!("No valid statistics this frame, skipping");
                self.summary.lock().frames_skipped += 1;
                true
            }
            Err(AeAwbError::IoError(e)) => {
                error!("Statistics source failed: {}", e);
                self.summary.lock().source_error = Some(e.to_string());
                false
            }
            Err(e) => {
                warn!("Skipping frame: {}", e);
                self.summary.lock().frames_skipped += 1;
                true
            }
        }
    }

    /// Run until the source is exhausted, the stop flag is set, or the frame
    /// limit is reached
    pub fn run(&mut self) -> LoopSummary {
        info!(
            "Frame loop started (interval {:?}, AE {}, AWB {})",
            self.interval,
            self.controller.config().auto_exposure_enabled,
            self.controller.config().auto_white_balance_enabled
        );

        loop {
            if self.stop.load(Ordering::SeqCst) {
                info!("Frame loop stop requested");
                break;
            }
            if self
                .max_frames
                .is_some_and(|max| self.summary.lock().frames_seen() >= max)
            {
                info!("Frame limit reached");
                break;
            }
            if !self.step() {
                break;
            }
            if !self.interval.is_zero() {
                thread::sleep(self.interval);
            }
        }

        let summary = self.summary.lock().clone();
        info!(
            "Frame loop finished: {} processed, {} skipped, {} exposure commits, {} gain commits",
            summary.frames_processed,
            summary.frames_skipped,
            summary.exposure_commits,
            summary.gain_commits
        );
        summary
    }
}

impl<S, D> FrameLoop<S, D>
where
    S: StatisticsSource + Send + 'static,
    D: SensorDriver + Send + 'static,
{
    /// Run the loop on a background thread
    pub fn start(mut self) -> FrameLoopHandle {
        let stop = self.stop_flag();
        let summary = self.summary_ref();
        let join = thread::spawn(move || self.run());
        FrameLoopHandle {
            stop,
            summary,
            join,
        }
    }
}

/// Handle to a frame loop running on its own thread
pub struct FrameLoopHandle {
    stop: Arc<AtomicBool>,
    summary: Arc<Mutex<LoopSummary>>,
    join: JoinHandle<LoopSummary>,
}

impl FrameLoopHandle {
    /// Ask the loop to stop at the next frame boundary
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Snapshot of the running totals
    pub fn summary(&self) -> LoopSummary {
        self.summary.lock().clone()
    }

    /// Whether the loop thread has exited
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the loop to exit and return its final summary
    pub fn join(self) -> std::thread::Result<LoopSummary> {
        self.join.join()
    }
}
