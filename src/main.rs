//! `aeawb` - Auto-exposure and auto-white-balance controller
//!
//! Replays recorded ISP statistics through the controller against a
//! simulated sensor and prints the resulting loop summary.

use aeawb::{
    config::{AppConfig, ConfigManager},
    controller::AeAwbController,
    error::{AeAwbError, get_user_friendly_error},
    isp::ReplaySource,
    monitor::FrameLoop,
    sensor::SimulatedSensor,
    utils,
};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "aeawb")]
#[command(version, about = "Auto-exposure and auto-white-balance controller", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay recorded statistics (JSON Lines) against a simulated sensor
    Replay {
        /// Statistics file, one frame per line
        #[arg(value_name = "STATS")]
        input: PathBuf,

        /// Frame period in milliseconds (0 replays as fast as possible)
        #[arg(long, value_name = "MS")]
        interval_ms: Option<u64>,

        /// Stop after this many frames
        #[arg(long, value_name = "N")]
        max_frames: Option<u64>,

        /// Disable auto-exposure
        #[arg(long)]
        no_ae: bool,

        /// Disable auto-white-balance
        #[arg(long)]
        no_awb: bool,

        /// Log directory (defaults to the configuration directory)
        #[arg(long, value_name = "DIR")]
        log_dir: Option<PathBuf>,
    },

    /// Write the default configuration file
    InitConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Replay {
            input,
            interval_ms,
            max_frames,
            no_ae,
            no_awb,
            log_dir,
        } => {
            let log_dir = log_dir.unwrap_or_else(ConfigManager::get_config_dir);
            utils::init_logging(&log_dir).context("Failed to initialize logging system")?;
            replay(&input, interval_ms, max_frames, no_ae, no_awb)
        }
        Commands::InitConfig => init_config(),
    };

    if let Err(e) = &outcome {
        error!("{:#}", e);
        let message = e
            .downcast_ref::<AeAwbError>()
            .map_or_else(|| format!("{e:#}"), get_user_friendly_error);
        eprintln!("aeawb: {message}");
    }

    outcome
}

/// Run a statistics file through the controller and print the summary as JSON
fn replay(
    input: &Path,
    interval_ms: Option<u64>,
    max_frames: Option<u64>,
    no_ae: bool,
    no_awb: bool,
) -> Result<()> {
    let config = ConfigManager::load().context("Failed to load configuration")?;

    let mut controller_config = config.controller;
    controller_config.auto_exposure_enabled &= !no_ae;
    controller_config.auto_white_balance_enabled &= !no_awb;
    controller_config
        .validate()
        .context("Invalid controller configuration")?;

    let state = config.initial_sensor.to_sensor_state();
    let source = ReplaySource::open(input)
        .with_context(|| format!("Failed to open statistics file {}", input.display()))?;

    info!("Replaying {}", input.display());

    let mut frame_loop = FrameLoop::new(
        AeAwbController::new(controller_config),
        source,
        SimulatedSensor::new(),
        state,
    );
    if let Some(ms) = interval_ms {
        frame_loop = frame_loop.with_interval(Duration::from_millis(ms));
    }
    if let Some(max) = max_frames {
        frame_loop = frame_loop.with_max_frames(max);
    }

    let summary = frame_loop.run();
    let json = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
    println!("{json}");

    if let Some(reason) = summary.source_error {
        bail!("Failed to read statistics from {}: {reason}", input.display());
    }
    Ok(())
}

/// Write the default configuration, leaving an existing file untouched
fn init_config() -> Result<()> {
    let path = ConfigManager::get_config_path();
    if path.exists() {
        println!("Configuration already exists at {}", path.display());
        return Ok(());
    }

    ConfigManager::save(&AppConfig::default()).context("Failed to write configuration")?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
