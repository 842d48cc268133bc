//! Error types for the AE/AWB controller
//!
//! This module defines all error types used throughout the crate,
//! providing clear error messages and proper error propagation.
//!
//! Only one failure is part of the per-frame control flow: statistics that are
//! unavailable for the current frame. Everything else is either a setup error
//! (configuration, logging, input files) or a sensor commit failure that the
//! frame loop logs and absorbs.

use thiserror::Error;

/// Simple error type for wrapping string messages while implementing `std::error::Error`
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StringError(pub String);

impl StringError {
    /// Create a new `StringError` from a string message
    pub fn new(msg: impl Into<String>) -> Box<Self> {
        Box::new(Self(msg.into()))
    }
}

/// Main error type for the AE/AWB controller
#[derive(Debug, Error)]
pub enum AeAwbError {
    /// The ISP did not deliver valid statistics for this frame
    #[error("Statistics unavailable for this frame")]
    StatisticsUnavailable,

    /// The statistics source has no more frames to deliver
    #[error("Statistics source exhausted")]
    SourceExhausted,

    /// A statistics snapshot violated its structural invariants
    #[error("Invalid statistics: {0}")]
    InvalidStatistics(String),

    /// The sensor driver rejected an exposure or gain commit
    /// Preserves the underlying error source for full error chain transparency
    #[error("Sensor commit failed: {0}")]
    SensorCommitFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Configuration error
    /// Preserves the underlying error source for full error chain transparency
    #[error("Configuration error: {0}")]
    ConfigError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for AE/AWB operations
pub type Result<T> = std::result::Result<T, AeAwbError>;

/// Convert an error to a user-friendly message
///
/// Used by the command-line front end when a run cannot start or aborts.
pub fn get_user_friendly_error(error: &AeAwbError) -> String {
    match error {
        AeAwbError::StatisticsUnavailable => "The ISP did not report statistics for a frame.\n\n\
             The controller skips such frames and retries on the next one."
            .to_string(),
        AeAwbError::SourceExhausted => "The statistics source has no more frames.".to_string(),
        AeAwbError::InvalidStatistics(reason) => {
            format!(
                "A statistics snapshot is malformed:\n\n{reason}\n\n\
                 Histograms must carry 246 usable bins (or a full 256-bin sensor histogram)\n\
                 and may not count more pixels than the valid pixel total."
            )
        }
        AeAwbError::SensorCommitFailed(e) => {
            format!(
                "The sensor driver rejected an update:\n\n{e}\n\n\
                 Check the sensor connection and driver state."
            )
        }
        AeAwbError::ConfigError(e) => {
            format!(
                "Failed to load or save configuration:\n\n{e}\n\n\
                 Check that AEAWB_HOME points to a writable directory."
            )
        }
        AeAwbError::IoError(e) => {
            format!(
                "A file system error occurred:\n\n{e}\n\n\
                 Please check file paths and permissions."
            )
        }
        AeAwbError::JsonError(e) => {
            format!(
                "A JSON document could not be parsed:\n\n{e}\n\n\
                 Default settings are used for corrupt configuration files."
            )
        }
    }
}
