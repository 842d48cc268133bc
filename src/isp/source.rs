//! Statistics sources
//!
//! A [`StatisticsSource`] is queried once per frame. Returning
//! `Err(AeAwbError::StatisticsUnavailable)` tells the frame loop to skip the
//! frame; `Err(AeAwbError::SourceExhausted)` ends the loop.

use crate::error::{AeAwbError, Result};
use crate::isp::HistogramStats;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Producer of per-frame ISP statistics
pub trait StatisticsSource {
    /// Fetch the statistics for the current frame
    fn fetch_statistics(&mut self) -> Result<HistogramStats>;
}

/// Replays recorded statistics from a JSON Lines stream
///
/// Each line holds one [`HistogramStats`] object. Blank lines and `null`
/// lines stand for frames where the ISP reported no valid statistics.
#[derive(Debug)]
pub struct ReplaySource<R> {
    reader: R,
    line: String,
    line_number: usize,
}

impl ReplaySource<BufReader<File>> {
    /// Open a recording on disk
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        debug!("Opened statistics recording {}", path.display());
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> ReplaySource<R> {
    /// Replay statistics from any buffered reader
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_number: 0,
        }
    }

    /// Number of lines consumed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl<R: BufRead> StatisticsSource for ReplaySource<R> {
    fn fetch_statistics(&mut self) -> Result<HistogramStats> {
        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            return Err(AeAwbError::SourceExhausted);
        }
        self.line_number += 1;

        let record = self.line.trim();
        if record.is_empty() || record == "null" {
            return Err(AeAwbError::StatisticsUnavailable);
        }

        serde_json::from_str(record).map_err(|e| {
            AeAwbError::InvalidStatistics(format!("line {}: {e}", self.line_number))
        })
    }
}
