//! Exposure and white-balance control module
//!
//! This module turns one frame of ISP statistics into sensor updates.
//!
//! # Overview
//!
//! Every frame the controller:
//! - **Builds a cumulative distribution** over the usable luminance bins
//! - **Picks an exposure multiplier** from the saturated and bright pixel counts
//! - **Corrects the red and blue gains** from the grey-pixel chroma averages
//! - **Commits the results** through the sensor driver
//!
//! # Architecture
//!
//! - `AeAwbController`: runs both steps for a frame, honouring the enable toggles
//! - `exposure`: cumulative distribution and the four-branch exposure rule
//! - `white_balance`: chroma averages and the proportional gain correction
//! - `FrameReport`: per-frame record of decisions and commits
//!
//! # Exposure Rule
//!
//! Evaluated in strict priority order, exactly one branch per frame:
//!
//! 1. **Saturated** (more than 0.25% of pixels in the top 5 bins): darken by the
//!    excess saturated fraction
//! 2. **Under target** (top 20 bins hold less than 90% of the 10% target): widen
//!    the window downward and brighten by the window ratio
//! 3. **Over target** (top 20 bins hold more than 110% of the target): shrink the
//!    window and darken by the squared window ratio
//! 4. **Hold**: multiplier 1.0
//!
//! The multiplier is bounded to `[1/16, 4]` and the exposure is committed on
//! every frame.
//!
//! # White Balance
//!
//! Chroma averages are rescaled to be centred on zero. Channels whose offset
//! exceeds 0.002 are corrected one-for-one, both gains are bounded to
//! `[gain_min, gain_max]` and committed together.

pub mod ae_awb_controller;
pub mod exposure;
pub mod white_balance;

pub use ae_awb_controller::{AeAwbController, ExposureOutcome, FrameReport};
pub use exposure::{
    CumulativeDistribution, ExposureBranch, ExposureDecision, ExposureDirection, MAX_ADJUSTMENT,
    MIN_ADJUSTMENT,
};
pub use white_balance::{ChromaAverages, WB_THRESHOLD, WhiteBalanceOutcome};
