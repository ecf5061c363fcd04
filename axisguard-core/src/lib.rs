//! Core signal layers for AxisGuard
//!
//! Turns a raw, noisy two-axis analog stick sample into a clean signal the
//! flight controller can trust. Everything here is a leaf layer of the input
//! pipeline; the neural path and the pipeline itself live in `axisguard-ml`.
//!
//! Key constraints:
//! - Runs inside the input-polling loop, once per frame (typically 60 Hz)
//! - No heap allocation in the hot path
//! - Never panics: every numeric edge case has a bounded fallback
//!
//! ## Layers
//!
//! ```text
//! raw ─→ StatisticalCalibrator ─→ AdaptiveKalmanFilter ─→ (features / NN) ─→ ReferenceAdaptiveController ─→ 6-DoF
//!              │                                                                  ▲
//!              └──────────── CalibrationStateMachine / PerformanceMonitor ────────┘
//! ```
//!
//! ```no_run
//! use axisguard_core::{StatisticalCalibrator, AdaptiveKalmanFilter, Vec2};
//!
//! let mut calibrator = StatisticalCalibrator::default();
//! let mut filter = AdaptiveKalmanFilter::default();
//!
//! let raw = Vec2::new(0.42, -0.13);
//! calibrator.update(raw, 16_000);
//! let clean = filter.update(calibrator.correct(raw));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod logging;

pub mod buffer;
pub mod calibration;
pub mod constants;
pub mod errors;
pub mod filter;
pub mod math;
pub mod monitor;
pub mod mrac;
pub mod phase;
pub mod time;

// Public API
pub use calibration::{CalibratorConfig, StatisticalCalibrator};
pub use errors::{ConfigError, ConfigResult};
pub use filter::{AdaptiveKalmanFilter, KalmanConfig};
pub use math::{Vec2, Vector6};
pub use monitor::{FrameTimer, FrameVerdict, PerformanceMonitor};
pub use mrac::{MracConfig, ReferenceAdaptiveController};
pub use phase::{CalibrationPhase, CalibrationStateMachine, PhaseTransition};
pub use time::{MockTimeSource, Timestamp, TimeSource};

#[cfg(feature = "std")]
pub use time::MonotonicTime;

#[cfg(feature = "log")]
#[doc(hidden)]
pub use log as __log;

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
