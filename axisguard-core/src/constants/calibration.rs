//! Statistical Calibration Constants
//!
//! Values for the online bias/deadzone/gain estimator. The estimator learns
//! the stick's rest position from samples near the centre and its physical
//! extent from samples near the rim.

// ===== SAMPLE CLASSIFICATION =====

/// Magnitude below which a sample counts as "stick at rest".
///
/// Worn sticks rest up to ~3% off-centre; 5% keeps deliberate small
/// deflections out of the bias estimate.
pub const REST_THRESHOLD: f32 = 0.05;

/// Magnitude above which a sample counts as "stick at the rim".
///
/// Only these samples move the extent estimate.
pub const PERCENTILE_THRESHOLD: f32 = 0.9;

// ===== LEARNING RATES =====

/// EMA rate for the rest mean and variance.
///
/// Time constant of 1/alpha = 500 rest samples (~8 s at 60 Hz).
pub const DEFAULT_ALPHA: f32 = 0.002;

/// EMA rate for the extent estimate.
pub const EXTREME_LEARNING_RATE: f32 = 0.001;

/// Initial per-axis extent before any rim samples are seen.
///
/// Conservative: most pads reach at least 0.8 on each axis.
pub const INITIAL_EXTENT: f32 = 0.8;

// ===== TRUST =====

/// Samples needed before learned statistics replace the fixed deadzone.
pub const MIN_SAMPLES_FOR_TRUST: u32 = 100;

/// Samples at which `confidence_level` saturates at 1.0 (~5 s at 60 Hz).
pub const FULL_CONFIDENCE_SAMPLES: u32 = 300;

/// Deadzone radius = |mu| + SIGMA_MULTIPLIER·|sigma|.
pub const SIGMA_MULTIPLIER: f32 = 3.0;

/// Deadzone used before statistics are trusted (10% of travel).
pub const FIXED_DEADZONE: f32 = 0.1;

// ===== NUMERIC GUARDS =====

/// Smallest usable per-axis range `m_max - |mu|`; axes below contribute 0.
pub const MIN_AXIS_RANGE: f32 = 1e-3;

/// Smallest normalized magnitude with a usable direction.
pub const MIN_DIRECTION_MAGNITUDE: f32 = 1e-4;

/// Smallest usable live range `1 - deadzone`.
pub const MIN_LIVE_RANGE: f32 = 1e-3;

// ===== DRIFT =====

/// Shift of the rest mean across the drift window that counts as drift.
pub const DRIFT_THRESHOLD: f32 = 0.05;

/// Samples before drift detection starts (matches full confidence).
pub const DRIFT_WARMUP_SAMPLES: u32 = FULL_CONFIDENCE_SAMPLES;

/// Controller age at which the normalized age feature saturates (10 min).
pub const MAX_CONTROLLER_AGE_MS: f32 = 10.0 * 60.0 * 1000.0;
