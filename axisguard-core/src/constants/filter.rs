//! Adaptive Kalman Filter Constants
//!
//! Noise model and outlier gate for the 2D constant-signal filter.

/// Diagonal of the fixed process noise Q (small random walk).
pub const PROCESS_NOISE: f32 = 0.01;

/// Diagonal of the initial state covariance P (high initial uncertainty).
pub const INITIAL_COVARIANCE: f32 = 1.0;

/// Diagonal of the nominal measurement noise R.
pub const BASE_MEASUREMENT_NOISE: f32 = 0.1;

/// Factor applied to R when an innovation is flagged as an outlier.
pub const SPIKE_MULTIPLIER: f32 = 1000.0;

/// Ceiling on R diagonals; keeps repeated spikes from overflowing to inf.
pub const MAX_MEASUREMENT_NOISE: f32 = 1.0e6;

/// Innovation z-score above which a measurement is an outlier (3 sigma).
pub const OUTLIER_Z_SCORE: f32 = 3.0;

/// Per-frame decay of R back toward its base value.
pub const NOISE_RECOVERY_DECAY: f32 = 0.999;

/// Confidence multiplier on an outlier.
pub const CONFIDENCE_PENALTY: f32 = 0.5;

/// Confidence multiplier on a clean frame (capped at 1.0).
pub const CONFIDENCE_RECOVERY: f32 = 1.01;

/// Expected innovation below which the z-score is treated as 0.
pub const MIN_EXPECTED_INNOVATION: f32 = 1e-3;

/// Determinant below which S is treated as singular.
pub const SINGULAR_DETERMINANT: f32 = 1e-6;
