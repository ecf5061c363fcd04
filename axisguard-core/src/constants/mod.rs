//! Constants for AxisGuard
//!
//! Centralized tuning values for every layer of the input pipeline. Config
//! structs take their defaults from here, so the numbers below are what a
//! processor uses unless the caller overrides them.
//!
//! ## Organization
//!
//! - **Calibration**: rest/extreme detection, learning rates, drift
//! - **Filter**: adaptive Kalman noise model and outlier gate
//! - **Control**: MRAC reference model, adaptation and mixing
//! - **Timing**: frame rate, phase durations, CPU budget
//! - **Buffers**: fixed capacities of history windows
//!
//! ## Usage Guidelines
//!
//! 1. Use these constants instead of magic numbers
//! 2. Document units in the name or the doc comment
//! 3. Keep related constants together

/// Statistical calibration parameters.
pub mod calibration;

/// Adaptive Kalman filter parameters.
pub mod filter;

/// MRAC safety shell parameters.
pub mod control;

/// Frame timing, phase durations and CPU budget.
pub mod timing;

/// Fixed capacities of history buffers.
pub mod buffers;

// Re-export commonly used constants for convenience
pub use calibration::{
    DEFAULT_ALPHA, REST_THRESHOLD, PERCENTILE_THRESHOLD, MIN_SAMPLES_FOR_TRUST,
    SIGMA_MULTIPLIER, DRIFT_THRESHOLD,
};

pub use filter::{
    BASE_MEASUREMENT_NOISE, PROCESS_NOISE, SPIKE_MULTIPLIER, OUTLIER_Z_SCORE,
};

pub use control::{
    REFERENCE_DAMPING, REFERENCE_FREQUENCY, ADAPTATION_RATE, SIGMA_BOUND,
    STABILITY_MARGIN, INITIAL_MIXING_LAMBDA, DEFAULT_NEURAL_CONFIDENCE,
};

pub use timing::{
    NOMINAL_FRAME_DT_S, STATISTICAL_PHASE_S, DEFAULT_CPU_BUDGET_US,
};

pub use buffers::{DRIFT_HISTORY_SIZE, REPLAY_BUFFER_SIZE, LATENCY_HISTORY_SIZE};
