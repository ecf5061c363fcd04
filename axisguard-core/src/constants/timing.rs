//! Timing Constants
//!
//! Frame timing, calibration phase durations and the per-frame CPU budget.

// ===== UNIT CONVERSIONS =====

/// Microseconds per millisecond.
pub const US_PER_MS: u64 = 1000;

/// Microseconds per second.
pub const US_PER_SECOND: u64 = 1_000_000;

// ===== FRAME TIMING =====

/// Nominal input polling interval (60 Hz).
pub const NOMINAL_FRAME_DT_S: f32 = 1.0 / 60.0;

/// Frame interval used by the built-in benchmark.
pub const BENCHMARK_FRAME_DT_S: f32 = 0.016;

// ===== CALIBRATION PHASES =====

/// Raw magnitude that proves a controller is connected.
pub const CONNECT_MAGNITUDE: f32 = 0.001;

/// Samples that prove a controller is connected even at perfect rest.
pub const CONNECT_SAMPLES: u32 = 10;

/// Minimum time spent gathering statistics before neural processing.
pub const STATISTICAL_PHASE_S: f32 = 5.0;

/// Calibrator confidence required to leave the statistical phase.
pub const PRODUCTION_CONFIDENCE: f32 = 0.8;

// ===== CPU BUDGET =====

/// Default per-frame CPU budget (µs). Overruns disable the neural layer.
pub const DEFAULT_CPU_BUDGET_US: f32 = 100.0;

/// Target for a single neural inference (µs), reported by the benchmark.
pub const NEURAL_TARGET_US: f32 = 50.0;
