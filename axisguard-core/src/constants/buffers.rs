//! Buffer Capacities
//!
//! Fixed sizes of the history windows. Everything is allocated when a
//! processor is built; nothing grows afterwards.

/// Rest-mean snapshots kept for drift detection (1 s at 60 Hz).
pub const DRIFT_HISTORY_SIZE: usize = 60;

/// Feature/target pairs kept for continual learning (8 s at 60 Hz).
///
/// 480 × ~72 bytes ≈ 34KB, the largest single allocation of a processor.
pub const REPLAY_BUFFER_SIZE: usize = 480;

/// Recent frame latencies kept by the performance monitor.
pub const LATENCY_HISTORY_SIZE: usize = 64;
