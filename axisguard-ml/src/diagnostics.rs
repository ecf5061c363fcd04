//! Read-only diagnostics
//!
//! A flat, `Copy` snapshot of every layer. `Display` renders the text dump a
//! debug console shows; with the `serde` feature the same snapshot
//! serializes for telemetry.

use core::fmt;

use axisguard_core::{CalibrationPhase, Vec2};

use crate::pipeline::{ProcessorConfig, ProcessorState, SafetyMonitor, StageMetrics};

/// Point-in-time view of a processor
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DiagnosticsSnapshot {
    /// Calibration phase
    pub phase: CalibrationPhase,
    /// Seconds since the phase timer was last reset
    pub phase_timer_s: f32,
    /// Neural path on
    pub neural_enabled: bool,

    /// Rest mean
    pub calibration_mean: Vec2,
    /// Rest standard deviation
    pub calibration_sigma: Vec2,
    /// Learned deadzone radius
    pub deadzone_estimate: f32,
    /// Learned extent magnitude
    pub gain_estimate: f32,
    /// Calibrator trust, 0..=1
    pub calibration_confidence: f32,
    /// Samples seen
    pub sample_count: u32,
    /// Rest position drifting
    pub drift_detected: bool,
    /// Milliseconds since connection
    pub controller_age_ms: u64,

    /// Kalman estimate
    pub kalman_state: Vec2,
    /// Kalman measurement trust
    pub kalman_confidence: f32,
    /// Spikes rejected
    pub outlier_count: u32,

    /// Inferences run
    pub total_inferences: u64,
    /// Latency of the last inference
    pub last_inference_us: u64,
    /// Experiences stored
    pub replay_len: usize,

    /// Neural share
    pub mixing_lambda: f32,
    /// Energy of the last MRAC step
    pub lyapunov_energy: f32,
    /// MRAC inside its margin
    pub stability_assured: bool,

    /// Per-stage timing of the last frame
    pub metrics: StageMetrics,
    /// Fallback flags
    pub safety: SafetyMonitor,
    /// CPU budget
    pub cpu_budget_us: f32,
    /// Mean frame latency since reset
    pub average_latency_us: f32,
    /// Slowest frame since reset
    pub worst_latency_us: u64,
    /// Frames over budget since reset
    pub overrun_count: u32,
    /// Size of the per-source state
    pub memory_footprint_bytes: usize,
}

impl DiagnosticsSnapshot {
    pub(crate) fn capture(state: &ProcessorState, config: &ProcessorConfig) -> Self {
        let calibrator = &state.calibrator;
        Self {
            phase: state.phase.phase(),
            phase_timer_s: state.phase.phase_timer(),
            neural_enabled: state.neural_enabled,

            calibration_mean: calibrator.mean(),
            calibration_sigma: calibrator.sigma(),
            deadzone_estimate: calibrator.dynamic_deadzone_estimate(),
            gain_estimate: calibrator.gain_estimate(),
            calibration_confidence: calibrator.confidence_level(),
            sample_count: calibrator.sample_count(),
            drift_detected: calibrator.drift_detected(),
            controller_age_ms: calibrator.controller_age_ms(),

            kalman_state: state.kalman.state(),
            kalman_confidence: state.kalman.confidence(),
            outlier_count: state.kalman.outlier_count(),

            total_inferences: state.network.total_inferences(),
            last_inference_us: state.network.last_inference_us(),
            replay_len: state.network.replay_len(),

            mixing_lambda: state.mrac.mixing_lambda(),
            lyapunov_energy: state.mrac.lyapunov_energy(),
            stability_assured: state.mrac.stability_assured(),

            metrics: state.metrics,
            safety: state.safety,
            cpu_budget_us: config.cpu_budget_us,
            average_latency_us: state.monitor.average_latency_us(),
            worst_latency_us: state.monitor.worst_latency_us(),
            overrun_count: state.monitor.overrun_count(),
            memory_footprint_bytes: core::mem::size_of::<ProcessorState>(),
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

impl fmt::Display for DiagnosticsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Input Processor Diagnostics ===")?;
        writeln!(f, "Phase: {} ({:.2}s)", self.phase, self.phase_timer_s)?;
        writeln!(f, "Neural path: {}", if self.neural_enabled { "on" } else { "off" })?;

        writeln!(f, "Calibration:")?;
        writeln!(
            f,
            "  Mean: ({:.4}, {:.4})  Sigma: ({:.4}, {:.4})",
            self.calibration_mean.x,
            self.calibration_mean.y,
            self.calibration_sigma.x,
            self.calibration_sigma.y
        )?;
        writeln!(
            f,
            "  Deadzone: {:.4}  Gain: {:.4}  Confidence: {:.2}",
            self.deadzone_estimate, self.gain_estimate, self.calibration_confidence
        )?;
        writeln!(
            f,
            "  Samples: {}  Age: {}ms  Drift: {}",
            self.sample_count,
            self.controller_age_ms,
            yes_no(self.drift_detected)
        )?;

        writeln!(f, "Kalman:")?;
        writeln!(
            f,
            "  State: ({:.4}, {:.4})  Confidence: {:.2}  Outliers: {}",
            self.kalman_state.x, self.kalman_state.y, self.kalman_confidence, self.outlier_count
        )?;

        writeln!(f, "Network:")?;
        writeln!(
            f,
            "  Inferences: {}  Last: {}us  Replay: {}",
            self.total_inferences, self.last_inference_us, self.replay_len
        )?;

        writeln!(f, "MRAC:")?;
        writeln!(
            f,
            "  Lambda: {:.3}  Energy: {:.3}  Stable: {}",
            self.mixing_lambda,
            self.lyapunov_energy,
            yes_no(self.stability_assured)
        )?;

        writeln!(f, "Performance:")?;
        writeln!(
            f,
            "  Last frame: {}us (stat {}, kalman {}, neural {}, mrac {})",
            self.metrics.total_us,
            self.metrics.statistical_us,
            self.metrics.kalman_us,
            self.metrics.neural_us,
            self.metrics.mrac_us
        )?;
        writeln!(
            f,
            "  Average: {:.1}us  Worst: {}us  Budget: {:.0}us  Overruns: {}",
            self.average_latency_us, self.worst_latency_us, self.cpu_budget_us, self.overrun_count
        )?;
        writeln!(
            f,
            "  Frames: {}  Invalid samples: {}  Memory: {} bytes",
            self.metrics.frames_processed, self.metrics.invalid_samples, self.memory_footprint_bytes
        )?;

        writeln!(f, "Safety:")?;
        writeln!(
            f,
            "  Budget exceeded: {}  Stability compromised: {}  Neural confidence low: {}",
            yes_no(self.safety.performance_budget_exceeded),
            yes_no(self.safety.stability_compromised),
            yes_no(self.safety.neural_confidence_low)
        )?;
        write!(f, "  Fallback activations: {}", self.safety.fallback_activations)
    }
}
