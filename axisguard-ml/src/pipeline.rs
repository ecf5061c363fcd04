//! The full adaptive input pipeline
//!
//! ## Overview
//!
//! [`InputProcessor`] owns one [`ProcessorState`] per physical stick and runs
//! every layer once per polling frame:
//!
//! ```text
//! raw ─→ sanitize ─→ calibrator.update ─→ phase ─→ correct ─→ kalman ─→ features
//!                                                                         │
//!        statistical (pitch = y, yaw = x) ◀──────────────────────────────┤
//!                                                                         ▼
//!                                                      network (gated) ─→ replay
//!                                                                         │
//!                                          MRAC mix / plain blend ◀──────┘
//!                                                    │
//!                                         budget check ─→ output
//! ```
//!
//! ## Gating
//!
//! The neural path runs only when all of these hold:
//! - `enable_neural_processing` in the config (a permission)
//! - the calibration state machine has reached production
//! - no frame since the last reset exceeded the CPU budget
//!
//! A budget overrun turns the neural path off until [`InputProcessor::reset`].
//! It does not interrupt the frame that overran.
//!
//! ## Example
//!
//! ```rust
//! use axisguard_core::{MockTimeSource, Vec2};
//! use axisguard_ml::{InputProcessor, ProcessorConfig};
//!
//! let mut processor = InputProcessor::with_clock(ProcessorConfig::default(), MockTimeSource::new(0))?;
//!
//! for _ in 0..600 {
//!     let command = processor.process(Vec2::new(0.0, 0.0), 1.0 / 60.0);
//!     assert!(command.is_finite());
//! }
//! assert!(processor.neural_enabled());
//! # Ok::<(), axisguard_core::ConfigError>(())
//! ```

use axisguard_core::{
    constants::timing::DEFAULT_CPU_BUDGET_US,
    time::elapsed_us,
    AdaptiveKalmanFilter, CalibrationPhase, CalibrationStateMachine, CalibratorConfig,
    ConfigError, ConfigResult, KalmanConfig, MracConfig, PerformanceMonitor,
    ReferenceAdaptiveController, StatisticalCalibrator, TimeSource, Vec2, Vector6,
};

#[cfg(feature = "std")]
use axisguard_core::MonotonicTime;

use crate::{
    diagnostics::DiagnosticsSnapshot,
    features::FeatureExtractor,
    network::QuantizedNetwork,
};

/// Seed used for network weights when no pretrained weights are supplied
pub const DEFAULT_NETWORK_SEED: u32 = 0x5EED_1234;

/// Pipeline configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessorConfig {
    /// Apply the learned bias/deadzone/gain correction
    pub enable_statistical_calibration: bool,
    /// Run the adaptive Kalman filter
    pub enable_kalman_filtering: bool,
    /// Allow the neural path once calibration completes
    pub enable_neural_processing: bool,
    /// Mix through the MRAC shell (plain λ-blend otherwise)
    pub enable_mrac_safety: bool,
    /// Per-frame CPU budget in microseconds
    pub cpu_budget_us: f32,
    /// Seed for generated network weights
    pub network_seed: u32,
    /// Calibrator tuning
    pub calibrator: CalibratorConfig,
    /// Kalman tuning
    pub kalman: KalmanConfig,
    /// MRAC tuning
    pub mrac: MracConfig,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            enable_statistical_calibration: true,
            enable_kalman_filtering: true,
            enable_neural_processing: true,
            enable_mrac_safety: true,
            cpu_budget_us: DEFAULT_CPU_BUDGET_US,
            network_seed: DEFAULT_NETWORK_SEED,
            calibrator: CalibratorConfig::default(),
            kalman: KalmanConfig::default(),
            mrac: MracConfig::default(),
        }
    }
}

impl ProcessorConfig {
    /// Set the per-frame CPU budget
    pub fn with_cpu_budget_us(mut self, budget: f32) -> Self {
        self.cpu_budget_us = budget;
        self
    }

    /// Set the weight seed
    pub fn with_network_seed(mut self, seed: u32) -> Self {
        self.network_seed = seed;
        self
    }

    /// Permit or forbid the neural path
    pub fn with_neural_processing(mut self, enabled: bool) -> Self {
        self.enable_neural_processing = enabled;
        self
    }

    /// Switch the Kalman layer
    pub fn with_kalman_filtering(mut self, enabled: bool) -> Self {
        self.enable_kalman_filtering = enabled;
        self
    }

    /// Switch the MRAC shell
    pub fn with_mrac_safety(mut self, enabled: bool) -> Self {
        self.enable_mrac_safety = enabled;
        self
    }

    /// Validate the budget and every nested config
    pub fn validate(&self) -> ConfigResult<()> {
        ConfigError::check_range("cpu_budget_us", self.cpu_budget_us, 1.0, 1.0e6)?;
        self.calibrator.validate()?;
        self.kalman.validate()?;
        self.mrac.validate()?;
        Ok(())
    }
}

/// Per-stage wall time of the last frame, plus frame counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StageMetrics {
    /// Calibrator update, phase update and correction
    pub statistical_us: u64,
    /// Kalman update
    pub kalman_us: u64,
    /// Feature extraction and inference
    pub neural_us: u64,
    /// MRAC mix or blend
    pub mrac_us: u64,
    /// Whole frame
    pub total_us: u64,
    /// Frames since construction or reset
    pub frames_processed: u64,
    /// Frames whose raw sample had a non-finite component
    pub invalid_samples: u64,
}

/// Fallback bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SafetyMonitor {
    /// A frame exceeded the CPU budget since reset
    pub performance_budget_exceeded: bool,
    /// The MRAC shell is currently outside its stability margin
    pub stability_compromised: bool,
    /// The MRAC shell has pushed λ below its initial value
    pub neural_confidence_low: bool,
    /// Budget trips plus MRAC stability losses since reset
    pub fallback_activations: u32,
}

/// Everything carried between frames for one input source
#[derive(Clone)]
pub struct ProcessorState {
    /// Bias/deadzone/gain estimator
    pub calibrator: StatisticalCalibrator,
    /// Adaptive smoother
    pub kalman: AdaptiveKalmanFilter,
    /// Quantized network and replay
    pub network: QuantizedNetwork,
    /// Safety shell
    pub mrac: ReferenceAdaptiveController,
    /// Calibration lifecycle
    pub phase: CalibrationStateMachine,
    /// CPU budget breaker
    pub monitor: PerformanceMonitor,
    /// Last frame's output
    pub previous_output: Vector6,
    /// Last frame's filtered sample
    pub previous_filtered: Vec2,
    /// Neural path switched on by the phase machine and off by the breaker
    pub neural_enabled: bool,
    /// Stage timings
    pub metrics: StageMetrics,
    /// Fallback flags
    pub safety: SafetyMonitor,
}

impl ProcessorState {
    fn new(config: &ProcessorConfig, network: QuantizedNetwork, connected_at: u64) -> Self {
        Self {
            calibrator: StatisticalCalibrator::new(config.calibrator, connected_at),
            kalman: AdaptiveKalmanFilter::new(config.kalman),
            network,
            mrac: ReferenceAdaptiveController::new(config.mrac),
            phase: CalibrationStateMachine::new(),
            monitor: PerformanceMonitor::new(config.cpu_budget_us),
            previous_output: Vector6::ZERO,
            previous_filtered: Vec2::ZERO,
            neural_enabled: false,
            metrics: StageMetrics::default(),
            safety: SafetyMonitor::default(),
        }
    }
}

/// Adaptive input processor for one analog stick
pub struct InputProcessor<C: TimeSource> {
    config: ProcessorConfig,
    state: ProcessorState,
    clock: C,
}

#[cfg(feature = "std")]
impl InputProcessor<MonotonicTime> {
    /// Processor timed by the system monotonic clock
    pub fn new(config: ProcessorConfig) -> ConfigResult<Self> {
        Self::with_clock(config, MonotonicTime::new())
    }
}

impl<C: TimeSource> InputProcessor<C> {
    /// Processor with seeded weights and the given clock
    pub fn with_clock(config: ProcessorConfig, clock: C) -> ConfigResult<Self> {
        let network = QuantizedNetwork::seeded(config.network_seed);
        Self::with_network(config, network, clock)
    }

    /// Processor with pretrained weights
    pub fn with_network(
        config: ProcessorConfig,
        network: QuantizedNetwork,
        clock: C,
    ) -> ConfigResult<Self> {
        config.validate()?;

        let state = ProcessorState::new(&config, network, clock.now_us());
        log_info!(
            "input processor ready: budget {}us, kalman={}, neural={}, mrac={}",
            config.cpu_budget_us,
            config.enable_kalman_filtering,
            config.enable_neural_processing,
            config.enable_mrac_safety
        );

        Ok(Self { config, state, clock })
    }

    /// Run one frame: `raw` stick sample, `dt` seconds since the previous one
    pub fn process(&mut self, raw: Vec2, dt: f32) -> Vector6 {
        let config = self.config;
        let clock = &self.clock;
        let state = &mut self.state;

        let frame = state.monitor.begin(clock);

        let raw = if raw.is_finite() {
            raw
        } else {
            state.metrics.invalid_samples = state.metrics.invalid_samples.saturating_add(1);
            Vec2::new(finite_or_zero(raw.x), finite_or_zero(raw.y))
        };
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        // Layer 1: statistics always learn; correction is switchable
        let statistical_start = clock.now_us();
        state.calibrator.update(raw, frame.started_at());
        if let Some(transition) = state.phase.update(raw, dt, &state.calibrator) {
            if transition.entered_production() && !state.monitor.budget_exceeded() {
                state.neural_enabled = true;
                log_info!("neural path enabled");
            }
        }
        let calibrated = if config.enable_statistical_calibration {
            state.calibrator.correct(raw)
        } else {
            raw
        };

        // Layer 2
        let kalman_start = clock.now_us();
        let filtered = if config.enable_kalman_filtering {
            state.kalman.update(calibrated)
        } else {
            calibrated
        };

        // Layer 3
        let neural_start = clock.now_us();
        let statistical = Vector6 {
            pitch: filtered.y,
            yaw: filtered.x,
            ..Vector6::ZERO
        };

        let neural_active = config.enable_neural_processing
            && state.neural_enabled
            && !state.monitor.budget_exceeded();
        let neural = if neural_active {
            let features = FeatureExtractor::extract(
                filtered,
                &state.calibrator,
                state.previous_filtered,
                state.previous_output,
            );
            let output = state.network.infer(&features, clock);
            state.network.record(features, output);
            output
        } else {
            Vector6::ZERO
        };

        // Layer 4
        let mrac_start = clock.now_us();
        let output = if config.enable_mrac_safety {
            let was_stable = state.mrac.stability_assured();
            let mixed = state.mrac.mix(neural, statistical, neural, dt);
            if was_stable && !state.mrac.stability_assured() {
                state.safety.fallback_activations = state.safety.fallback_activations.saturating_add(1);
            }
            mixed
        } else {
            state.mrac.blend(neural, statistical)
        };
        let mrac_end = clock.now_us();

        let verdict = state.monitor.finish(frame, clock);
        if verdict.over_budget {
            state.neural_enabled = false;
            state.safety.performance_budget_exceeded = true;
        }
        if verdict.first_trip {
            state.safety.fallback_activations = state.safety.fallback_activations.saturating_add(1);
        }

        state.safety.stability_compromised = !state.mrac.stability_assured();
        state.safety.neural_confidence_low =
            state.mrac.mixing_lambda() < state.mrac.config().initial_lambda;

        let metrics = &mut state.metrics;
        metrics.statistical_us = elapsed_us(statistical_start, kalman_start);
        metrics.kalman_us = elapsed_us(kalman_start, neural_start);
        metrics.neural_us = elapsed_us(neural_start, mrac_start);
        metrics.mrac_us = elapsed_us(mrac_start, mrac_end);
        metrics.total_us = verdict.elapsed_us;
        metrics.frames_processed = metrics.frames_processed.saturating_add(1);

        state.previous_output = output;
        state.previous_filtered = filtered;

        output
    }

    /// Reinitialize every layer; the network weights are kept
    pub fn reset(&mut self) {
        let mut network = self.state.network.clone();
        network.reset();
        self.state = ProcessorState::new(&self.config, network, self.clock.now_us());
        log_info!("input processor reset");
    }

    /// Read-only snapshot of every layer
    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot::capture(&self.state, &self.config)
    }

    /// Current calibration phase
    pub fn phase(&self) -> CalibrationPhase {
        self.state.phase.phase()
    }

    /// Whether the neural path may run this frame
    pub fn neural_enabled(&self) -> bool {
        self.state.neural_enabled
    }

    /// Stage timings and frame counters
    pub fn metrics(&self) -> &StageMetrics {
        &self.state.metrics
    }

    /// Fallback flags
    pub fn safety(&self) -> &SafetyMonitor {
        &self.state.safety
    }

    /// All per-source state
    pub fn state(&self) -> &ProcessorState {
        &self.state
    }

    /// Active configuration
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Clock used for timing
    pub fn clock(&self) -> &C {
        &self.clock
    }
}

#[inline]
fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}
