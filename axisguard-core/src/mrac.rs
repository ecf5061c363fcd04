//! Model-Reference Adaptive Safety Shell
//!
//! ## Overview
//!
//! The neural path produces a richer command than the statistical path, but
//! nothing guarantees it behaves. This controller mixes the two with a share
//! λ and watches the mix against a second-order reference model. When the
//! tracking energy leaves the stability margin λ decays geometrically, handing
//! control back to the statistical path. Once the loop has been stable for
//! [`LAMBDA_RECOVERY_HOLD_FRAMES`] consecutive frames λ creeps back up, so
//! within an excursion λ never rises.
//!
//! ## Reference Model
//!
//! Per axis, driven by the command `r`:
//! ```text
//! ẏ_ref += (ω²·(r − x_ref) − 2ζω·ẏ_ref)·dt
//! x_ref += ẏ_ref·dt
//! ```
//!
//! ## Adaptation
//!
//! ```text
//! mixed       = λ·neural + (1 − λ)·statistical
//! e           = mixed − ẏ_ref              (tracking error)
//! θ           = clamp(θ + γ·e·|e|·dt, ±σ)  (adaptive gains, saturated)
//! output      = mixed + θ
//! V           = |e|² + θ·θ                 (Lyapunov energy)
//! ```
//!
//! `V < margin` counts as stable.

use crate::{
    constants::control::*,
    errors::{ConfigError, ConfigResult},
    math::Vector6,
};

/// MRAC tuning
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MracConfig {
    /// Reference damping ratio ζ
    pub damping_ratio: f32,
    /// Reference natural frequency ω (rad/s)
    pub natural_frequency: f32,
    /// Adaptation gain γ
    pub adaptation_rate: f32,
    /// Gain saturation σ
    pub sigma_bound: f32,
    /// Energy below which the loop is stable
    pub stability_margin: f32,
    /// λ at construction and reset
    pub initial_lambda: f32,
    /// Ceiling λ recovers toward
    pub neural_confidence: f32,
}

impl Default for MracConfig {
    fn default() -> Self {
        Self {
            damping_ratio: REFERENCE_DAMPING,
            natural_frequency: REFERENCE_FREQUENCY,
            adaptation_rate: ADAPTATION_RATE,
            sigma_bound: SIGMA_BOUND,
            stability_margin: STABILITY_MARGIN,
            initial_lambda: INITIAL_MIXING_LAMBDA,
            neural_confidence: DEFAULT_NEURAL_CONFIDENCE,
        }
    }
}

impl MracConfig {
    /// Set the λ ceiling
    pub fn with_neural_confidence(mut self, confidence: f32) -> Self {
        self.neural_confidence = confidence;
        self
    }

    /// Set the initial λ
    pub fn with_initial_lambda(mut self, lambda: f32) -> Self {
        self.initial_lambda = lambda;
        self
    }

    /// Check every parameter is finite and in range
    pub fn validate(&self) -> ConfigResult<()> {
        ConfigError::check_range("damping_ratio", self.damping_ratio, 0.0, 10.0)?;
        ConfigError::check_range("natural_frequency", self.natural_frequency, 0.0, 100.0)?;
        ConfigError::check_range("adaptation_rate", self.adaptation_rate, 0.0, 10.0)?;
        ConfigError::check_range("sigma_bound", self.sigma_bound, 0.0, 10.0)?;
        ConfigError::check_range("stability_margin", self.stability_margin, 1e-6, 100.0)?;
        ConfigError::check_range("initial_lambda", self.initial_lambda, 0.0, 1.0)?;
        ConfigError::check_range("neural_confidence", self.neural_confidence, 0.0, 1.0)?;
        Ok(())
    }
}

/// Safety shell blending neural and statistical commands
#[derive(Debug, Clone)]
pub struct ReferenceAdaptiveController {
    reference_state: Vector6,
    reference_output: Vector6,
    adaptive_gains: Vector6,
    tracking_error: Vector6,
    mixing_lambda: f32,
    lyapunov_energy: f32,
    stability_assured: bool,
    stable_streak: u32,
    config: MracConfig,
}

impl Default for ReferenceAdaptiveController {
    fn default() -> Self {
        Self::new(MracConfig::default())
    }
}

impl ReferenceAdaptiveController {
    /// Create a controller at rest
    pub fn new(config: MracConfig) -> Self {
        Self {
            reference_state: Vector6::ZERO,
            reference_output: Vector6::ZERO,
            adaptive_gains: Vector6::ZERO,
            tracking_error: Vector6::ZERO,
            mixing_lambda: config.initial_lambda,
            lyapunov_energy: 0.0,
            stability_assured: true,
            stable_streak: LAMBDA_RECOVERY_HOLD_FRAMES,
            config,
        }
    }

    /// Restore initial values
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    /// Mix `neural` into `statistical` under the reference model driven by
    /// `command`, adapting λ from the resulting stability
    pub fn mix(
        &mut self,
        neural: Vector6,
        statistical: Vector6,
        command: Vector6,
        dt: f32,
    ) -> Vector6 {
        let omega = self.config.natural_frequency;
        let zeta = self.config.damping_ratio;

        let acceleration = (command - self.reference_state) * (omega * omega)
            - self.reference_output * (2.0 * zeta * omega);
        self.reference_output = self.reference_output + acceleration * dt;
        self.reference_state = self.reference_state + self.reference_output * dt;

        let mixed = self.blend(neural, statistical);

        self.tracking_error = mixed - self.reference_output;
        let error_norm = self.tracking_error.length();

        let rate = self.config.adaptation_rate;
        let bound = self.config.sigma_bound;
        self.adaptive_gains = self
            .adaptive_gains
            .zip_map(self.tracking_error, |gain, e| gain + rate * e * error_norm * dt)
            .clamp(-bound, bound);

        let compensated = mixed + self.adaptive_gains;

        self.lyapunov_energy =
            error_norm * error_norm + self.adaptive_gains.dot(self.adaptive_gains);
        let stable = self.lyapunov_energy < self.config.stability_margin;

        if stable != self.stability_assured {
            if stable {
                log_info!("mrac stable again, energy={:.3}", self.lyapunov_energy);
            } else {
                log_warn!(
                    "mrac stability lost: energy={:.3}, lambda={:.3}",
                    self.lyapunov_energy,
                    self.mixing_lambda
                );
            }
        }
        self.stability_assured = stable;

        if !stable {
            self.mixing_lambda *= LAMBDA_DECAY;
            self.stable_streak = 0;
        } else {
            self.stable_streak = (self.stable_streak + 1).min(LAMBDA_RECOVERY_HOLD_FRAMES);
            if self.stable_streak >= LAMBDA_RECOVERY_HOLD_FRAMES
                && self.mixing_lambda < self.config.neural_confidence
            {
                self.mixing_lambda += LAMBDA_RECOVERY_STEP;
            }
        }

        compensated
    }

    /// Plain λ-mix, no state change
    pub fn blend(&self, neural: Vector6, statistical: Vector6) -> Vector6 {
        let lambda = self.mixing_lambda;
        neural * lambda + statistical * (1.0 - lambda)
    }

    /// Current neural share
    pub fn mixing_lambda(&self) -> f32 {
        self.mixing_lambda
    }

    /// Energy of the last step
    pub fn lyapunov_energy(&self) -> f32 {
        self.lyapunov_energy
    }

    /// Whether the last step stayed inside the margin
    pub fn stability_assured(&self) -> bool {
        self.stability_assured
    }

    /// Current adaptive gains
    pub fn adaptive_gains(&self) -> Vector6 {
        self.adaptive_gains
    }

    /// Last tracking error
    pub fn tracking_error(&self) -> Vector6 {
        self.tracking_error
    }

    /// Whether λ is held after a recent loss of stability
    pub fn recovery_held(&self) -> bool {
        self.stable_streak < LAMBDA_RECOVERY_HOLD_FRAMES
    }

    /// Reference model position
    pub fn reference_state(&self) -> Vector6 {
        self.reference_state
    }

    /// Reference model rate
    pub fn reference_output(&self) -> Vector6 {
        self.reference_output
    }

    /// Active configuration
    pub fn config(&self) -> &MracConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn blend_is_lambda_mix() {
        let mrac = ReferenceAdaptiveController::default();
        let out = mrac.blend(Vector6::splat(1.0), Vector6::ZERO);
        assert!((out.pitch - INITIAL_MIXING_LAMBDA).abs() < 1e-6);
        assert!((out.throttle - INITIAL_MIXING_LAMBDA).abs() < 1e-6);
    }

    #[test]
    fn lambda_recovers_to_ceiling_while_stable() {
        let mut mrac = ReferenceAdaptiveController::default();
        for _ in 0..200 {
            mrac.mix(Vector6::ZERO, Vector6::ZERO, Vector6::ZERO, DT);
        }
        assert!(mrac.stability_assured());
        assert!(mrac.mixing_lambda() >= DEFAULT_NEURAL_CONFIDENCE - 1e-6);
        assert!(mrac.mixing_lambda() <= DEFAULT_NEURAL_CONFIDENCE + LAMBDA_RECOVERY_STEP);
    }

    #[test]
    fn zero_input_stays_at_rest() {
        let mut mrac = ReferenceAdaptiveController::default();
        let out = mrac.mix(Vector6::ZERO, Vector6::ZERO, Vector6::ZERO, DT);
        assert_eq!(out, Vector6::ZERO);
        assert_eq!(mrac.lyapunov_energy(), 0.0);
    }

    #[test]
    fn gains_respect_bound() {
        let mut mrac = ReferenceAdaptiveController::default();
        for _ in 0..500 {
            mrac.mix(Vector6::splat(5.0), Vector6::splat(5.0), Vector6::ZERO, 0.1);
        }
        assert!(mrac.adaptive_gains().max_abs() <= SIGMA_BOUND);
        assert!(!mrac.stability_assured());
    }

    #[test]
    fn unstable_step_decays_lambda() {
        let mut mrac = ReferenceAdaptiveController::default();
        let before = mrac.mixing_lambda();
        mrac.mix(Vector6::splat(2.0), Vector6::splat(2.0), Vector6::ZERO, DT);
        assert!(!mrac.stability_assured());
        assert!((mrac.mixing_lambda() - before * LAMBDA_DECAY).abs() < 1e-6);
    }

    #[test]
    fn recovery_waits_for_hold_after_instability() {
        let mut mrac = ReferenceAdaptiveController::default();
        mrac.mix(Vector6::splat(2.0), Vector6::splat(2.0), Vector6::ZERO, DT);
        assert!(mrac.recovery_held());

        // At rest the tracking error vanishes
        mrac.mix(Vector6::ZERO, Vector6::ZERO, Vector6::ZERO, DT);
        assert!(mrac.stability_assured());
        let held = mrac.mixing_lambda();
        for _ in 2..LAMBDA_RECOVERY_HOLD_FRAMES {
            mrac.mix(Vector6::ZERO, Vector6::ZERO, Vector6::ZERO, DT);
            assert_eq!(mrac.mixing_lambda(), held);
        }
        for _ in 0..(2 * LAMBDA_RECOVERY_HOLD_FRAMES) {
            mrac.mix(Vector6::ZERO, Vector6::ZERO, Vector6::ZERO, DT);
        }
        assert!(!mrac.recovery_held());
        assert!(mrac.mixing_lambda() > held);
    }

    #[test]
    fn reset_restores_lambda() {
        let mut mrac = ReferenceAdaptiveController::default();
        mrac.mix(Vector6::splat(2.0), Vector6::splat(2.0), Vector6::ZERO, DT);
        mrac.reset();
        assert_eq!(mrac.mixing_lambda(), INITIAL_MIXING_LAMBDA);
        assert!(mrac.stability_assured());
        assert!(!mrac.recovery_held());
    }

    #[test]
    fn config_validation() {
        assert!(MracConfig::default().validate().is_ok());
        assert!(MracConfig::default().with_neural_confidence(1.5).validate().is_err());
    }
}
