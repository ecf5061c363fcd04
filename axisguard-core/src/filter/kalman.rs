//! Adaptive Kalman Filter
//!
//! Two-state constant-signal filter with innovation gating. See the module
//! docs of [`crate::filter`] for the equations.
//!
//! ## Usage Example
//!
//! ```rust
//! use axisguard_core::{AdaptiveKalmanFilter, KalmanConfig, Vec2};
//!
//! let config = KalmanConfig::default()
//!     .with_process_noise(0.01)
//!     .with_measurement_noise(0.1);
//! let mut kf = AdaptiveKalmanFilter::new(config);
//!
//! for _ in 0..50 {
//!     kf.update(Vec2::new(0.5, 0.0));
//! }
//! assert!((kf.state().x - 0.5).abs() < 0.01);
//! ```

use crate::{
    constants::filter::*,
    errors::{ConfigError, ConfigResult},
    filter::matrix::{
        add, identity, invert2_or_identity, matvec, multiply, scaled_identity, sub, trace,
        SquareMatrix,
    },
    math::Vec2,
};

/// Kalman filter configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KalmanConfig {
    /// Diagonal of Q
    pub process_noise: f32,
    /// Diagonal of the initial P
    pub initial_covariance: f32,
    /// Diagonal of the nominal R
    pub base_measurement_noise: f32,
    /// R inflation on an outlier
    pub spike_multiplier: f32,
    /// Innovation z-score that flags an outlier
    pub outlier_z_score: f32,
    /// Whether outliers inflate R at all
    pub outlier_rejection: bool,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            process_noise: PROCESS_NOISE,
            initial_covariance: INITIAL_COVARIANCE,
            base_measurement_noise: BASE_MEASUREMENT_NOISE,
            spike_multiplier: SPIKE_MULTIPLIER,
            outlier_z_score: OUTLIER_Z_SCORE,
            outlier_rejection: true,
        }
    }
}

impl KalmanConfig {
    /// Set process noise (higher = less trust in the constant model)
    pub fn with_process_noise(mut self, noise: f32) -> Self {
        self.process_noise = noise;
        self
    }

    /// Set the nominal measurement noise
    pub fn with_measurement_noise(mut self, noise: f32) -> Self {
        self.base_measurement_noise = noise;
        self
    }

    /// Enable or disable spike rejection
    pub fn with_outlier_rejection(mut self, enabled: bool) -> Self {
        self.outlier_rejection = enabled;
        self
    }

    /// Check every noise parameter is finite and positive
    pub fn validate(&self) -> ConfigResult<()> {
        ConfigError::check_range("process_noise", self.process_noise, 1e-9, 10.0)?;
        ConfigError::check_range("initial_covariance", self.initial_covariance, 1e-9, 1e3)?;
        ConfigError::check_range(
            "base_measurement_noise",
            self.base_measurement_noise,
            1e-9,
            10.0,
        )?;
        ConfigError::check_range("spike_multiplier", self.spike_multiplier, 1.0, 1e5)?;
        ConfigError::check_range("outlier_z_score", self.outlier_z_score, 0.5, 100.0)?;
        Ok(())
    }
}

/// Kalman filter with adaptive measurement noise
#[derive(Debug, Clone)]
pub struct AdaptiveKalmanFilter {
    /// Current state estimate
    state: Vec2,
    /// Estimation error covariance
    covariance: SquareMatrix<2>,
    /// Process noise (fixed)
    process_noise: SquareMatrix<2>,
    /// Measurement noise (adaptive)
    measurement_noise: SquareMatrix<2>,
    /// Last innovation z-score
    innovation_z_score: f32,
    confidence: f32,
    outlier_count: u32,
    config: KalmanConfig,
}

impl Default for AdaptiveKalmanFilter {
    fn default() -> Self {
        Self::new(KalmanConfig::default())
    }
}

impl AdaptiveKalmanFilter {
    /// Create a filter at the origin with high initial uncertainty
    pub fn new(config: KalmanConfig) -> Self {
        Self {
            state: Vec2::ZERO,
            covariance: scaled_identity(config.initial_covariance),
            process_noise: scaled_identity(config.process_noise),
            measurement_noise: scaled_identity(config.base_measurement_noise),
            innovation_z_score: 0.0,
            confidence: 1.0,
            outlier_count: 0,
            config,
        }
    }

    /// Restore initial values
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    /// Fold one measurement into the estimate and return the new state
    pub fn update(&mut self, measurement: Vec2) -> Vec2 {
        // Predict: constant model, F = I
        let predicted = self.state;
        let predicted_cov = add(&self.covariance, &self.process_noise);

        let innovation = measurement - predicted;

        let expected = libm::sqrtf(trace(&predicted_cov).max(0.0));
        self.innovation_z_score = if expected < MIN_EXPECTED_INNOVATION {
            0.0
        } else {
            innovation.magnitude() / expected
        };

        if self.config.outlier_rejection && self.innovation_z_score > self.config.outlier_z_score {
            self.inflate_measurement_noise();
            self.confidence *= CONFIDENCE_PENALTY;
            self.outlier_count = self.outlier_count.saturating_add(1);
            log_debug!(
                "kalman outlier: z={:.1}, count={}",
                self.innovation_z_score,
                self.outlier_count
            );
        } else {
            self.relax_measurement_noise();
            self.confidence = (self.confidence * CONFIDENCE_RECOVERY).min(1.0);
        }

        // Update
        let innovation_cov = add(&predicted_cov, &self.measurement_noise);
        let gain = multiply(
            &predicted_cov,
            &invert2_or_identity(&innovation_cov, SINGULAR_DETERMINANT),
        );

        let correction = matvec(&gain, &[innovation.x, innovation.y]);
        self.state = predicted + Vec2::new(correction[0], correction[1]);
        self.covariance = multiply(&sub(&identity(), &gain), &predicted_cov);

        self.state
    }

    fn inflate_measurement_noise(&mut self) {
        for i in 0..2 {
            self.measurement_noise[i][i] =
                (self.measurement_noise[i][i] * self.config.spike_multiplier).min(MAX_MEASUREMENT_NOISE);
        }
    }

    fn relax_measurement_noise(&mut self) {
        let base = self.config.base_measurement_noise;
        for i in 0..2 {
            self.measurement_noise[i][i] = NOISE_RECOVERY_DECAY * self.measurement_noise[i][i]
                + (1.0 - NOISE_RECOVERY_DECAY) * base;
        }
    }

    /// Current estimate
    pub fn state(&self) -> Vec2 {
        self.state
    }

    /// Estimation error covariance
    pub fn covariance(&self) -> &SquareMatrix<2> {
        &self.covariance
    }

    /// Current (adapted) measurement noise
    pub fn measurement_noise(&self) -> &SquareMatrix<2> {
        &self.measurement_noise
    }

    /// z-score of the most recent innovation
    pub fn innovation_z_score(&self) -> f32 {
        self.innovation_z_score
    }

    /// Measurement trust, 0..=1
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Measurements flagged as outliers since construction or reset
    pub fn outlier_count(&self) -> u32 {
        self.outlier_count
    }

    /// Active configuration
    pub fn config(&self) -> &KalmanConfig {
        &self.config
    }
}
