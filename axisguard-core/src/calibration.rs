//! Online Statistical Calibration
//!
//! ## Overview
//!
//! Analog sticks never rest exactly at the centre, their noise floor varies
//! between units, and few of them reach a full 1.0 on every axis. This layer
//! learns all three properties online, one sample at a time, and uses them to
//! map raw samples to a centred, deadzoned, full-range signal.
//!
//! ## Estimators
//!
//! ### Rest position (bias) and noise
//!
//! Samples with `|raw| < rest_threshold` are treated as "stick released":
//! ```text
//! δ  = raw − μ
//! μ  = μ + α·δ
//! δ₂ = raw − μ
//! M2 = (1 − α)·M2 + α·δ·δ₂        (single-pole variance estimate)
//! σ  = √M2                         (per axis)
//! ```
//!
//! ### Extent (gain)
//!
//! Samples with `|raw| > percentile_threshold` pull the per-axis extent toward
//! the observed deflection: `m_max = 0.999·m_max + 0.001·|raw|`.
//!
//! ### Derived values
//! ```text
//! deadzone   = |μ| + 3·|σ|
//! gain       = |m_max|
//! confidence = min(1, n / 300)
//! ```
//!
//! ### Drift
//!
//! The rest mean is pushed into a 60-slot ring every sample. Once past the
//! warm-up, a shift of more than 0.05 between the current mean and the oldest
//! snapshot raises `drift_detected`; the flag clears when the shift settles.
//!
//! ## Correction
//!
//! Until `min_samples` have been seen the statistics are not trusted and a
//! fixed 10% radial deadzone is applied instead. Afterwards the sample is
//! centred on μ, zeroed inside the learned deadzone, normalized by the learned
//! extent and radially rescaled so the deadzone edge maps to 0.

use crate::{
    buffer::CircularBuffer,
    constants::{
        buffers::DRIFT_HISTORY_SIZE,
        calibration::*,
        timing::US_PER_MS,
    },
    errors::{ConfigError, ConfigResult},
    math::Vec2,
    time::Timestamp,
};

/// Calibrator tuning
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibratorConfig {
    /// EMA rate for rest mean and variance
    pub alpha: f32,
    /// Magnitude below which a sample is a rest sample
    pub rest_threshold: f32,
    /// Magnitude above which a sample updates the extent
    pub percentile_threshold: f32,
    /// EMA rate for the extent
    pub extreme_learning_rate: f32,
    /// Samples required before learned statistics are used
    pub min_samples: u32,
    /// Deadzone multiplier on |σ|
    pub sigma_multiplier: f32,
    /// Deadzone radius before statistics are trusted
    pub fixed_deadzone: f32,
    /// Extent assumed before any rim samples
    pub initial_extent: f32,
    /// Rest-mean shift that counts as drift
    pub drift_threshold: f32,
}

impl Default for CalibratorConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            rest_threshold: REST_THRESHOLD,
            percentile_threshold: PERCENTILE_THRESHOLD,
            extreme_learning_rate: EXTREME_LEARNING_RATE,
            min_samples: MIN_SAMPLES_FOR_TRUST,
            sigma_multiplier: SIGMA_MULTIPLIER,
            fixed_deadzone: FIXED_DEADZONE,
            initial_extent: INITIAL_EXTENT,
            drift_threshold: DRIFT_THRESHOLD,
        }
    }
}

impl CalibratorConfig {
    /// Set the rest EMA rate
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the rest threshold
    pub fn with_rest_threshold(mut self, threshold: f32) -> Self {
        self.rest_threshold = threshold;
        self
    }

    /// Set the number of samples before statistics are trusted
    pub fn with_min_samples(mut self, samples: u32) -> Self {
        self.min_samples = samples;
        self
    }

    /// Reject values that would make the estimator diverge
    pub fn validate(&self) -> ConfigResult<()> {
        ConfigError::check_range("alpha", self.alpha, 0.0, 1.0)?;
        ConfigError::check_range("extreme_learning_rate", self.extreme_learning_rate, 0.0, 1.0)?;
        ConfigError::check_range("rest_threshold", self.rest_threshold, 0.0, 1.0)?;
        ConfigError::check_range("percentile_threshold", self.percentile_threshold, 0.0, 2.0)?;
        ConfigError::check_range("sigma_multiplier", self.sigma_multiplier, 0.0, 10.0)?;
        ConfigError::check_range("fixed_deadzone", self.fixed_deadzone, 0.0, 0.9)?;
        ConfigError::check_range("initial_extent", self.initial_extent, 0.1, 2.0)?;
        ConfigError::check_range("drift_threshold", self.drift_threshold, 0.0, 1.0)?;

        if self.rest_threshold >= self.percentile_threshold {
            return Err(ConfigError::Inconsistent {
                reason: "rest_threshold must be below percentile_threshold",
            });
        }

        Ok(())
    }
}

/// Online bias/deadzone/gain estimator for one stick
#[derive(Clone)]
pub struct StatisticalCalibrator {
    config: CalibratorConfig,
    /// Running rest mean
    mu: Vec2,
    /// Variance accumulator
    m2: Vec2,
    /// Per-axis standard deviation at rest
    sigma: Vec2,
    /// Per-axis positive extent
    m_max: Vec2,
    /// Per-axis negative extent
    m_min: Vec2,
    sample_count: u32,
    confidence_level: f32,
    dynamic_deadzone_estimate: f32,
    gain_estimate: f32,
    connected_at: Timestamp,
    controller_age_ms: u64,
    drift_history: CircularBuffer<Vec2, DRIFT_HISTORY_SIZE>,
    drift_detected: bool,
}

impl Default for StatisticalCalibrator {
    fn default() -> Self {
        Self::new(CalibratorConfig::default(), 0)
    }
}

impl StatisticalCalibrator {
    /// Create a calibrator for a controller connected at `connected_at`
    pub fn new(config: CalibratorConfig, connected_at: Timestamp) -> Self {
        let extent = config.initial_extent;
        Self {
            config,
            mu: Vec2::ZERO,
            m2: Vec2::ZERO,
            sigma: Vec2::ZERO,
            m_max: Vec2::new(extent, extent),
            m_min: Vec2::new(-extent, -extent),
            sample_count: 0,
            confidence_level: 0.0,
            dynamic_deadzone_estimate: 0.0,
            gain_estimate: 0.0,
            connected_at,
            controller_age_ms: 0,
            drift_history: CircularBuffer::new(),
            drift_detected: false,
        }
    }

    /// Restore defaults, keeping the configuration
    pub fn reset(&mut self, connected_at: Timestamp) {
        *self = Self::new(self.config, connected_at);
    }

    /// Fold one raw sample into the statistics
    ///
    /// Always counts the sample; rest and rim samples additionally update
    /// the bias and extent estimates.
    pub fn update(&mut self, raw: Vec2, timestamp: Timestamp) {
        let alpha = self.config.alpha;
        self.sample_count = self.sample_count.saturating_add(1);

        let magnitude = raw.magnitude();

        if magnitude < self.config.rest_threshold {
            let delta = raw - self.mu;
            self.mu = self.mu + delta * alpha;

            let delta2 = raw - self.mu;
            self.m2 = self.m2 * (1.0 - alpha) + delta.hadamard(delta2) * alpha;
            // Guard against -0.0 / rounding below zero
            self.m2 = Vec2::new(self.m2.x.max(0.0), self.m2.y.max(0.0));
            self.sigma = Vec2::new(libm::sqrtf(self.m2.x), libm::sqrtf(self.m2.y));
        }

        if magnitude > self.config.percentile_threshold {
            let rate = self.config.extreme_learning_rate;
            let reach = raw.abs();
            self.m_max = self.m_max * (1.0 - rate) + reach * rate;
            self.m_min = self.m_min * (1.0 - rate) - reach * rate;
        }

        self.dynamic_deadzone_estimate =
            self.mu.magnitude() + self.config.sigma_multiplier * self.sigma.magnitude();
        self.gain_estimate = self.m_max.magnitude();
        self.confidence_level =
            (self.sample_count as f32 / FULL_CONFIDENCE_SAMPLES as f32).min(1.0);
        self.controller_age_ms = timestamp.saturating_sub(self.connected_at) / US_PER_MS;

        self.track_drift();
    }

    fn track_drift(&mut self) {
        self.drift_history.push(self.mu);

        if self.sample_count <= DRIFT_WARMUP_SAMPLES {
            return;
        }

        if let Some(&oldest) = self.drift_history.oldest() {
            let shift = (self.mu - oldest).magnitude();
            let drifting = shift > self.config.drift_threshold;

            if drifting != self.drift_detected {
                if drifting {
                    log_debug!("rest drift {:.3} over {} samples", shift, DRIFT_HISTORY_SIZE);
                } else {
                    log_debug!("rest drift settled");
                }
            }
            self.drift_detected = drifting;
        }
    }

    /// Map a raw sample to a centred, deadzoned, normalized sample
    ///
    /// Inside the deadzone the result is exactly `(0, 0)`.
    pub fn correct(&self, raw: Vec2) -> Vec2 {
        if self.sample_count < self.config.min_samples {
            return self.fixed_deadzone(raw);
        }

        let centered = raw - self.mu;
        let input_magnitude = centered.magnitude();
        let deadzone = self.dynamic_deadzone_estimate;

        if input_magnitude < deadzone {
            return Vec2::ZERO;
        }

        let range = self.m_max - self.mu.abs();
        let normalized = Vec2::new(
            normalize_axis(centered.x, range.x),
            normalize_axis(centered.y, range.y),
        )
        .clamp(-1.0, 1.0);

        let live_range = 1.0 - deadzone;
        let norm_magnitude = normalized.magnitude();
        if norm_magnitude <= MIN_DIRECTION_MAGNITUDE || live_range <= MIN_LIVE_RANGE {
            return Vec2::ZERO;
        }

        let scale = ((input_magnitude - deadzone) / live_range).clamp(0.0, 1.0);
        normalized * (scale / norm_magnitude)
    }

    fn fixed_deadzone(&self, raw: Vec2) -> Vec2 {
        let deadzone = self.config.fixed_deadzone;
        let magnitude = raw.magnitude();

        if magnitude < deadzone || magnitude <= 0.0 {
            return Vec2::ZERO;
        }

        let scale = ((magnitude - deadzone) / (1.0 - deadzone)).min(1.0);
        raw * (scale / magnitude)
    }

    /// Running rest mean
    pub fn mean(&self) -> Vec2 {
        self.mu
    }

    /// Per-axis rest standard deviation
    pub fn sigma(&self) -> Vec2 {
        self.sigma
    }

    /// Per-axis positive extent
    pub fn extent_max(&self) -> Vec2 {
        self.m_max
    }

    /// Per-axis negative extent
    pub fn extent_min(&self) -> Vec2 {
        self.m_min
    }

    /// Samples seen since construction or reset
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Trust in the statistics, 0..=1
    pub fn confidence_level(&self) -> f32 {
        self.confidence_level
    }

    /// Learned deadzone radius
    pub fn dynamic_deadzone_estimate(&self) -> f32 {
        self.dynamic_deadzone_estimate
    }

    /// Learned extent magnitude
    pub fn gain_estimate(&self) -> f32 {
        self.gain_estimate
    }

    /// Milliseconds since the controller was connected
    pub fn controller_age_ms(&self) -> u64 {
        self.controller_age_ms
    }

    /// Rest mean moved more than the drift threshold within the window
    pub fn drift_detected(&self) -> bool {
        self.drift_detected
    }

    /// Active configuration
    pub fn config(&self) -> &CalibratorConfig {
        &self.config
    }
}

#[inline]
fn normalize_axis(centered: f32, range: f32) -> f32 {
    if range < MIN_AXIS_RANGE {
        0.0
    } else {
        centered / range
    }
}
