//! Calibration Lifecycle
//!
//! ```text
//!  Waiting ──(signal or 10 samples)──→ Statistical ──(≥5 s, confidence > 0.8)──→ Production
//!                                                                                  │    ▲
//!                                                              drift detected ─────┘    │
//!                                                                                  ▼    │
//!                                                                               Continual ── drift cleared
//! ```
//!
//! The phase only gates neural activation in the pipeline; statistical and
//! Kalman layers run in every phase.

use crate::{
    calibration::StatisticalCalibrator,
    constants::timing::{CONNECT_MAGNITUDE, CONNECT_SAMPLES, PRODUCTION_CONFIDENCE, STATISTICAL_PHASE_S},
    math::Vec2,
};

/// Where the calibrator is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum CalibrationPhase {
    /// No controller activity yet
    #[default]
    Waiting = 0,
    /// Gathering statistics; neural path off
    Statistical = 1,
    /// Calibrated; neural path allowed
    Production = 2,
    /// Calibrated, but the rest position is drifting
    Continual = 3,
}

impl From<u8> for CalibrationPhase {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Statistical,
            2 => Self::Production,
            3 => Self::Continual,
            _ => Self::Waiting,
        }
    }
}

impl CalibrationPhase {
    /// Short lowercase name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Statistical => "statistical",
            Self::Production => "production",
            Self::Continual => "continual",
        }
    }

    /// Calibration finished at least once
    pub const fn is_calibrated(self) -> bool {
        matches!(self, Self::Production | Self::Continual)
    }
}

impl core::fmt::Display for CalibrationPhase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CalibrationPhase {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.as_str())
    }
}

/// A phase change reported by [`CalibrationStateMachine::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTransition {
    /// Phase before the update
    pub from: CalibrationPhase,
    /// Phase after the update
    pub to: CalibrationPhase,
}

impl PhaseTransition {
    /// Whether this transition completed the statistical phase
    pub fn entered_production(&self) -> bool {
        self.from == CalibrationPhase::Statistical && self.to == CalibrationPhase::Production
    }
}

/// Drives [`CalibrationPhase`] from elapsed time and calibrator statistics
#[derive(Debug, Clone, Default)]
pub struct CalibrationStateMachine {
    phase: CalibrationPhase,
    /// Seconds since the last timer reset
    phase_timer: f32,
}

impl CalibrationStateMachine {
    /// Start in [`CalibrationPhase::Waiting`]
    pub const fn new() -> Self {
        Self {
            phase: CalibrationPhase::Waiting,
            phase_timer: 0.0,
        }
    }

    /// Back to Waiting with a zero timer
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Advance the timer by `dt` seconds and evaluate transitions
    ///
    /// The calibrator should already have seen `raw`.
    pub fn update(
        &mut self,
        raw: Vec2,
        dt: f32,
        calibrator: &StatisticalCalibrator,
    ) -> Option<PhaseTransition> {
        self.phase_timer += dt;

        let next = match self.phase {
            CalibrationPhase::Waiting => {
                let connected = raw.magnitude() > CONNECT_MAGNITUDE
                    || calibrator.sample_count() > CONNECT_SAMPLES;
                connected.then_some(CalibrationPhase::Statistical)
            }
            CalibrationPhase::Statistical => {
                let settled = self.phase_timer >= STATISTICAL_PHASE_S
                    && calibrator.confidence_level() > PRODUCTION_CONFIDENCE;
                settled.then_some(CalibrationPhase::Production)
            }
            CalibrationPhase::Production => calibrator
                .drift_detected()
                .then_some(CalibrationPhase::Continual),
            CalibrationPhase::Continual => (!calibrator.drift_detected())
                .then_some(CalibrationPhase::Production),
        }?;

        let transition = PhaseTransition { from: self.phase, to: next };
        if transition.entered_production() {
            self.phase_timer = 0.0;
        }
        self.phase = next;

        log_info!(
            "calibration phase {} -> {} after {} samples",
            transition.from,
            transition.to,
            calibrator.sample_count()
        );

        Some(transition)
    }

    /// Current phase
    pub fn phase(&self) -> CalibrationPhase {
        self.phase
    }

    /// Seconds accumulated since the timer was last reset
    pub fn phase_timer(&self) -> f32 {
        self.phase_timer
    }
}
