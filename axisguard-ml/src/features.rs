//! Feature Extraction
//!
//! Builds the fixed-width network input from the filtered sample, the
//! calibrator's statistics and the previous frame. Pure: everything carried
//! between frames is passed in explicitly.
//!
//! ```text
//! index  feature            source
//! 0..2   raw_lx, raw_ly     filtered sample
//! 2      raw_magnitude      |filtered|
//! 3..5   delta_lx, delta_ly filtered − previous filtered
//! 5      deadzone_estimate  calibrator
//! 6      gain_estimate      calibrator
//! 7      age_norm           controller age / 10 min, capped at 1
//! 8..14  prev_output        previous 6-DoF output, int16
//! ```

use axisguard_core::{
    constants::calibration::MAX_CONTROLLER_AGE_MS, StatisticalCalibrator, Vec2, Vector6,
};

/// Number of network inputs a [`FeatureVector`] expands to
pub const FEATURE_COUNT: usize = 14;

/// Full scale of the int16 output history
const HISTORY_SCALE: f32 = 32767.0;

/// One frame's network input
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureVector {
    /// Filtered x
    pub raw_lx: f32,
    /// Filtered y
    pub raw_ly: f32,
    /// Magnitude of the filtered sample
    pub raw_magnitude: f32,
    /// x change since the previous frame
    pub delta_lx: f32,
    /// y change since the previous frame
    pub delta_ly: f32,
    /// Learned deadzone radius
    pub deadzone_estimate: f32,
    /// Learned extent magnitude
    pub gain_estimate: f32,
    /// Controller age normalized to `[0, 1]`
    pub age_norm: f32,
    /// Previous output, clamped to `[-1, 1]` and scaled to int16
    pub prev_output: [i16; 6],
}

impl FeatureVector {
    /// Flatten into the 14 network inputs, history dequantized to `[-1, 1]`
    pub fn network_inputs(&self) -> [f32; FEATURE_COUNT] {
        let mut inputs = [0.0; FEATURE_COUNT];
        inputs[..8].copy_from_slice(&[
            self.raw_lx,
            self.raw_ly,
            self.raw_magnitude,
            self.delta_lx,
            self.delta_ly,
            self.deadzone_estimate,
            self.gain_estimate,
            self.age_norm,
        ]);
        for (slot, &v) in inputs[8..].iter_mut().zip(self.prev_output.iter()) {
            *slot = v as f32 / HISTORY_SCALE;
        }
        inputs
    }
}

/// Stateless builder for [`FeatureVector`]
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Build this frame's features
    pub fn extract(
        filtered: Vec2,
        calibrator: &StatisticalCalibrator,
        previous_filtered: Vec2,
        previous_output: Vector6,
    ) -> FeatureVector {
        let delta = filtered - previous_filtered;
        let age_norm = (calibrator.controller_age_ms() as f32 / MAX_CONTROLLER_AGE_MS).min(1.0);

        let mut prev_output = [0i16; 6];
        for (slot, v) in prev_output.iter_mut().zip(previous_output.to_array()) {
            *slot = quantize_history(v);
        }

        FeatureVector {
            raw_lx: filtered.x,
            raw_ly: filtered.y,
            raw_magnitude: filtered.magnitude(),
            delta_lx: delta.x,
            delta_ly: delta.y,
            deadzone_estimate: calibrator.dynamic_deadzone_estimate(),
            gain_estimate: calibrator.gain_estimate(),
            age_norm,
            prev_output,
        }
    }
}

#[inline]
fn quantize_history(v: f32) -> i16 {
    // `as` saturates and maps NaN to 0
    (v.clamp(-1.0, 1.0) * HISTORY_SCALE) as i16
}
