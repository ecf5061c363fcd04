//! Shared fixtures for the core integration tests
//!
//! Deterministic stick signals: a seeded xorshift generator, rest noise around
//! a bias, and a pre-trained calibrator.

#![allow(dead_code)]

use axisguard_core::{StatisticalCalibrator, Vec2};

/// Nominal polling interval in microseconds (60 Hz)
pub const FRAME_US: u64 = 16_667;

/// Seeded xorshift32; reproducible noise without a dev-dependency
pub struct TestRng {
    state: u32,
}

impl TestRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        self.state
    }

    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / 16777216.0
    }

    pub fn gen_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }
}

/// A resting stick: `bias` plus uniform noise of `±amplitude` per axis
pub fn rest_sample(rng: &mut TestRng, bias: Vec2, amplitude: f32) -> Vec2 {
    bias + Vec2::new(
        rng.gen_range(-amplitude, amplitude),
        rng.gen_range(-amplitude, amplitude),
    )
}

/// Calibrator fed `samples` noisy rest samples at 60 Hz
pub fn rested_calibrator(seed: u32, bias: Vec2, amplitude: f32, samples: u32) -> StatisticalCalibrator {
    let mut rng = TestRng::new(seed);
    let mut calibrator = StatisticalCalibrator::default();
    for i in 0..samples {
        calibrator.update(rest_sample(&mut rng, bias, amplitude), i as u64 * FRAME_US);
    }
    calibrator
}
