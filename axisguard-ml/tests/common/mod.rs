//! Shared fixtures for the pipeline integration tests

#![allow(dead_code)]

use axisguard_core::{MockTimeSource, Vec2};
use axisguard_ml::{InputProcessor, ProcessorConfig};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// 60 Hz frame interval
pub const DT: f32 = 1.0 / 60.0;

/// Processor on a frozen mock clock the test keeps a handle to
pub fn processor(clock: &MockTimeSource, config: ProcessorConfig) -> InputProcessor<&MockTimeSource> {
    InputProcessor::with_clock(config, clock).expect("default-derived config is valid")
}

/// Feed rest samples until the neural path switches on; returns the frame count
pub fn run_to_production(processor: &mut InputProcessor<&MockTimeSource>) -> u32 {
    for frame in 1..=1_000 {
        processor.process(Vec2::ZERO, DT);
        if processor.neural_enabled() {
            return frame;
        }
    }
    panic!("neural path never enabled");
}

/// Seeded noise source for stick samples
pub struct StickNoise {
    rng: StdRng,
}

impl StickNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Rest position with sensor noise
    pub fn rest(&mut self, bias: Vec2, amplitude: f32) -> Vec2 {
        bias + Vec2::new(
            self.rng.gen_range(-amplitude..amplitude),
            self.rng.gen_range(-amplitude..amplitude),
        )
    }

    /// Anything a worn stick might report, including past full scale
    pub fn wild(&mut self) -> Vec2 {
        Vec2::new(self.rng.gen_range(-1.5..1.5), self.rng.gen_range(-1.5..1.5))
    }
}
