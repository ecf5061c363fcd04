//! AxisGuard Basic Processing Example
//!
//! Feeds a simulated worn stick through the full pipeline:
//! - 3 s of rest with a small bias and sensor noise
//! - slow circular sweeps
//! - a single electrical spike
//!
//! and prints the calibration lifecycle and final diagnostics.

use axisguard_core::{CalibrationPhase, Vec2};
use axisguard_ml::{InputProcessor, ProcessorConfig};

/// Simulated stick with a fixed rest bias and deterministic noise
struct StickSimulator {
    frame: u32,
    bias: Vec2,
    noise_state: u32,
}

impl StickSimulator {
    fn new() -> Self {
        Self {
            frame: 0,
            bias: Vec2::new(0.02, -0.015),
            noise_state: 0xC0FFEE,
        }
    }

    fn noise(&mut self) -> f32 {
        self.noise_state ^= self.noise_state << 13;
        self.noise_state ^= self.noise_state >> 17;
        self.noise_state ^= self.noise_state << 5;
        ((self.noise_state >> 8) as f32 / 16_777_216.0 - 0.5) * 0.01
    }

    fn next_sample(&mut self) -> Vec2 {
        self.frame += 1;
        let jitter = Vec2::new(self.noise(), self.noise());

        let seconds = self.frame as f32 / 60.0;
        let base = if seconds < 3.0 {
            Vec2::ZERO
        } else if self.frame == 600 {
            Vec2::new(3.0, -3.0)
        } else {
            let angle = seconds * 0.8;
            Vec2::new(0.7 * angle.sin(), 0.7 * angle.cos())
        };

        base + self.bias + jitter
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut processor = InputProcessor::new(ProcessorConfig::default())?;
    let mut stick = StickSimulator::new();
    let mut last_phase = processor.phase();

    println!("=== AxisGuard basic processing ===\n");

    for frame in 1..=900 {
        let raw = stick.next_sample();
        let command = processor.process(raw, 1.0 / 60.0);

        if processor.phase() != last_phase {
            println!(
                "frame {:4}: {} -> {}",
                frame,
                last_phase,
                processor.phase()
            );
            last_phase = processor.phase();
        }

        if frame % 150 == 0 || frame == 600 {
            println!(
                "frame {:4}: raw=({:+.3}, {:+.3}) pitch={:+.3} yaw={:+.3} lambda={:.3}",
                frame,
                raw.x,
                raw.y,
                command.pitch,
                command.yaw,
                processor.diagnostics().mixing_lambda
            );
        }
    }

    let diagnostics = processor.diagnostics();
    println!("\n{}\n", diagnostics);

    if diagnostics.phase == CalibrationPhase::Production && !processor.neural_enabled() {
        println!("Note: a frame exceeded the CPU budget; the neural path stays off until reset.");
    }

    Ok(())
}
