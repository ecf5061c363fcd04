//! Built-in latency benchmark
//!
//! Drives the processor with a slow circular sweep at 62.5 Hz and reports
//! frame latency against the CPU budget. The sweep runs on the live
//! processor, so calibration advances exactly as it would under real input;
//! call [`InputProcessor::reset`] afterwards to start clean.

use core::fmt;

use axisguard_core::{
    constants::timing::{BENCHMARK_FRAME_DT_S, NEURAL_TARGET_US},
    TimeSource, Vec2,
};

use crate::pipeline::{InputProcessor, ProcessorState};

/// Sweep radius
const BENCHMARK_RADIUS: f32 = 0.8;
/// Angle step per frame (radians)
const BENCHMARK_ANGLE_STEP: f32 = 0.01;

/// Result of [`InputProcessor::run_benchmark`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BenchmarkReport {
    /// Frames processed
    pub frames: u32,
    /// Mean frame latency
    pub average_us: f32,
    /// Slowest frame
    pub worst_us: u64,
    /// Latency of the last neural inference
    pub last_inference_us: u64,
    /// Frames that ran the neural path
    pub neural_frames: u64,
    /// Size of the per-source state
    pub memory_footprint_bytes: usize,
    /// Budget the run was measured against
    pub budget_us: f32,
}

impl BenchmarkReport {
    /// Mean latency within the CPU budget
    pub fn within_budget(&self) -> bool {
        self.frames > 0 && self.average_us <= self.budget_us
    }

    /// Last inference within the neural latency target
    pub fn inference_within_target(&self) -> bool {
        self.last_inference_us as f32 <= NEURAL_TARGET_US
    }
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Benchmark ({} frames):", self.frames)?;
        writeln!(
            f,
            "  Average processing time: {:.1}us (target: <{:.0}us)",
            self.average_us, self.budget_us
        )?;
        writeln!(f, "  Worst frame: {}us", self.worst_us)?;
        writeln!(
            f,
            "  Neural inference time: {}us (target: <{:.0}us, {} frames)",
            self.last_inference_us, NEURAL_TARGET_US, self.neural_frames
        )?;
        writeln!(f, "  Memory footprint: {} bytes", self.memory_footprint_bytes)?;
        write!(
            f,
            "  Performance target: {}",
            if self.within_budget() { "MET" } else { "MISSED" }
        )
    }
}

/// Sweep sample for frame `i`
pub fn sweep_sample(i: u32) -> Vec2 {
    let angle = i as f32 * BENCHMARK_ANGLE_STEP;
    Vec2::new(
        BENCHMARK_RADIUS * libm::sinf(angle),
        BENCHMARK_RADIUS * libm::cosf(angle),
    )
}

impl<C: TimeSource> InputProcessor<C> {
    /// Feed `frames` sweep samples and report latency
    pub fn run_benchmark(&mut self, frames: u32) -> BenchmarkReport {
        let inferences_before = self.state().network.total_inferences();

        let mut total_us: u64 = 0;
        let mut worst_us: u64 = 0;
        for i in 0..frames {
            self.process(sweep_sample(i), BENCHMARK_FRAME_DT_S);
            let elapsed = self.metrics().total_us;
            total_us = total_us.saturating_add(elapsed);
            worst_us = worst_us.max(elapsed);
        }

        let state = self.state();
        let report = BenchmarkReport {
            frames,
            average_us: if frames == 0 { 0.0 } else { total_us as f32 / frames as f32 },
            worst_us,
            last_inference_us: state.network.last_inference_us(),
            neural_frames: state.network.total_inferences() - inferences_before,
            memory_footprint_bytes: core::mem::size_of::<ProcessorState>(),
            budget_us: self.config().cpu_budget_us,
        };

        log_info!(
            "benchmark: {} frames, avg {:.1}us, worst {}us",
            report.frames,
            report.average_us,
            report.worst_us
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ProcessorConfig;
    use axisguard_core::MockTimeSource;

    #[test]
    fn sweep_stays_on_circle() {
        for i in [0, 100, 314, 1000] {
            assert!((sweep_sample(i).magnitude() - BENCHMARK_RADIUS).abs() < 1e-5);
        }
    }

    #[test]
    fn frozen_clock_meets_budget() {
        let mut processor =
            InputProcessor::with_clock(ProcessorConfig::default(), MockTimeSource::new(0)).unwrap();
        let report = processor.run_benchmark(1000);

        assert_eq!(report.frames, 1000);
        assert_eq!(report.average_us, 0.0);
        assert!(report.within_budget());
        // 5 s of statistics at 62.5 Hz, then the neural path runs
        assert!(report.neural_frames > 600);
        assert!(report.memory_footprint_bytes > 0);
    }

    #[test]
    fn slow_clock_misses_budget() {
        let clock = MockTimeSource::new(0);
        clock.set_step(50);
        let mut processor = InputProcessor::with_clock(ProcessorConfig::default(), clock).unwrap();
        let report = processor.run_benchmark(10);

        assert!(!report.within_budget());
        assert!(report.worst_us > 100);
        assert_eq!(report.neural_frames, 0);
    }

    #[test]
    fn empty_run() {
        let mut processor =
            InputProcessor::with_clock(ProcessorConfig::default(), MockTimeSource::new(0)).unwrap();
        let report = processor.run_benchmark(0);
        assert!(!report.within_budget());
        assert_eq!(report.average_us, 0.0);
    }
}
