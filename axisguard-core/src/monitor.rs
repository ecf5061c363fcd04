//! Per-frame CPU Budget Monitor
//!
//! Measures wall time around one pipeline frame and trips a sticky breaker
//! when a frame exceeds the budget. The breaker does not interrupt the frame
//! it measures; the caller reacts on the next one.
//!
//! ```text
//! let timer = monitor.begin(&clock);
//! ... frame work ...
//! let verdict = monitor.finish(timer, &clock);
//! if verdict.over_budget { disable the expensive layer }
//! ```

use heapless::HistoryBuffer;

use crate::{
    constants::{buffers::LATENCY_HISTORY_SIZE, timing::DEFAULT_CPU_BUDGET_US},
    time::{elapsed_us, Timestamp, TimeSource},
};

/// Start mark of a measured frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "pass the timer to PerformanceMonitor::finish"]
pub struct FrameTimer {
    started_at: Timestamp,
}

impl FrameTimer {
    /// Timestamp the frame started at
    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }
}

/// Outcome of a measured frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameVerdict {
    /// Measured frame time
    pub elapsed_us: u64,
    /// This frame exceeded the budget
    pub over_budget: bool,
    /// This frame tripped the breaker for the first time since reset
    pub first_trip: bool,
}

/// Latency tracker with a sticky over-budget breaker
#[derive(Debug, Clone)]
pub struct PerformanceMonitor {
    cpu_budget_us: f32,
    budget_exceeded: bool,
    overrun_count: u32,
    frames: u64,
    last_latency_us: u64,
    worst_latency_us: u64,
    total_latency_us: u64,
    history: HistoryBuffer<u32, LATENCY_HISTORY_SIZE>,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_CPU_BUDGET_US)
    }
}

impl PerformanceMonitor {
    /// Monitor with the given per-frame budget in microseconds
    pub fn new(cpu_budget_us: f32) -> Self {
        Self {
            cpu_budget_us,
            budget_exceeded: false,
            overrun_count: 0,
            frames: 0,
            last_latency_us: 0,
            worst_latency_us: 0,
            total_latency_us: 0,
            history: HistoryBuffer::new(),
        }
    }

    /// Clear the breaker and all statistics
    pub fn reset(&mut self) {
        *self = Self::new(self.cpu_budget_us);
    }

    /// Mark the start of a frame
    pub fn begin<C: TimeSource>(&self, clock: &C) -> FrameTimer {
        FrameTimer { started_at: clock.now_us() }
    }

    /// Close a frame and judge it against the budget
    pub fn finish<C: TimeSource>(&mut self, timer: FrameTimer, clock: &C) -> FrameVerdict {
        let elapsed = elapsed_us(timer.started_at, clock.now_us());

        self.frames = self.frames.saturating_add(1);
        self.last_latency_us = elapsed;
        self.worst_latency_us = self.worst_latency_us.max(elapsed);
        self.total_latency_us = self.total_latency_us.saturating_add(elapsed);
        self.history.write(u32::try_from(elapsed).unwrap_or(u32::MAX));

        let over_budget = elapsed as f32 > self.cpu_budget_us;
        let first_trip = over_budget && !self.budget_exceeded;

        if over_budget {
            self.overrun_count = self.overrun_count.saturating_add(1);
            self.budget_exceeded = true;
        }

        if first_trip {
            log_warn!(
                "frame took {}us, budget {}us: neural path disabled until reset",
                elapsed,
                self.cpu_budget_us
            );
        }

        FrameVerdict {
            elapsed_us: elapsed,
            over_budget,
            first_trip,
        }
    }

    /// Whether any frame since reset exceeded the budget
    pub fn budget_exceeded(&self) -> bool {
        self.budget_exceeded
    }

    /// Frames that exceeded the budget since reset
    pub fn overrun_count(&self) -> u32 {
        self.overrun_count
    }

    /// Budget in microseconds
    pub fn cpu_budget_us(&self) -> f32 {
        self.cpu_budget_us
    }

    /// Frames measured since reset
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Latency of the most recent frame
    pub fn last_latency_us(&self) -> u64 {
        self.last_latency_us
    }

    /// Slowest frame since reset
    pub fn worst_latency_us(&self) -> u64 {
        self.worst_latency_us
    }

    /// Mean latency since reset (0 before the first frame)
    pub fn average_latency_us(&self) -> f32 {
        if self.frames == 0 {
            0.0
        } else {
            self.total_latency_us as f32 / self.frames as f32
        }
    }

    /// Recent latencies, oldest first
    pub fn recent_latencies(&self) -> impl Iterator<Item = u32> + '_ {
        self.history.oldest_ordered().copied()
    }

    /// Mean of the recent latency window
    pub fn recent_average_us(&self) -> f32 {
        let len = self.history.len();
        if len == 0 {
            return 0.0;
        }
        let sum: u64 = self.history.as_slice().iter().map(|&v| u64::from(v)).sum();
        sum as f32 / len as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::MockTimeSource;

    fn run_frame(monitor: &mut PerformanceMonitor, clock: &MockTimeSource, work_us: u64) -> FrameVerdict {
        let timer = monitor.begin(clock);
        clock.advance(work_us);
        monitor.finish(timer, clock)
    }

    #[test]
    fn within_budget() {
        let clock = MockTimeSource::new(0);
        let mut monitor = PerformanceMonitor::new(100.0);

        let verdict = run_frame(&mut monitor, &clock, 40);
        assert_eq!(verdict.elapsed_us, 40);
        assert!(!verdict.over_budget);
        assert!(!monitor.budget_exceeded());
        assert_eq!(monitor.average_latency_us(), 40.0);
    }

    #[test]
    fn breaker_is_sticky() {
        let clock = MockTimeSource::new(0);
        let mut monitor = PerformanceMonitor::new(100.0);

        let verdict = run_frame(&mut monitor, &clock, 150);
        assert!(verdict.over_budget && verdict.first_trip);

        let verdict = run_frame(&mut monitor, &clock, 10);
        assert!(!verdict.over_budget);
        assert!(monitor.budget_exceeded());

        let verdict = run_frame(&mut monitor, &clock, 200);
        assert!(verdict.over_budget && !verdict.first_trip);
        assert_eq!(monitor.overrun_count(), 2);
        assert_eq!(monitor.worst_latency_us(), 200);

        monitor.reset();
        assert!(!monitor.budget_exceeded());
        assert_eq!(monitor.frames(), 0);
        assert_eq!(monitor.cpu_budget_us(), 100.0);
    }

    #[test]
    fn history_keeps_recent_window() {
        let clock = MockTimeSource::new(0);
        let mut monitor = PerformanceMonitor::new(1_000.0);

        for i in 0..(LATENCY_HISTORY_SIZE as u64 + 10) {
            run_frame(&mut monitor, &clock, i);
        }

        let recent: heapless::Vec<u32, LATENCY_HISTORY_SIZE> = monitor.recent_latencies().collect();
        assert_eq!(recent.len(), LATENCY_HISTORY_SIZE);
        assert_eq!(recent[0], 10);
        assert_eq!(recent[LATENCY_HISTORY_SIZE - 1], LATENCY_HISTORY_SIZE as u32 + 9);
    }

    #[test]
    fn backwards_clock_counts_as_zero() {
        let clock = MockTimeSource::new(1_000);
        let mut monitor = PerformanceMonitor::default();
        let timer = monitor.begin(&clock);
        clock.set(500);
        let verdict = monitor.finish(timer, &clock);
        assert_eq!(verdict.elapsed_us, 0);
    }
}
