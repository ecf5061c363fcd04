//! Time Source Abstraction
//!
//! The pipeline needs time for two things: measuring how long a frame took
//! (against a budget of ~100µs) and tracking how long a controller has been
//! connected. Both go through [`TimeSource`] so the same code runs on a
//! hardware timer, on `std::time::Instant`, or on a scripted clock in tests.
//!
//! ## Design Goals
//!
//! - **Platform Independence**: bare metal, RTOS and desktop
//! - **Testability**: a mock clock makes budget overruns reproducible
//! - **Efficiency**: zero allocation, one call per read
//!
//! ## Implementations
//!
//! - `MonotonicTime`: `std::time::Instant` based (requires `std`)
//! - `MockTimeSource`: scripted time with optional auto-advance per read

use core::cell::Cell;

/// Timestamp in microseconds since an arbitrary epoch (usually boot)
pub type Timestamp = u64;

/// Source of time for the pipeline
///
/// ## Implementation Requirements
///
/// - `now_us()` must never go backwards for monotonic sources
/// - Precision should be documented for each implementation
///
/// ## Example Implementation
///
/// ```rust
/// use axisguard_core::time::{TimeSource, Timestamp};
///
/// struct CycleCounter {
///     cycles_per_us: u32,
/// }
///
/// impl TimeSource for CycleCounter {
///     fn now_us(&self) -> Timestamp {
///         // Read DWT->CYCCNT and divide by cycles_per_us
///         0 // placeholder
///     }
///
///     fn is_monotonic(&self) -> bool {
///         true
///     }
///
///     fn precision_us(&self) -> u32 {
///         1
///     }
/// }
/// ```
pub trait TimeSource {
    /// Current timestamp in microseconds
    fn now_us(&self) -> Timestamp;

    /// Whether the source never goes backwards
    fn is_monotonic(&self) -> bool;

    /// Smallest interval this source can resolve, in microseconds
    ///
    /// A budget check is only meaningful when this is well below the budget.
    fn precision_us(&self) -> u32;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now_us(&self) -> Timestamp {
        (**self).now_us()
    }

    fn is_monotonic(&self) -> bool {
        (**self).is_monotonic()
    }

    fn precision_us(&self) -> u32 {
        (**self).precision_us()
    }
}

/// Monotonic time source backed by `std::time::Instant`
///
/// Starts at 0 when created.
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct MonotonicTime {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicTime {
    /// Create a clock whose epoch is now
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for MonotonicTime {
    fn now_us(&self) -> Timestamp {
        self.origin.elapsed().as_micros() as Timestamp
    }

    fn is_monotonic(&self) -> bool {
        true
    }

    fn precision_us(&self) -> u32 {
        1
    }
}

/// Scripted time source for testing
///
/// Interior mutability lets a test keep a shared reference while the
/// processor owns `&MockTimeSource` as its clock. With a non-zero step the
/// clock advances by `step_us` after every read, which is how tests force a
/// frame over budget.
///
/// ```rust
/// use axisguard_core::time::{MockTimeSource, TimeSource};
///
/// let clock = MockTimeSource::new(1_000);
/// assert_eq!(clock.now_us(), 1_000);
///
/// clock.set_step(50);
/// assert_eq!(clock.now_us(), 1_000);
/// assert_eq!(clock.now_us(), 1_050);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTimeSource {
    now: Cell<Timestamp>,
    step_us: Cell<u64>,
}

impl MockTimeSource {
    /// Create a frozen clock at `start`
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Cell::new(start),
            step_us: Cell::new(0),
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, timestamp: Timestamp) {
        self.now.set(timestamp);
    }

    /// Advance by `us` microseconds
    pub fn advance(&self, us: u64) {
        self.now.set(self.now.get().saturating_add(us));
    }

    /// Advance by `step_us` after every read (0 freezes the clock)
    pub fn set_step(&self, step_us: u64) {
        self.step_us.set(step_us);
    }
}

impl TimeSource for MockTimeSource {
    fn now_us(&self) -> Timestamp {
        let now = self.now.get();
        self.now.set(now.saturating_add(self.step_us.get()));
        now
    }

    fn is_monotonic(&self) -> bool {
        true
    }

    fn precision_us(&self) -> u32 {
        1
    }
}

/// Microseconds elapsed between two readings, 0 if the clock went backwards
#[inline]
pub fn elapsed_us(start: Timestamp, end: Timestamp) -> u64 {
    end.saturating_sub(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_clock_is_frozen_by_default() {
        let clock = MockTimeSource::new(42);
        assert_eq!(clock.now_us(), 42);
        assert_eq!(clock.now_us(), 42);
    }

    #[test]
    fn mock_clock_steps_per_read() {
        let clock = MockTimeSource::new(0);
        clock.set_step(10);
        assert_eq!(clock.now_us(), 0);
        assert_eq!(clock.now_us(), 10);
        clock.set_step(0);
        assert_eq!(clock.now_us(), 20);
        assert_eq!(clock.now_us(), 20);
    }

    #[test]
    fn borrowed_clock_shares_state() {
        let clock = MockTimeSource::new(0);
        let borrowed: &MockTimeSource = &clock;
        clock.advance(500);
        assert_eq!(borrowed.now_us(), 500);
    }

    #[test]
    fn elapsed_saturates() {
        assert_eq!(elapsed_us(100, 250), 150);
        assert_eq!(elapsed_us(250, 100), 0);
    }

    #[cfg(feature = "std")]
    #[test]
    fn monotonic_time_advances() {
        let clock = MonotonicTime::new();
        let a = clock.now_us();
        let b = clock.now_us();
        assert!(b >= a);
    }
}
