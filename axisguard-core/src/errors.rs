//! Error Types for Configuration Failures
//!
//! ## Design Philosophy
//!
//! The per-frame path has no error class at all: every numeric edge case
//! (near-zero divisors, singular covariance, missing calibration data, CPU
//! overrun, MRAC divergence) degrades to a defined fallback instead of
//! failing. Errors only exist where a caller hands us something we can reject
//! up front, i.e. at construction time.
//!
//! Like the rest of the crate the error type is embedded-friendly:
//!
//! 1. **Small Size**: only `&'static str` names and `f32` payloads.
//! 2. **No Heap Allocation**: nothing in here owns a `String`.
//! 3. **Copy Semantics**: errors are cheap to return and store.
//!
//! ## Example
//!
//! ```rust
//! use axisguard_core::{CalibratorConfig, ConfigError};
//!
//! let config = CalibratorConfig::default().with_alpha(2.0);
//! match config.validate() {
//!     Err(ConfigError::OutOfRange { name, .. }) => assert_eq!(name, "alpha"),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for configuration checks
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Rejected configuration values
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Parameter outside its admissible range
    #[error("{name} = {value} outside [{min}, {max}]")]
    OutOfRange {
        /// Parameter name as it appears in the config struct
        name: &'static str,
        /// The rejected value
        value: f32,
        /// Smallest admissible value
        min: f32,
        /// Largest admissible value
        max: f32,
    },

    /// Parameter is NaN or infinite
    #[error("{name} is not a finite number")]
    NotFinite {
        /// Parameter name as it appears in the config struct
        name: &'static str,
    },

    /// Two parameters contradict each other
    #[error("inconsistent configuration: {reason}")]
    Inconsistent {
        /// What is wrong
        reason: &'static str,
    },
}

impl ConfigError {
    /// Check that `value` is finite and inside `[min, max]`
    pub fn check_range(name: &'static str, value: f32, min: f32, max: f32) -> ConfigResult<()> {
        if !value.is_finite() {
            return Err(Self::NotFinite { name });
        }
        if value < min || value > max {
            return Err(Self::OutOfRange { name, value, min, max });
        }
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::OutOfRange { name, value, min, max } =>
                defmt::write!(fmt, "{} = {} outside [{}, {}]", name, value, min, max),
            Self::NotFinite { name } =>
                defmt::write!(fmt, "{} not finite", name),
            Self::Inconsistent { reason } =>
                defmt::write!(fmt, "Inconsistent: {}", reason),
        }
    }
}
