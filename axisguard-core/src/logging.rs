//! Optional logging
//!
//! Thin wrappers over the `log` facade that compile to nothing when the
//! `log` feature is off, so embedded builds carry no formatting code.
//! Exported so `axisguard-ml` logs through the same switch.

/// Log at info level (no-op without the `log` feature)
#[cfg(feature = "log")]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => { $crate::__log::info!($($arg)*) };
}

/// Log at info level (no-op without the `log` feature)
#[cfg(not(feature = "log"))]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}

/// Log at warn level (no-op without the `log` feature)
#[cfg(feature = "log")]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => { $crate::__log::warn!($($arg)*) };
}

/// Log at warn level (no-op without the `log` feature)
#[cfg(not(feature = "log"))]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

/// Log at debug level (no-op without the `log` feature)
#[cfg(feature = "log")]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => { $crate::__log::debug!($($arg)*) };
}

/// Log at debug level (no-op without the `log` feature)
#[cfg(not(feature = "log"))]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}
