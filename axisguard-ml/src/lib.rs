//! Neural Layer and Full Input Pipeline for AxisGuard
//!
//! ## Overview
//!
//! `axisguard-core` provides the statistical leaf layers. This crate adds the
//! learned component and wires everything into [`InputProcessor`], the
//! per-stick pipeline a flight controller calls once per polling frame.
//!
//! ## Why a Quantized Network?
//!
//! The network sits inside a 100µs per-frame budget on the input thread:
//!
//! 1. **Integer Math**: int8 weights with int32 accumulation
//! 2. **Small**: 14→32→32→6, under 2KB of weights
//! 3. **Deterministic**: same weights and input, bit-identical output
//! 4. **Bounded**: a hard-clamp activation and a final `tanh`
//!
//! The network is never trained here. Weights are either generated from a
//! seed (so construction is reproducible) or loaded from a pretrained set via
//! [`NetworkWeights::from_slices`].
//!
//! ## Safety Model
//!
//! Nothing the network outputs reaches the caller unchecked:
//!
//! ```text
//!                ┌──────────── statistical path (pitch = y, yaw = x) ───────────┐
//! raw ─→ core ──┤                                                              ├─→ MRAC ─→ 6-DoF
//!                └─→ features ─→ QuantizedNetwork (gated by phase + budget) ───┘
//! ```
//!
//! - The calibration phase machine keeps the network off for the first five
//!   seconds.
//! - The MRAC shell decays the network's share λ whenever the tracking energy
//!   leaves the stability margin.
//! - A single frame over the CPU budget turns the network off until reset.
//!
//! ## Memory Model
//!
//! ```text
//! ProcessorState:
//! ├── Calibrator + drift ring:    ~0.8KB
//! ├── Kalman, MRAC, phase:        ~0.3KB
//! ├── Network weights:            ~1.9KB
//! ├── Replay (480 experiences):   ~35KB
//! └── Monitor history:            ~0.3KB
//! ```
//!
//! Everything is allocated when the processor is built; `process` never
//! allocates.
//!
//! ## Example
//!
//! ```rust
//! use axisguard_core::{MockTimeSource, Vec2};
//! use axisguard_ml::{InputProcessor, ProcessorConfig};
//!
//! let mut processor = InputProcessor::with_clock(ProcessorConfig::default(), MockTimeSource::new(0))?;
//! let command = processor.process(Vec2::new(0.5, -0.2), 1.0 / 60.0);
//! println!("pitch={:.3} yaw={:.3}", command.pitch, command.yaw);
//! println!("{}", processor.diagnostics());
//! # Ok::<(), axisguard_core::ConfigError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
extern crate axisguard_core;

pub mod benchmark;
pub mod diagnostics;
pub mod features;
pub mod network;
pub mod pipeline;
pub mod replay;
pub mod rng;

// Public API
pub use benchmark::BenchmarkReport;
pub use diagnostics::DiagnosticsSnapshot;
pub use features::{FeatureExtractor, FeatureVector, FEATURE_COUNT};
pub use network::{Inference, NetworkError, NetworkResult, NetworkWeights, QuantizedNetwork};
pub use pipeline::{
    InputProcessor, ProcessorConfig, ProcessorState, SafetyMonitor, StageMetrics,
    DEFAULT_NETWORK_SEED,
};
pub use replay::{Experience, ReplayBuffer};
pub use rng::Rng;
