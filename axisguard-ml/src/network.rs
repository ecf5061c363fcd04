//! Quantized Neural Network
//!
//! ## Overview
//!
//! A 14→32→32→6 fully-connected network with int8 weights and int32
//! accumulation. It maps one frame's features to a 6-DoF command.
//!
//! ## Quantization
//!
//! ```text
//! input   x_q = clamp(x·127, ±127)                         → i8
//! fc1     h1  = clamp(trunc((b + Σ x_q·w)·fc1_scale), ±127) → i16
//! fc2     h2  = clamp(trunc((b + Σ h1·w)·fc2_scale), ±127)  → i16
//! fc3     y   = tanh((b + Σ h2·w)·output_scale / 127)      → f32
//! ```
//!
//! The hidden activation is a hard clamp, not a tanh curve. It is cheap and
//! monotonic, and the network is only ever deployed with weights trained
//! against the same activation.
//!
//! ## Memory Model
//!
//! ```text
//! fc1:  32 × 14 × 1 + 32 × 4  =   576 bytes
//! fc2:  32 × 32 × 1 + 32 × 4  = 1,152 bytes
//! fc3:   6 × 32 × 1 +  6 × 4  =   216 bytes
//! Total weights:               ~1.9KB
//! ```
//!
//! Inference is deterministic: the same weights and features give
//! bit-identical intermediates on every run.

use axisguard_core::{time::elapsed_us, TimeSource, Vector6};
use thiserror_no_std::Error;

use crate::{
    features::{FeatureVector, FEATURE_COUNT},
    replay::ReplayBuffer,
    rng::Rng,
};

/// Width of both hidden layers
pub const HIDDEN_SIZE: usize = 32;
/// Output width (one per control axis)
pub const OUTPUT_SIZE: usize = 6;

/// Float → int8 scale on the input layer
pub const INPUT_SCALE: f32 = 127.0;
/// Accumulator → activation scale on the hidden and output layers
pub const LAYER_SCALE: f32 = 1.0 / 127.0;

const ACTIVATION_LIMIT: i32 = 127;

/// Result type for weight loading
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Rejected network weights
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum NetworkError {
    /// A weight or bias slice has the wrong length
    #[error("{layer}: expected {expected} values, got {actual}")]
    ShapeMismatch {
        /// Which tensor
        layer: &'static str,
        /// Required length
        expected: usize,
        /// Supplied length
        actual: usize,
    },

    /// A quantization scale is not a positive finite number
    #[error("invalid quantization scale for {name}")]
    InvalidScale {
        /// Which scale
        name: &'static str,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for NetworkError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::ShapeMismatch { layer, expected, actual } =>
                defmt::write!(fmt, "{}: expected {} got {}", layer, expected, actual),
            Self::InvalidScale { name } =>
                defmt::write!(fmt, "Invalid scale: {}", name),
        }
    }
}

/// One fully-connected int8 layer, weights row-major `[out][in]`
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizedLayer<const IN: usize, const OUT: usize> {
    /// Weights, one row per output
    pub weights: [[i8; IN]; OUT],
    /// Biases in accumulator units
    pub biases: [i32; OUT],
}

impl<const IN: usize, const OUT: usize> QuantizedLayer<IN, OUT> {
    fn seeded(rng: &mut Rng) -> Self {
        let mut weights = [[0i8; IN]; OUT];
        for row in weights.iter_mut() {
            for w in row.iter_mut() {
                *w = rng.next_weight();
            }
        }
        Self {
            weights,
            biases: [0; OUT],
        }
    }

    fn from_slices(
        layer: &'static str,
        weights: &[i8],
        biases: &[i32],
    ) -> NetworkResult<Self> {
        if weights.len() != IN * OUT {
            return Err(NetworkError::ShapeMismatch {
                layer,
                expected: IN * OUT,
                actual: weights.len(),
            });
        }
        if biases.len() != OUT {
            return Err(NetworkError::ShapeMismatch {
                layer,
                expected: OUT,
                actual: biases.len(),
            });
        }

        let mut result = Self {
            weights: [[0; IN]; OUT],
            biases: [0; OUT],
        };
        for (row, chunk) in result.weights.iter_mut().zip(weights.chunks_exact(IN)) {
            row.copy_from_slice(chunk);
        }
        result.biases.copy_from_slice(biases);
        Ok(result)
    }

    /// `bias + Σ input·weight` per output, saturating
    fn accumulate<T: Copy + Into<i32>>(&self, input: &[T; IN]) -> [i32; OUT] {
        let mut acc = self.biases;
        for (sum, row) in acc.iter_mut().zip(self.weights.iter()) {
            for (&x, &w) in input.iter().zip(row.iter()) {
                let x: i32 = x.into();
                *sum = sum.saturating_add(x * i32::from(w));
            }
        }
        acc
    }

    /// Hidden layer with the hard-clamp activation
    fn forward_clamped<T: Copy + Into<i32>>(&self, input: &[T; IN], scale: f32) -> [i16; OUT] {
        let acc = self.accumulate(input);
        let mut out = [0i16; OUT];
        for (o, a) in out.iter_mut().zip(acc) {
            let scaled = (a as f32 * scale) as i32;
            *o = scaled.clamp(-ACTIVATION_LIMIT, ACTIVATION_LIMIT) as i16;
        }
        out
    }
}

/// Complete weight set with quantization factors
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkWeights {
    /// Input → hidden 1
    pub fc1: QuantizedLayer<FEATURE_COUNT, HIDDEN_SIZE>,
    /// Hidden 1 → hidden 2
    pub fc2: QuantizedLayer<HIDDEN_SIZE, HIDDEN_SIZE>,
    /// Hidden 2 → output
    pub fc3: QuantizedLayer<HIDDEN_SIZE, OUTPUT_SIZE>,
    /// Float → int8 input scale
    pub input_scale: f32,
    /// fc1 accumulator scale
    pub fc1_scale: f32,
    /// fc2 accumulator scale
    pub fc2_scale: f32,
    /// fc3 accumulator scale
    pub output_scale: f32,
}

impl NetworkWeights {
    /// Weights drawn uniformly from `[-127, 127]`, zero biases
    pub fn seeded(seed: u32) -> Self {
        let mut rng = Rng::new(seed);
        let fc1 = QuantizedLayer::seeded(&mut rng);
        let fc2 = QuantizedLayer::seeded(&mut rng);
        let fc3 = QuantizedLayer::seeded(&mut rng);

        Self {
            fc1,
            fc2,
            fc3,
            input_scale: INPUT_SCALE,
            fc1_scale: LAYER_SCALE,
            fc2_scale: LAYER_SCALE,
            output_scale: LAYER_SCALE,
        }
    }

    /// Load pretrained weights from flat row-major slices
    ///
    /// Uses the default quantization scales.
    pub fn from_slices(
        fc1_weights: &[i8],
        fc1_biases: &[i32],
        fc2_weights: &[i8],
        fc2_biases: &[i32],
        fc3_weights: &[i8],
        fc3_biases: &[i32],
    ) -> NetworkResult<Self> {
        Ok(Self {
            fc1: QuantizedLayer::from_slices("fc1", fc1_weights, fc1_biases)?,
            fc2: QuantizedLayer::from_slices("fc2", fc2_weights, fc2_biases)?,
            fc3: QuantizedLayer::from_slices("fc3", fc3_weights, fc3_biases)?,
            input_scale: INPUT_SCALE,
            fc1_scale: LAYER_SCALE,
            fc2_scale: LAYER_SCALE,
            output_scale: LAYER_SCALE,
        })
    }

    /// Override the quantization factors
    pub fn with_scales(
        mut self,
        input_scale: f32,
        fc1_scale: f32,
        fc2_scale: f32,
        output_scale: f32,
    ) -> NetworkResult<Self> {
        for (name, value) in [
            ("input_scale", input_scale),
            ("fc1_scale", fc1_scale),
            ("fc2_scale", fc2_scale),
            ("output_scale", output_scale),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(NetworkError::InvalidScale { name });
            }
        }

        self.input_scale = input_scale;
        self.fc1_scale = fc1_scale;
        self.fc2_scale = fc2_scale;
        self.output_scale = output_scale;
        Ok(self)
    }
}

/// Intermediates of one forward pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inference {
    /// Quantized input
    pub input: [i8; FEATURE_COUNT],
    /// First hidden activation
    pub hidden1: [i16; HIDDEN_SIZE],
    /// Second hidden activation
    pub hidden2: [i16; HIDDEN_SIZE],
    /// Final command
    pub output: Vector6,
}

/// Int8 inference engine with latency tracking and replay recording
#[derive(Clone)]
pub struct QuantizedNetwork {
    weights: NetworkWeights,
    last_inference_us: u64,
    total_inferences: u64,
    replay: ReplayBuffer,
}

impl QuantizedNetwork {
    /// Network with seeded weights
    pub fn seeded(seed: u32) -> Self {
        Self::from_weights(NetworkWeights::seeded(seed))
    }

    /// Network with the given weights
    pub fn from_weights(weights: NetworkWeights) -> Self {
        Self {
            weights,
            last_inference_us: 0,
            total_inferences: 0,
            replay: ReplayBuffer::new(),
        }
    }

    /// Pure forward pass
    pub fn forward(&self, features: &FeatureVector) -> Inference {
        let w = &self.weights;

        let mut input = [0i8; FEATURE_COUNT];
        for (q, x) in input.iter_mut().zip(features.network_inputs()) {
            // NaN truncates to 0
            *q = (x * w.input_scale).clamp(-127.0, 127.0) as i8;
        }

        let hidden1 = w.fc1.forward_clamped(&input, w.fc1_scale);
        let hidden2 = w.fc2.forward_clamped(&hidden1, w.fc2_scale);

        let acc = w.fc3.accumulate(&hidden2);
        let mut output = [0.0f32; OUTPUT_SIZE];
        for (o, a) in output.iter_mut().zip(acc) {
            *o = libm::tanhf(a as f32 * w.output_scale / 127.0);
        }

        Inference {
            input,
            hidden1,
            hidden2,
            output: Vector6::from_array(output),
        }
    }

    /// Forward pass with latency measurement
    pub fn infer<C: TimeSource>(&mut self, features: &FeatureVector, clock: &C) -> Vector6 {
        let start = clock.now_us();
        let output = self.forward(features).output;
        self.last_inference_us = elapsed_us(start, clock.now_us());
        self.total_inferences = self.total_inferences.saturating_add(1);
        output
    }

    /// Store an inference in the replay buffer
    pub fn record(&mut self, features: FeatureVector, target: Vector6) {
        self.replay.record(features, target);
    }

    /// Clear counters and replay; weights are kept
    pub fn reset(&mut self) {
        self.last_inference_us = 0;
        self.total_inferences = 0;
        self.replay.clear();
    }

    /// Latency of the most recent [`infer`](Self::infer)
    pub fn last_inference_us(&self) -> u64 {
        self.last_inference_us
    }

    /// Inferences since construction or reset
    pub fn total_inferences(&self) -> u64 {
        self.total_inferences
    }

    /// Number of stored experiences
    pub fn replay_len(&self) -> usize {
        self.replay.len()
    }

    /// Recorded experiences
    pub fn replay(&self) -> &ReplayBuffer {
        &self.replay
    }

    /// Loaded weights
    pub fn weights(&self) -> &NetworkWeights {
        &self.weights
    }
}
