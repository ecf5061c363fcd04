//! MRAC Safety Shell Constants
//!
//! Reference model, adaptation law and mixing schedule for the controller
//! that blends neural and statistical commands.

// ===== REFERENCE MODEL =====

/// Damping ratio ζ of the second-order reference model.
pub const REFERENCE_DAMPING: f32 = 0.7;

/// Natural frequency ω of the reference model (rad/s).
pub const REFERENCE_FREQUENCY: f32 = 2.0;

// ===== ADAPTATION =====

/// Gain of the adaptation law.
pub const ADAPTATION_RATE: f32 = 0.1;

/// Saturation bound of each adaptive gain.
pub const SIGMA_BOUND: f32 = 1.0;

/// Lyapunov energy below which the loop counts as stable.
pub const STABILITY_MARGIN: f32 = 1.0;

// ===== MIXING =====

/// Initial neural share λ; starts conservative.
pub const INITIAL_MIXING_LAMBDA: f32 = 0.1;

/// Ceiling λ ramps back up to while stable.
pub const DEFAULT_NEURAL_CONFIDENCE: f32 = 0.5;

/// Geometric λ decay per unstable frame.
pub const LAMBDA_DECAY: f32 = 0.95;

/// Linear λ recovery per stable frame: 0.6 per second at 60 Hz.
pub const LAMBDA_RECOVERY_STEP: f32 = 0.01;

/// Consecutive stable frames required after a loss of stability before λ
/// starts recovering (1 s at 60 Hz).
pub const LAMBDA_RECOVERY_HOLD_FRAMES: u32 = 60;
