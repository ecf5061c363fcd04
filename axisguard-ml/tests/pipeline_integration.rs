//! Integration tests for the full input pipeline
//!
//! - Calibration timing and neural activation
//! - CPU budget breaker
//! - Determinism and reset
//! - Output bounds (the final sum is not re-clamped)
//! - Diagnostics rendering and serialization

mod common;

use axisguard_core::{CalibrationPhase, MockTimeSource, Vec2, Vector6};
use axisguard_ml::{
    network::{HIDDEN_SIZE, OUTPUT_SIZE},
    InputProcessor, NetworkWeights, ProcessorConfig, QuantizedNetwork, FEATURE_COUNT,
};
use proptest::prelude::*;

use common::{processor, run_to_production, StickNoise, DT};

#[test]
fn test_calibration_timing() {
    let clock = MockTimeSource::new(0);
    let mut p = processor(&clock, ProcessorConfig::default());

    for frame in 1..=10 {
        p.process(Vec2::ZERO, DT);
        assert_eq!(p.phase(), CalibrationPhase::Waiting, "frame {}", frame);
    }
    // Perfect rest connects once the sample count passes 10
    p.process(Vec2::ZERO, DT);
    assert_eq!(p.phase(), CalibrationPhase::Statistical);

    let mut enabled_at = None;
    for frame in 12..=400u32 {
        p.process(Vec2::ZERO, DT);
        if p.neural_enabled() {
            enabled_at = Some(frame);
            break;
        }
        assert_eq!(p.state().network.total_inferences(), 0);
    }

    // 5 s at 60 Hz; f32 accumulation of dt may land one frame late
    let at = enabled_at.expect("neural path never enabled");
    assert!((300..=301).contains(&at), "enabled at frame {}", at);
    assert_eq!(p.phase(), CalibrationPhase::Production);

    // The enabling frame already ran the network
    assert_eq!(p.state().network.total_inferences(), 1);
    p.process(Vec2::ZERO, DT);
    assert_eq!(p.state().network.total_inferences(), 2);
    assert_eq!(p.state().network.replay_len(), 2);
}

#[test]
fn test_budget_fallback_is_sticky_until_reset() {
    let clock = MockTimeSource::new(0);
    let mut p = processor(&clock, ProcessorConfig::default());
    run_to_production(&mut p);

    p.process(Vec2::ZERO, DT);
    assert!(p.neural_enabled());

    // One slow frame
    let fallbacks = p.safety().fallback_activations;
    clock.set_step(200);
    p.process(Vec2::ZERO, DT);
    clock.set_step(0);

    assert!(p.safety().performance_budget_exceeded);
    assert!(!p.neural_enabled());
    assert!(p.safety().fallback_activations > fallbacks);
    let inferences = p.state().network.total_inferences();

    for _ in 0..300 {
        p.process(Vec2::ZERO, DT);
    }
    assert!(!p.neural_enabled());
    assert!(p.safety().performance_budget_exceeded);
    assert_eq!(p.state().network.total_inferences(), inferences);
    assert_eq!(p.diagnostics().overrun_count, 1);

    p.reset();
    assert!(!p.safety().performance_budget_exceeded);
    assert_eq!(p.phase(), CalibrationPhase::Waiting);

    run_to_production(&mut p);
    assert!(p.neural_enabled());
}

#[test]
fn test_slow_frame_before_production_blocks_activation() {
    let clock = MockTimeSource::new(0);
    let mut p = processor(&clock, ProcessorConfig::default());

    clock.set_step(500);
    p.process(Vec2::ZERO, DT);
    clock.set_step(0);

    for _ in 0..600 {
        p.process(Vec2::ZERO, DT);
    }
    assert_eq!(p.phase(), CalibrationPhase::Production);
    assert!(!p.neural_enabled());
    assert_eq!(p.state().network.total_inferences(), 0);
}

#[test]
fn test_identical_seeds_are_bit_identical() {
    let clock_a = MockTimeSource::new(0);
    let clock_b = MockTimeSource::new(0);
    let mut a = processor(&clock_a, ProcessorConfig::default());
    let mut b = processor(&clock_b, ProcessorConfig::default());
    let mut noise = StickNoise::new(17);

    for frame in 0..1_000 {
        let raw = if frame % 100 < 50 {
            noise.rest(Vec2::new(0.02, -0.01), 0.01)
        } else {
            noise.wild()
        };
        assert_eq!(a.process(raw, DT), b.process(raw, DT), "frame {}", frame);
    }

    assert!(a.state().network.total_inferences() > 0);
    assert_eq!(a.state().network.weights(), b.state().network.weights());
    assert_eq!(a.diagnostics(), b.diagnostics());
}

#[test]
fn test_different_seeds_diverge_after_production() {
    let clock_a = MockTimeSource::new(0);
    let clock_b = MockTimeSource::new(0);
    let mut a = processor(&clock_a, ProcessorConfig::default());
    let mut b = processor(&clock_b, ProcessorConfig::default().with_network_seed(1));
    let mut noise = StickNoise::new(3);

    let mut differed = false;
    for _ in 0..600 {
        let raw = noise.wild();
        differed |= a.process(raw, DT) != b.process(raw, DT);
    }
    assert!(differed);
}

#[test]
fn test_reset_keeps_weights() {
    let clock = MockTimeSource::new(0);
    let mut p = processor(&clock, ProcessorConfig::default());
    let weights = p.state().network.weights().clone();

    run_to_production(&mut p);
    for _ in 0..50 {
        p.process(Vec2::new(0.5, 0.5), DT);
    }
    assert!(p.state().network.replay_len() > 0);

    clock.advance(1_000_000);
    p.reset();

    let state = p.state();
    assert_eq!(state.network.weights(), &weights);
    assert_eq!(state.network.total_inferences(), 0);
    assert_eq!(state.network.replay_len(), 0);
    assert_eq!(state.calibrator.sample_count(), 0);
    assert_eq!(state.previous_output, Vector6::ZERO);
    assert_eq!(state.previous_filtered, Vec2::ZERO);
    assert_eq!(p.metrics().frames_processed, 0);
    assert!(!p.neural_enabled());

    // Controller age restarts from the reset
    p.process(Vec2::ZERO, DT);
    assert_eq!(p.diagnostics().controller_age_ms, 0);
}

#[test]
fn test_pretrained_zero_network_is_inert() {
    let weights = NetworkWeights::from_slices(
        &[0; FEATURE_COUNT * HIDDEN_SIZE],
        &[0; HIDDEN_SIZE],
        &[0; HIDDEN_SIZE * HIDDEN_SIZE],
        &[0; HIDDEN_SIZE],
        &[0; HIDDEN_SIZE * OUTPUT_SIZE],
        &[0; OUTPUT_SIZE],
    )
    .expect("shapes match");

    let clock = MockTimeSource::new(0);
    let config = ProcessorConfig::default();
    let mut p = InputProcessor::with_network(config, QuantizedNetwork::from_weights(weights), &clock)
        .expect("valid config");
    run_to_production(&mut p);

    for _ in 0..100 {
        let out = p.process(Vec2::ZERO, DT);
        assert_eq!(out.roll, 0.0);
        assert_eq!(out.throttle, 0.0);
    }
    assert_eq!(p.state().network.total_inferences(), 101);
}

#[test]
fn test_output_overshoot_is_bounded() {
    let clock = MockTimeSource::new(0);
    let mut p = processor(&clock, ProcessorConfig::default());
    let mut noise = StickNoise::new(2024);

    let mut max_component = 0.0f32;
    let mut overshoot_frames = 0;
    for _ in 0..3_000 {
        let out = p.process(noise.wild(), DT);
        assert!(out.is_finite());
        max_component = max_component.max(out.max_abs());
        if out.max_abs() > 1.0 {
            overshoot_frames += 1;
        }
    }

    // Each layer stays in [-1, 1]; only the adaptive gains (±1) can push the
    // unclamped sum past full scale.
    assert!(max_component <= 2.0, "max component {}", max_component);
    println!("max |component| = {max_component:.3}, frames over 1.0: {overshoot_frames}");
}

#[test]
fn test_mrac_disabled_blends() {
    let clock = MockTimeSource::new(0);
    let config = ProcessorConfig::default().with_mrac_safety(false);
    let mut p = processor(&clock, config);
    run_to_production(&mut p);

    let out = p.process(Vec2::ZERO, DT);
    assert!(out.is_finite());
    assert!(!p.safety().stability_compromised);
    assert_eq!(p.diagnostics().mixing_lambda, config.mrac.initial_lambda);
}

#[test]
fn test_diagnostics_render() {
    let clock = MockTimeSource::new(0);
    let mut p = processor(&clock, ProcessorConfig::default());
    for _ in 0..20 {
        p.process(Vec2::new(0.3, 0.1), DT);
    }

    let text = p.diagnostics().to_string();
    assert!(text.contains("Phase: statistical"));
    assert!(text.contains("Lambda:"));
    assert!(text.contains("Fallback activations: 0"));
}

#[cfg(feature = "serde")]
#[test]
fn test_diagnostics_serialize() {
    let clock = MockTimeSource::new(0);
    let mut p = processor(&clock, ProcessorConfig::default());
    run_to_production(&mut p);

    let json = serde_json::to_value(p.diagnostics()).expect("snapshot serializes");
    assert_eq!(json["phase"], "Production");
    assert_eq!(json["neural_enabled"], true);
    assert!(json["metrics"]["frames_processed"].as_u64().unwrap_or(0) > 300);
    assert!(json["memory_footprint_bytes"].as_u64().unwrap_or(0) > 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_any_input_sequence_stays_finite(
        samples in prop::collection::vec((-3.0f32..3.0, -3.0f32..3.0, 0.0f32..0.1), 1..400)
    ) {
        let clock = MockTimeSource::new(0);
        let mut p = processor(&clock, ProcessorConfig::default());

        for (x, y, dt) in samples {
            let out = p.process(Vec2::new(x, y), dt);
            prop_assert!(out.is_finite());
            prop_assert!(out.max_abs() <= 2.0);
        }
    }
}
