//! Integration tests for the adaptive Kalman filter
//!
//! - Spike rejection against a non-adaptive baseline
//! - Noise reduction on a steady signal

mod common;

use axisguard_core::{AdaptiveKalmanFilter, KalmanConfig, Vec2};

use common::TestRng;

fn settled(config: KalmanConfig) -> AdaptiveKalmanFilter {
    let mut kf = AdaptiveKalmanFilter::new(config);
    for _ in 0..300 {
        kf.update(Vec2::ZERO);
    }
    kf
}

#[test]
fn test_spike_rejection() {
    let mut adaptive = settled(KalmanConfig::default());
    let mut baseline = settled(KalmanConfig::default().with_outlier_rejection(false));

    let spike = Vec2::new(10.0, 10.0);
    let adaptive_state = adaptive.update(spike);
    let baseline_state = baseline.update(spike);

    assert!(adaptive_state.magnitude() < 0.05, "adaptive moved to {:?}", adaptive_state);
    assert!(baseline_state.magnitude() > 1.0, "baseline only moved to {:?}", baseline_state);

    // 300 quiet samples after the spike
    let mut adaptive_deviation = adaptive_state.magnitude();
    let mut baseline_deviation = baseline_state.magnitude();
    for _ in 0..300 {
        adaptive_deviation += adaptive.update(Vec2::ZERO).magnitude();
        baseline_deviation += baseline.update(Vec2::ZERO).magnitude();
    }

    assert_eq!(adaptive.outlier_count(), 1);
    assert_eq!(baseline.outlier_count(), 0);
    assert!(adaptive.state().magnitude() < 0.01);
    assert!(
        adaptive_deviation < baseline_deviation,
        "adaptive {} vs baseline {}",
        adaptive_deviation,
        baseline_deviation
    );
}

#[test]
fn test_confidence_recovers_after_spike() {
    let mut kf = settled(KalmanConfig::default());
    kf.update(Vec2::new(10.0, -10.0));
    assert!(kf.confidence() <= 0.5);

    for _ in 0..100 {
        kf.update(kf.state());
    }
    assert_eq!(kf.confidence(), 1.0);
}

#[test]
fn test_noise_reduction_on_steady_signal() {
    let mut kf = AdaptiveKalmanFilter::default();
    let mut rng = TestRng::new(2024);
    let target = Vec2::new(0.5, -0.25);

    let mut raw_sq = 0.0;
    let mut filtered_sq = 0.0;
    for i in 0..600 {
        let noisy = target + Vec2::new(rng.gen_range(-0.05, 0.05), rng.gen_range(-0.05, 0.05));
        let filtered = kf.update(noisy);
        if i >= 100 {
            raw_sq += (noisy - target).magnitude().powi(2);
            filtered_sq += (filtered - target).magnitude().powi(2);
        }
    }

    assert!(filtered_sq < raw_sq * 0.5, "filtered {} vs raw {}", filtered_sq, raw_sq);
    assert_eq!(kf.outlier_count(), 0);
}
