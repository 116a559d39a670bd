use super::*;

#[test]
fn clamp01_handles_nan_and_bounds() {
    assert_eq!(clamp01(f64::NAN), 0.0);
    assert_eq!(clamp01(-3.0), 0.0);
    assert_eq!(clamp01(0.25), 0.25);
    assert_eq!(clamp01(9.0), 1.0);
}

#[test]
fn alpha_matches_per_frame_at_60hz() {
    let a = frame_rate_independent_alpha(0.1, Duration::from_secs_f64(1.0 / 60.0));
    assert!((a - 0.1).abs() < 1e-6);
    let two = frame_rate_independent_alpha(0.1, Duration::from_secs_f64(2.0 / 60.0));
    assert!((two - 0.19).abs() < 1e-6);
    assert_eq!(frame_rate_independent_alpha(1.0, Duration::ZERO), 1.0);
    assert_eq!(frame_rate_independent_alpha(0.5, Duration::ZERO), 0.0);
}

#[test]
fn require_finite_rejects_nan() {
    assert!(require_finite(1.0, "x").is_ok());
    assert!(require_finite(f64::INFINITY, "x").is_err());
}
