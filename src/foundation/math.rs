use std::time::Duration;

pub(crate) const EPS: f64 = 1e-9;

/// Clamp to `[0, 1]`, mapping NaN to `0`.
pub(crate) fn clamp01(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Fraction of the remaining distance covered after `dt` when `per_frame` is
/// covered on every 60 Hz frame.
pub(crate) fn frame_rate_independent_alpha(per_frame: f64, dt: Duration) -> f64 {
    let per_frame = per_frame.clamp(0.0, 1.0);
    if per_frame >= 1.0 {
        return 1.0;
    }
    let frames = dt.as_secs_f64() * 60.0;
    1.0 - (1.0 - per_frame).powf(frames)
}

pub(crate) fn require_finite(v: f64, field: &str) -> crate::ReelResult<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(crate::ReelError::validation(format!(
            "{field} must be finite"
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
