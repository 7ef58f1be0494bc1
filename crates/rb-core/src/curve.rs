//! Motion Curves
//!
//! Easing curves used to shape reel speed during acceleration and
//! deceleration, plus the interpolation helpers shared by every phase.

use serde::{Deserialize, Serialize};

/// Phase durations at or below this are treated as already elapsed.
pub const MIN_PHASE_DURATION: f32 = 0.0001;

/// Easing curve for speed ramps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionCurve {
    /// Linear interpolation (constant rate)
    Linear,
    /// Quadratic ease-in (slow start)
    EaseIn,
    /// Quadratic ease-out (slow end)
    EaseOut,
    /// Cubic Hermite with flat tangents at both ends
    #[default]
    EaseInOut,
    /// Sine-based S-curve
    SCurve,
}

impl MotionCurve {
    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            MotionCurve::Linear => "Linear",
            MotionCurve::EaseIn => "EaseIn",
            MotionCurve::EaseOut => "EaseOut",
            MotionCurve::EaseInOut => "EaseInOut",
            MotionCurve::SCurve => "SCurve",
        }
    }

    /// Evaluate curve at position t (0.0 - 1.0)
    ///
    /// Returns value in range 0.0 - 1.0
    #[inline]
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            MotionCurve::Linear => t,
            MotionCurve::EaseIn => t * t,
            MotionCurve::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            MotionCurve::EaseInOut => smoothstep(t),
            MotionCurve::SCurve => (1.0 - (t * std::f32::consts::PI).cos()) / 2.0,
        }
    }
}

/// Hermite smoothstep: y = 3t² - 2t³
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Linear interpolation between `a` and `b`, `t` clamped to 0.0 - 1.0
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Progress of `elapsed` through a phase of length `duration`
///
/// Zero-length phases report full progress instead of dividing by zero.
#[inline]
pub fn normalized(elapsed: f32, duration: f32) -> f32 {
    if duration <= MIN_PHASE_DURATION {
        return 1.0;
    }
    (elapsed / duration).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const ALL: [MotionCurve; 5] = [
        MotionCurve::Linear,
        MotionCurve::EaseIn,
        MotionCurve::EaseOut,
        MotionCurve::EaseInOut,
        MotionCurve::SCurve,
    ];

    #[test]
    fn test_curve_boundaries() {
        for curve in ALL {
            assert_abs_diff_eq!(curve.evaluate(0.0), 0.0, epsilon = 0.001);
            assert_abs_diff_eq!(curve.evaluate(1.0), 1.0, epsilon = 0.001);

            let mid = curve.evaluate(0.5);
            assert!(mid > 0.0 && mid < 1.0, "{:?} at 0.5 = {}", curve, mid);
        }
    }

    #[test]
    fn test_curve_monotonic() {
        for curve in ALL {
            let mut prev = 0.0;
            for i in 0..=100 {
                let t = i as f32 / 100.0;
                let val = curve.evaluate(t);
                assert!(val >= prev - 0.0001, "{:?}: {} < {} at t={}", curve, val, prev, t);
                prev = val;
            }
        }
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(MotionCurve::EaseInOut.evaluate(-3.0), 0.0);
        assert_eq!(MotionCurve::EaseInOut.evaluate(7.0), 1.0);
    }

    #[test]
    fn test_normalized_zero_duration() {
        assert_eq!(normalized(0.0, 0.0), 1.0);
        assert_eq!(normalized(0.0, 0.00005), 1.0);
        assert_eq!(normalized(5.0, -1.0), 1.0);
    }

    #[test]
    fn test_normalized_clamps() {
        assert_abs_diff_eq!(normalized(0.45, 0.9), 0.5, epsilon = 1e-6);
        assert_eq!(normalized(2.0, 0.9), 1.0);
    }

    #[test]
    fn test_lerp() {
        assert_abs_diff_eq!(lerp(980.0, 80.0, 0.0), 980.0);
        assert_abs_diff_eq!(lerp(980.0, 80.0, 1.0), 80.0);
        assert_abs_diff_eq!(lerp(980.0, 80.0, 0.5), 530.0);
    }
}
