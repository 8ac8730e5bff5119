//! Piecewise-linear keyframed curves driving particle attributes over life.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Curve — keyframed scalar over normalized life phase [0..1]
// ---------------------------------------------------------------------------

/// A piecewise-linear curve mapping normalized life phase [0..1] to a scalar.
///
/// Keys are sorted by time at construction and immutable afterwards. Emitters
/// sample one curve per animated attribute (rotation, scale, opacity).
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Reflect)]
pub struct Curve {
    keys: Vec<CurveKey>,
}

/// Single keyframe in a curve.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Reflect)]
pub struct CurveKey {
    /// Normalized time (0.0 - 1.0).
    pub time: f32,
    /// Value at this keyframe.
    pub value: f32,
}

impl Curve {
    /// Build a curve from (time, value) control points. Insertion order is
    /// irrelevant; keys are sorted by time ascending. Times must be unique.
    ///
    /// A curve needs at least one key for `evaluate` to be meaningful.
    pub fn from_points(points: impl IntoIterator<Item = (f32, f32)>) -> Self {
        let mut keys: Vec<CurveKey> = points
            .into_iter()
            .map(|(time, value)| CurveKey { time, value })
            .collect();
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// Create a constant curve (single key at t = 0).
    pub fn constant(value: f32) -> Self {
        Self {
            keys: vec![CurveKey { time: 0.0, value }],
        }
    }

    /// Create a linear ramp from `start` at t = 0 to `end` at t = 1.
    pub fn linear(start: f32, end: f32) -> Self {
        Self {
            keys: vec![
                CurveKey {
                    time: 0.0,
                    value: start,
                },
                CurveKey {
                    time: 1.0,
                    value: end,
                },
            ],
        }
    }

    /// Sorted keys, ascending by time.
    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Evaluate the curve at normalized life phase `t`.
    ///
    /// Out-of-range inputs clamp to the *phase range's* numeric bounds, not
    /// to the boundary keys' values: `t < 0` returns 0.0 and `t > 1` returns
    /// 1.0 regardless of control points. Curves whose values leave [0..1]
    /// therefore snap to 1.0 for overtime phases; callers relying on
    /// overtime sampling should keep their last key at t = 1.
    ///
    /// In range, the two keys bracketing `t` are linearly interpolated. A
    /// phase at or past the last key returns that key's value; a phase below
    /// the first key interpolates from an implicit (0.0, 0.0) anchor.
    pub fn evaluate(&self, t: f32) -> f32 {
        if t < 0.0 {
            return 0.0;
        }
        if t > 1.0 {
            return 1.0;
        }

        let mut prev_time = 0.0;
        let mut value = 0.0;
        for key in &self.keys {
            if t < key.time {
                // factor -> 1 at prev_time, -> 0 at key.time
                let factor = (key.time - t) / (key.time - prev_time);
                return value * factor + key.value * (1.0 - factor);
            }
            prev_time = key.time;
            value = key.value;
        }

        value
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Curve {
        Curve::from_points([(0.0, 0.0), (1.0, 1.0)])
    }

    #[test]
    fn evaluate_at_endpoints() {
        assert_eq!(ramp().evaluate(0.0), 0.0);
        assert_eq!(ramp().evaluate(1.0), 1.0);
    }

    #[test]
    fn evaluate_clamps_below_zero_to_zero() {
        assert_eq!(ramp().evaluate(-0.5), 0.0);
        // Literal floor, independent of the first key's value
        let offset = Curve::from_points([(0.0, 5.0), (1.0, 9.0)]);
        assert_eq!(offset.evaluate(-0.1), 0.0);
    }

    #[test]
    fn evaluate_clamps_above_one_to_one() {
        assert_eq!(ramp().evaluate(1.3), 1.0);
        // Literal ceiling, even when the curve's own range exceeds [0..1]
        let degrees = Curve::from_points([(0.0, 0.0), (1.0, 180.0)]);
        assert_eq!(degrees.evaluate(1.5), 1.0);
    }

    #[test]
    fn evaluate_interpolates_between_keys() {
        assert_eq!(ramp().evaluate(0.5), 0.5);

        let early_peak = Curve::from_points([(0.0, 0.0), (0.8, 1.0)]);
        assert_eq!(early_peak.evaluate(0.5), 0.625);

        let triangle = Curve::from_points([(0.0, 0.0), (0.5, 1.0), (1.0, 0.0)]);
        assert!((triangle.evaluate(0.7) - 0.6).abs() < 1e-6);

        let bent = Curve::from_points([(0.0, 0.0), (0.8, 0.5), (1.0, 1.0)]);
        assert_eq!(bent.evaluate(0.6), 0.375);
    }

    #[test]
    fn evaluate_past_last_key_holds_its_value() {
        let short = Curve::from_points([(0.0, 0.2), (0.5, 0.8)]);
        assert_eq!(short.evaluate(0.9), 0.8);
    }

    #[test]
    fn evaluate_single_key_is_constant() {
        let flat = Curve::constant(0.4);
        assert_eq!(flat.evaluate(0.0), 0.4);
        assert_eq!(flat.evaluate(0.7), 0.4);
    }

    #[test]
    fn from_points_sorts_keys() {
        let unordered = Curve::from_points([(1.0, 1.0), (0.0, 0.0), (0.5, 0.2)]);
        let times: Vec<f32> = unordered.keys().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0]);
        assert_eq!(unordered.evaluate(0.5), 0.2);
    }
}
