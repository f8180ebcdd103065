//! Keyframed curves for distributions

use super::DistributionValue;

/// Interpolation applied between a key and the key after it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpMode {
    /// Hold the key's value until the next key
    Constant,
    /// Straight-line interpolation
    #[default]
    Linear,
    /// Cubic hermite interpolation using the keys' tangents
    Curve,
}

/// A single key of a curve
#[derive(Debug, Clone, PartialEq)]
pub struct CurvePoint<T> {
    pub input: f32,
    pub output: T,
    /// Slope (per unit of input) arriving at this key
    pub arrive_tangent: T,
    /// Slope (per unit of input) leaving this key
    pub leave_tangent: T,
    pub mode: InterpMode,
}

/// Keyframed curve sorted by input
#[derive(Debug, Clone, PartialEq)]
pub struct Curve<T> {
    points: Vec<CurvePoint<T>>,
}

impl<T> Default for Curve<T> {
    fn default() -> Self {
        Self { points: Vec::new() }
    }
}

impl<T: DistributionValue> Curve<T> {
    /// Create an empty curve
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a linear curve from `(input, output)` pairs in any order
    pub fn linear(keys: impl IntoIterator<Item = (f32, T)>) -> Self {
        Self::with_mode(keys, InterpMode::Linear)
    }

    /// Build a stepped curve from `(input, output)` pairs in any order
    pub fn stepped(keys: impl IntoIterator<Item = (f32, T)>) -> Self {
        Self::with_mode(keys, InterpMode::Constant)
    }

    /// Build a smooth curve with automatically computed tangents
    pub fn smooth(keys: impl IntoIterator<Item = (f32, T)>) -> Self {
        let mut curve = Self::with_mode(keys, InterpMode::Curve);
        curve.auto_set_tangents();
        curve
    }

    fn with_mode(keys: impl IntoIterator<Item = (f32, T)>, mode: InterpMode) -> Self {
        let mut curve = Self::new();
        for (input, output) in keys {
            curve.add_point(input, output, mode);
        }
        curve
    }

    /// Insert a key, keeping the keys sorted by input
    ///
    /// Keys with equal inputs keep their insertion order. Returns the index of
    /// the new key.
    pub fn add_point(&mut self, input: f32, output: T, mode: InterpMode) -> usize {
        let index = self.points.partition_point(|p| p.input <= input);
        self.points.insert(
            index,
            CurvePoint {
                input,
                output,
                arrive_tangent: T::ZERO,
                leave_tangent: T::ZERO,
                mode,
            },
        );
        index
    }

    /// Recompute tangents of every key from its neighbours
    ///
    /// End keys get flat tangents, interior keys the Catmull-Rom slope.
    pub fn auto_set_tangents(&mut self) {
        let count = self.points.len();
        for i in 0..count {
            let tangent = if i == 0 || i + 1 == count {
                T::ZERO
            } else {
                let prev = &self.points[i - 1];
                let next = &self.points[i + 1];
                let span = next.input - prev.input;
                if span > f32::EPSILON {
                    (next.output - prev.output) * (1.0 / span)
                } else {
                    T::ZERO
                }
            };
            self.points[i].arrive_tangent = tangent;
            self.points[i].leave_tangent = tangent;
        }
    }

    pub fn points(&self) -> &[CurvePoint<T>] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Input range covered by the keys
    pub fn input_range(&self) -> Option<(f32, f32)> {
        Some((self.points.first()?.input, self.points.last()?.input))
    }

    /// Evaluate the curve at `input`
    ///
    /// Inputs before the first key clamp to the first value, inputs past the
    /// last key clamp to the last value. An empty curve yields `default`.
    pub fn eval(&self, input: f32, default: T) -> T {
        let Some(index) = find_point_index(&self.points, input) else {
            return default;
        };

        let first = &self.points[0];
        if input <= first.input {
            return first.output;
        }
        if index + 1 >= self.points.len() {
            return self.points[index].output;
        }

        let p0 = &self.points[index];
        let p1 = &self.points[index + 1];
        let span = p1.input - p0.input;
        if span <= f32::EPSILON {
            return p1.output;
        }
        let alpha = ((input - p0.input) / span).clamp(0.0, 1.0);

        match p0.mode {
            InterpMode::Constant => p0.output,
            InterpMode::Linear => p0.output.interpolate(&p1.output, alpha),
            InterpMode::Curve => hermite(
                p0.output,
                p0.leave_tangent * span,
                p1.output,
                p1.arrive_tangent * span,
                alpha,
            ),
        }
    }
}

/// Find the index of the key at or before the given input
///
/// Returns None if the curve has no keys. Inputs before the first key map to
/// index 0, inputs past the last key map to the last index.
pub fn find_point_index<T>(points: &[CurvePoint<T>], input: f32) -> Option<usize> {
    if points.is_empty() {
        return None;
    }

    let last_index = points.len() - 1;
    if input >= points[last_index].input {
        return Some(last_index);
    }

    // Largest index whose input is <= the query
    Some(points.partition_point(|p| p.input <= input).saturating_sub(1))
}

fn hermite<T: DistributionValue>(p0: T, t0: T, p1: T, t1: T, s: f32) -> T {
    let s2 = s * s;
    let s3 = s2 * s;
    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;
    p0 * h00 + t0 * h10 + p1 * h01 + t1 * h11
}
