//! Time-indexed value sources sampled by modules
//!
//! A [`Distribution`] produces a scalar or vector for a given time. Modules
//! sample them at emitter time while spawning and at each particle's
//! normalized age while updating.
//!
//! # Example
//!
//! ```rust
//! use fx_particles::distribution::{Curve, Distribution, Sampler};
//! use fx_particles::EmitterRng;
//!
//! let fade = Distribution::Curve(Curve::linear([(0.0, 1.0_f32), (1.0, 0.0)]));
//! let mut rng = EmitterRng::new(1);
//! let mut sampler = Sampler::new(&mut rng, None);
//!
//! assert_eq!(fade.sample(0.5, &mut sampler), 0.5);
//! ```

mod curve;
mod parameter;

pub use curve::{Curve, CurvePoint, InterpMode, find_point_index};
pub use parameter::{ParameterBinding, ParameterMode, ParameterSet, ParameterSource, map_scalar};

use std::fmt;
use std::ops::{Add, Mul, Sub};

use glam::Vec3;

use crate::random::EmitterRng;

/// Trait for types that can be linearly interpolated
pub trait Lerp: Clone {
    /// Linear interpolation between self and other
    fn interpolate(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Vec3 {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        *self + (*other - *self) * t
    }
}

/// Value types a distribution can produce
pub trait DistributionValue:
    Lerp
    + Copy
    + PartialEq
    + fmt::Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f32, Output = Self>
{
    const ZERO: Self;
    const ONE: Self;

    /// Uniform random value between `min` and `max`, per component
    fn random_between(min: Self, max: Self, rng: &mut EmitterRng) -> Self;

    /// Fetch a named value of this type from the owner
    fn from_source(source: &dyn ParameterSource, name: &str) -> Option<Self>;

    /// Apply a parameter binding's remapping, per component
    fn map_parameter(self, binding: &ParameterBinding<Self>) -> Self;
}

impl DistributionValue for f32 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;

    fn random_between(min: Self, max: Self, rng: &mut EmitterRng) -> Self {
        min + (max - min) * rng.next_f32()
    }

    fn from_source(source: &dyn ParameterSource, name: &str) -> Option<Self> {
        source.float_parameter(name)
    }

    fn map_parameter(self, binding: &ParameterBinding<Self>) -> Self {
        map_scalar(
            self,
            binding.mode,
            (binding.min_input, binding.max_input),
            (binding.min_output, binding.max_output),
        )
    }
}

impl DistributionValue for Vec3 {
    const ZERO: Self = Self::ZERO;
    const ONE: Self = Self::ONE;

    fn random_between(min: Self, max: Self, rng: &mut EmitterRng) -> Self {
        let x = f32::random_between(min.x, max.x, rng);
        let y = f32::random_between(min.y, max.y, rng);
        let z = f32::random_between(min.z, max.z, rng);
        Self::new(x, y, z)
    }

    fn from_source(source: &dyn ParameterSource, name: &str) -> Option<Self> {
        source.vector_parameter(name)
    }

    fn map_parameter(self, binding: &ParameterBinding<Self>) -> Self {
        let component = |value: f32, axis: usize| {
            map_scalar(
                value,
                binding.mode,
                (binding.min_input[axis], binding.max_input[axis]),
                (binding.min_output[axis], binding.max_output[axis]),
            )
        };
        Self::new(component(self.x, 0), component(self.y, 1), component(self.z, 2))
    }
}

/// Sampling context: the instance's random source and the owner's parameters
pub struct Sampler<'a> {
    pub(crate) rng: &'a mut EmitterRng,
    parameters: Option<&'a dyn ParameterSource>,
}

impl<'a> Sampler<'a> {
    pub fn new(rng: &'a mut EmitterRng, parameters: Option<&'a dyn ParameterSource>) -> Self {
        Self { rng, parameters }
    }

    pub fn rng(&mut self) -> &mut EmitterRng {
        self.rng
    }

    pub fn parameters(&self) -> Option<&'a dyn ParameterSource> {
        self.parameters
    }
}

impl fmt::Debug for Sampler<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sampler")
            .field("has_parameters", &self.parameters.is_some())
            .finish_non_exhaustive()
    }
}

/// A time-indexed value source
#[derive(Debug, Clone, PartialEq)]
pub enum Distribution<T> {
    /// The same value at every time
    Constant(T),
    /// A fresh uniform random value in `[min, max]` on every sample
    Uniform { min: T, max: T },
    /// Keyframed curve evaluated at the sample time
    Curve(Curve<T>),
    /// Uniform random value between two curves evaluated at the sample time
    UniformCurve { min: Curve<T>, max: Curve<T> },
    /// Named value supplied by the owning component
    Parameter(ParameterBinding<T>),
}

impl<T: DistributionValue> Distribution<T> {
    /// Sample the distribution at `time`
    pub fn sample(&self, time: f32, sampler: &mut Sampler<'_>) -> T {
        match self {
            Self::Constant(value) => *value,
            Self::Uniform { min, max } => T::random_between(*min, *max, sampler.rng),
            Self::Curve(curve) => curve.eval(time, T::ZERO),
            Self::UniformCurve { min, max } => {
                let low = min.eval(time, T::ZERO);
                let high = max.eval(time, T::ZERO);
                T::random_between(low, high, sampler.rng)
            }
            Self::Parameter(binding) => sampler
                .parameters
                .and_then(|source| T::from_source(source, &binding.name))
                .map_or(binding.default, |value| value.map_parameter(binding)),
        }
    }

    /// Bind to a named parameter with a fallback and no remapping
    pub fn parameter(name: impl Into<String>, default: T) -> Self {
        Self::Parameter(ParameterBinding {
            name: name.into(),
            default,
            mode: ParameterMode::Direct,
            min_input: T::ZERO,
            max_input: T::ONE,
            min_output: T::ZERO,
            max_output: T::ONE,
        })
    }

    /// Whether sampling consumes random numbers
    pub fn is_random(&self) -> bool {
        matches!(self, Self::Uniform { .. } | Self::UniformCurve { .. })
    }
}

impl<T> From<T> for Distribution<T> {
    fn from(value: T) -> Self {
        Self::Constant(value)
    }
}

/// Sample an optional distribution, treating an absent one as `fallback`
pub fn sample_or<T: DistributionValue>(
    distribution: Option<&Distribution<T>>,
    time: f32,
    sampler: &mut Sampler<'_>,
    fallback: T,
) -> T {
    distribution.map_or(fallback, |d| d.sample(time, sampler))
}
