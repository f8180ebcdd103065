//! Named external parameters

use std::collections::HashMap;

use glam::Vec3;

/// Source of named values supplied by the component that owns an emitter
pub trait ParameterSource: Send + Sync {
    /// Look up a scalar parameter
    fn float_parameter(&self, name: &str) -> Option<f32>;

    /// Look up a vector parameter
    fn vector_parameter(&self, name: &str) -> Option<Vec3>;
}

/// Simple map-backed parameter source
#[derive(Debug, Clone, Default)]
pub struct ParameterSet {
    floats: HashMap<String, f32>,
    vectors: HashMap<String, Vec3>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_float(&mut self, name: impl Into<String>, value: f32) {
        self.floats.insert(name.into(), value);
    }

    pub fn set_vector(&mut self, name: impl Into<String>, value: Vec3) {
        self.vectors.insert(name.into(), value);
    }

    pub fn with_float(mut self, name: impl Into<String>, value: f32) -> Self {
        self.set_float(name, value);
        self
    }

    pub fn with_vector(mut self, name: impl Into<String>, value: Vec3) -> Self {
        self.set_vector(name, value);
        self
    }

    pub fn remove(&mut self, name: &str) {
        self.floats.remove(name);
        self.vectors.remove(name);
    }
}

impl ParameterSource for ParameterSet {
    fn float_parameter(&self, name: &str) -> Option<f32> {
        self.floats.get(name).copied()
    }

    fn vector_parameter(&self, name: &str) -> Option<Vec3> {
        self.vectors.get(name).copied()
    }
}

/// How a looked-up parameter value becomes the sampled value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterMode {
    /// Use the parameter value as is
    #[default]
    Direct,
    /// Clamp to the input range and remap onto the output range
    Mapped,
    /// Like `Mapped`, applied to the absolute value
    AbsMapped,
}

/// Binding of a distribution to a named parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterBinding<T> {
    pub name: String,
    /// Value used when the owner has no such parameter
    pub default: T,
    pub mode: ParameterMode,
    pub min_input: T,
    pub max_input: T,
    pub min_output: T,
    pub max_output: T,
}

/// Remap a scalar according to a parameter mode
pub fn map_scalar(
    value: f32,
    mode: ParameterMode,
    input: (f32, f32),
    output: (f32, f32),
) -> f32 {
    let value = match mode {
        ParameterMode::Direct => return value,
        ParameterMode::Mapped => value,
        ParameterMode::AbsMapped => value.abs(),
    };

    let (min_in, max_in) = input;
    let (min_out, max_out) = output;
    if max_in - min_in <= f32::EPSILON {
        return if value < min_in { min_out } else { max_out };
    }

    let alpha = ((value - min_in) / (max_in - min_in)).clamp(0.0, 1.0);
    min_out + (max_out - min_out) * alpha
}
