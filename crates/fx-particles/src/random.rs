//! Per-instance random source

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Deterministic random source owned by one emitter instance
///
/// Every uniform distribution, primitive location and random sub-image roll
/// draws from the instance's own generator, so two instances created with the
/// same seed and driven with the same ticks produce identical particles.
#[derive(Debug, Clone)]
pub struct EmitterRng {
    inner: StdRng,
}

impl EmitterRng {
    /// Create a new random source with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate a random f32 in range [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        self.inner.random::<f32>()
    }

    /// Generate a random f32 in range [-1, 1)
    pub fn next_signed(&mut self) -> f32 {
        self.next_f32() * 2.0 - 1.0
    }

    /// Generate a random index in range [0, len), or None for an empty range
    pub fn next_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.inner.random_range(0..len))
    }
}

impl Default for EmitterRng {
    fn default() -> Self {
        Self::new(1312)
    }
}
