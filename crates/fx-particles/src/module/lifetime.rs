use crate::distribution::Distribution;

use super::{LodBlend, Module, ModuleContext, sample_blended};

/// Establishes how long a particle lives
///
/// Several lifetime modules in one LOD compose: their lifetimes add up.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LifetimeModule {
    /// Lifetime in seconds, sampled at emitter time
    pub lifetime: Option<Distribution<f32>>,
}

impl LifetimeModule {
    pub fn new(lifetime: impl Into<Distribution<f32>>) -> Self {
        Self {
            lifetime: Some(lifetime.into()),
        }
    }
}

impl Module for LifetimeModule {
    fn spawn(
        &self,
        ctx: &mut ModuleContext<'_>,
        slot: u32,
        spawn_time: f32,
        lod: Option<LodBlend<'_, Self>>,
    ) {
        let max_lifetime = sample_blended(
            self,
            lod,
            |m| m.lifetime.as_ref(),
            ctx.frame.emitter_time,
            &mut ctx.sampler,
            0.0,
        );
        if let Some(particle) = ctx.particles.particle_mut(slot) {
            particle.add_max_lifetime(max_lifetime);
            particle.relative_time = spawn_time * particle.one_over_max_lifetime;
        }
    }
}
