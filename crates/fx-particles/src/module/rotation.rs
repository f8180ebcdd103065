use crate::distribution::Distribution;

use super::{LodBlend, Module, ModuleContext, sample_blended};

/// Adds a starting rotation, in radians
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RotationModule {
    pub start_rotation: Option<Distribution<f32>>,
}

impl RotationModule {
    pub fn new(start_rotation: impl Into<Distribution<f32>>) -> Self {
        Self {
            start_rotation: Some(start_rotation.into()),
        }
    }
}

impl Module for RotationModule {
    fn spawn(
        &self,
        ctx: &mut ModuleContext<'_>,
        slot: u32,
        _spawn_time: f32,
        lod: Option<LodBlend<'_, Self>>,
    ) {
        let rotation = sample_blended(
            self,
            lod,
            |m| m.start_rotation.as_ref(),
            ctx.frame.emitter_time,
            &mut ctx.sampler,
            0.0,
        );
        if let Some(particle) = ctx.particles.particle_mut(slot) {
            particle.rotation += rotation;
        }
    }
}

/// Adds a starting rotation rate, in radians per second
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RotationRateModule {
    pub start_rotation_rate: Option<Distribution<f32>>,
}

impl RotationRateModule {
    pub fn new(rate: impl Into<Distribution<f32>>) -> Self {
        Self {
            start_rotation_rate: Some(rate.into()),
        }
    }
}

impl Module for RotationRateModule {
    fn spawn(
        &self,
        ctx: &mut ModuleContext<'_>,
        slot: u32,
        _spawn_time: f32,
        lod: Option<LodBlend<'_, Self>>,
    ) {
        let rate = sample_blended(
            self,
            lod,
            |m| m.start_rotation_rate.as_ref(),
            ctx.frame.emitter_time,
            &mut ctx.sampler,
            0.0,
        );
        if let Some(particle) = ctx.particles.particle_mut(slot) {
            particle.rotation_rate += rate;
            particle.base_rotation_rate += rate;
        }
    }
}

/// Multiplies the rotation rate by a curve of the particle's age
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RotationRateMultiplyLifeModule {
    pub life_multiplier: Option<Distribution<f32>>,
}

impl Module for RotationRateMultiplyLifeModule {
    fn update(&self, ctx: &mut ModuleContext<'_>, lod: Option<LodBlend<'_, Self>>) {
        for index in 0..ctx.particles.active_count() {
            let Some(slot) = ctx.particles.slot(index) else {
                continue;
            };
            let Some(age) = ctx.particles.particle(slot).map(|p| p.relative_time) else {
                continue;
            };
            let scale = sample_blended(
                self,
                lod,
                |m| m.life_multiplier.as_ref(),
                age,
                &mut ctx.sampler,
                1.0,
            );
            if let Some(particle) = ctx.particles.particle_mut(slot) {
                particle.rotation_rate *= scale;
            }
        }
    }
}
