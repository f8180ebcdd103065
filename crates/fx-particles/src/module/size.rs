use glam::Vec3;

use crate::distribution::Distribution;

use super::{LodBlend, Module, ModuleContext, sample_blended};

bitflags::bitflags! {
    /// Size components a multiplier applies to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Axes: u8 {
        const X = 0x01;
        const Y = 0x02;
        const Z = 0x04;
    }
}

impl Default for Axes {
    fn default() -> Self {
        Self::all()
    }
}

impl Axes {
    /// Multiply the selected components of `size` by `scale`
    fn apply(self, size: &mut Vec3, scale: Vec3) {
        if self.contains(Self::X) {
            size.x *= scale.x;
        }
        if self.contains(Self::Y) {
            size.y *= scale.y;
        }
        if self.contains(Self::Z) {
            size.z *= scale.z;
        }
    }
}

/// Adds a starting size to new particles
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SizeModule {
    pub start_size: Option<Distribution<Vec3>>,
}

impl SizeModule {
    pub fn new(start_size: impl Into<Distribution<Vec3>>) -> Self {
        Self {
            start_size: Some(start_size.into()),
        }
    }
}

impl Module for SizeModule {
    fn spawn(
        &self,
        ctx: &mut ModuleContext<'_>,
        slot: u32,
        _spawn_time: f32,
        lod: Option<LodBlend<'_, Self>>,
    ) {
        let size = sample_blended(
            self,
            lod,
            |m| m.start_size.as_ref(),
            ctx.frame.emitter_time,
            &mut ctx.sampler,
            Vec3::ZERO,
        );
        if let Some(particle) = ctx.particles.particle_mut(slot) {
            particle.size += size;
            particle.base_size += size;
        }
    }
}

/// Sets size to the base size times a curve of the particle's age
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SizeScaleModule {
    pub size_scale: Option<Distribution<Vec3>>,
}

impl SizeScaleModule {
    pub fn new(size_scale: impl Into<Distribution<Vec3>>) -> Self {
        Self {
            size_scale: Some(size_scale.into()),
        }
    }
}

impl Module for SizeScaleModule {
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
                |m| m.size_scale.as_ref(),
                age,
                &mut ctx.sampler,
                Vec3::ONE,
            );
            if let Some(particle) = ctx.particles.particle_mut(slot) {
                particle.size = particle.base_size * scale;
            }
        }
    }
}

/// Multiplies the current size by a curve of the particle's age
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SizeMultiplyLifeModule {
    pub life_multiplier: Option<Distribution<Vec3>>,
    pub axes: Axes,
}

impl SizeMultiplyLifeModule {
    pub fn new(life_multiplier: impl Into<Distribution<Vec3>>) -> Self {
        Self {
            life_multiplier: Some(life_multiplier.into()),
            axes: Axes::all(),
        }
    }
}

impl Module for SizeMultiplyLifeModule {
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
                Vec3::ONE,
            );
            if let Some(particle) = ctx.particles.particle_mut(slot) {
                self.axes.apply(&mut particle.size, scale);
            }
        }
    }
}

/// Multiplies the current size by the particle's speed
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SizeMultiplyVelocityModule {
    pub velocity_multiplier: Option<Distribution<Vec3>>,
    pub axes: Axes,
}

impl SizeMultiplyVelocityModule {
    pub fn new(velocity_multiplier: impl Into<Distribution<Vec3>>) -> Self {
        Self {
            velocity_multiplier: Some(velocity_multiplier.into()),
            axes: Axes::all(),
        }
    }
}

impl Module for SizeMultiplyVelocityModule {
    fn update(&self, ctx: &mut ModuleContext<'_>, lod: Option<LodBlend<'_, Self>>) {
        for index in 0..ctx.particles.active_count() {
            let Some(slot) = ctx.particles.slot(index) else {
                continue;
            };
            let Some((age, speed)) = ctx
                .particles
                .particle(slot)
                .map(|p| (p.relative_time, p.velocity.length()))
            else {
                continue;
            };
            let scale = sample_blended(
                self,
                lod,
                |m| m.velocity_multiplier.as_ref(),
                age,
                &mut ctx.sampler,
                Vec3::ONE,
            );
            if let Some(particle) = ctx.particles.particle_mut(slot) {
                self.axes.apply(&mut particle.size, scale * speed);
            }
        }
    }
}
