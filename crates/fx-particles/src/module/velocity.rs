use glam::Vec3;

use crate::distribution::Distribution;

use super::{LodBlend, Module, ModuleContext, sample_blended};

/// Gives new particles a starting velocity
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VelocityModule {
    pub start_velocity: Option<Distribution<Vec3>>,
    /// Speed along the direction from the emitter origin to the particle
    pub start_velocity_radial: Option<Distribution<f32>>,
    /// `start_velocity` is already in world space and is not transformed
    pub in_world_space: bool,
}

impl VelocityModule {
    pub fn new(start_velocity: impl Into<Distribution<Vec3>>) -> Self {
        Self {
            start_velocity: Some(start_velocity.into()),
            ..Default::default()
        }
    }

    pub fn with_radial(mut self, radial: impl Into<Distribution<f32>>) -> Self {
        self.start_velocity_radial = Some(radial.into());
        self
    }
}

impl Module for VelocityModule {
    fn spawn(
        &self,
        ctx: &mut ModuleContext<'_>,
        slot: u32,
        _spawn_time: f32,
        lod: Option<LodBlend<'_, Self>>,
    ) {
        let time = ctx.frame.emitter_time;
        let mut velocity = sample_blended(
            self,
            lod,
            |m| m.start_velocity.as_ref(),
            time,
            &mut ctx.sampler,
            Vec3::ZERO,
        );
        let radial = sample_blended(
            self,
            lod,
            |m| m.start_velocity_radial.as_ref(),
            time,
            &mut ctx.sampler,
            0.0,
        );
        if !self.in_world_space {
            velocity = ctx.frame.sim_vector(velocity);
        }
        let origin = ctx.frame.emitter_origin();

        if let Some(particle) = ctx.particles.particle_mut(slot) {
            velocity += (particle.location - origin).normalize_or_zero() * radial;
            particle.velocity += velocity;
            particle.base_velocity += velocity;
        }
    }
}

/// Shapes velocity over each particle's life
///
/// In absolute mode the sampled value replaces the velocity; otherwise it
/// scales it per component.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VelocityOverLifetimeModule {
    pub vel_over_life: Option<Distribution<Vec3>>,
    pub absolute: bool,
    /// Absolute values are in world space rather than emitter space
    pub in_world_space: bool,
}

impl VelocityOverLifetimeModule {
    pub fn scale(curve: impl Into<Distribution<Vec3>>) -> Self {
        Self {
            vel_over_life: Some(curve.into()),
            ..Default::default()
        }
    }

    pub fn absolute(curve: impl Into<Distribution<Vec3>>) -> Self {
        Self {
            vel_over_life: Some(curve.into()),
            absolute: true,
            in_world_space: false,
        }
    }
}

impl Module for VelocityOverLifetimeModule {
    fn update(&self, ctx: &mut ModuleContext<'_>, lod: Option<LodBlend<'_, Self>>) {
        if self.vel_over_life.is_none() {
            log::trace!("Velocity over lifetime has no curve, skipping");
            return;
        }

        for index in 0..ctx.particles.active_count() {
            let Some(slot) = ctx.particles.slot(index) else {
                continue;
            };
            let Some(age) = ctx.particles.particle(slot).map(|p| p.relative_time) else {
                continue;
            };
            let fallback = if self.absolute { Vec3::ZERO } else { Vec3::ONE };
            let value = sample_blended(
                self,
                lod,
                |m| m.vel_over_life.as_ref(),
                age,
                &mut ctx.sampler,
                fallback,
            );
            let value = match (self.absolute, self.in_world_space) {
                (false, _) => value,
                (true, true) => ctx.frame.world_to_sim_vector(value),
                (true, false) => ctx.frame.sim_vector(value),
            };

            if let Some(particle) = ctx.particles.particle_mut(slot) {
                if self.absolute {
                    particle.velocity = value;
                } else {
                    particle.velocity *= value;
                }
            }
        }
    }
}
