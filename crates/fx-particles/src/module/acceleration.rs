use glam::Vec3;

use crate::distribution::Distribution;
use crate::emitter::RequiredModule;
use crate::particle::{read_payload, write_payload};

use super::{LodBlend, Module, ModuleContext, sample_blended};

/// Constant acceleration picked per particle at spawn
///
/// The sampled acceleration is stored in the particle's payload and applied
/// to both the velocity and the base velocity every tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AccelerationModule {
    pub acceleration: Option<Distribution<Vec3>>,
    /// The acceleration is already in world space and is not transformed
    pub always_in_world_space: bool,
}

impl AccelerationModule {
    pub fn new(acceleration: impl Into<Distribution<Vec3>>) -> Self {
        Self {
            acceleration: Some(acceleration.into()),
            always_in_world_space: false,
        }
    }
}

impl Module for AccelerationModule {
    fn required_bytes(&self, _required: &RequiredModule) -> usize {
        std::mem::size_of::<Vec3>()
    }

    fn spawn(
        &self,
        ctx: &mut ModuleContext<'_>,
        slot: u32,
        spawn_time: f32,
        lod: Option<LodBlend<'_, Self>>,
    ) {
        let mut acceleration = sample_blended(
            self,
            lod,
            |m| m.acceleration.as_ref(),
            ctx.frame.emitter_time,
            &mut ctx.sampler,
            Vec3::ZERO,
        );
        if !self.always_in_world_space {
            acceleration = ctx.frame.sim_vector(acceleration);
        }

        if let Some(record) = ctx.particles.record(slot) {
            write_payload(record.payload, &acceleration);
            let gained = acceleration * spawn_time;
            record.particle.velocity += gained;
            record.particle.base_velocity += gained;
        }
    }

    fn update(&self, ctx: &mut ModuleContext<'_>, _lod: Option<LodBlend<'_, Self>>) {
        let delta_time = ctx.frame.delta_time;
        for index in 0..ctx.particles.active_count() {
            let Some(slot) = ctx.particles.slot(index) else {
                continue;
            };
            if let Some(record) = ctx.particles.record(slot) {
                let acceleration: Vec3 = read_payload(record.payload).unwrap_or(Vec3::ZERO);
                let gained = acceleration * delta_time;
                record.particle.velocity += gained;
                record.particle.base_velocity += gained;
            }
        }
    }
}

/// Acceleration sampled from a curve of each particle's age
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AccelerationOverLifetimeModule {
    pub accel_over_life: Option<Distribution<Vec3>>,
    pub always_in_world_space: bool,
}

impl AccelerationOverLifetimeModule {
    pub fn new(accel_over_life: impl Into<Distribution<Vec3>>) -> Self {
        Self {
            accel_over_life: Some(accel_over_life.into()),
            always_in_world_space: false,
        }
    }
}

impl Module for AccelerationOverLifetimeModule {
    fn update(&self, ctx: &mut ModuleContext<'_>, lod: Option<LodBlend<'_, Self>>) {
        let delta_time = ctx.frame.delta_time;
        for index in 0..ctx.particles.active_count() {
            let Some(slot) = ctx.particles.slot(index) else {
                continue;
            };
            let Some(age) = ctx.particles.particle(slot).map(|p| p.relative_time) else {
                continue;
            };
            let mut acceleration = sample_blended(
                self,
                lod,
                |m| m.accel_over_life.as_ref(),
                age,
                &mut ctx.sampler,
                Vec3::ZERO,
            );
            if !self.always_in_world_space {
                acceleration = ctx.frame.sim_vector(acceleration);
            }
            if let Some(particle) = ctx.particles.particle_mut(slot) {
                particle.velocity += acceleration * delta_time;
                particle.base_velocity += acceleration * delta_time;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::TickEnvironment;
    use crate::module::testing::emitter;

    #[test]
    fn test_acceleration_accumulates_in_base() {
        let mut instance = emitter(
            Default::default(),
            vec![AccelerationModule::new(Vec3::new(0.0, 0.0, -10.0)).into()],
        );
        let env = TickEnvironment::isolated();
        instance.spawn_particles(1, 0.0, 0.0, &env);
        instance.tick(0.5, &env);
        instance.tick(0.5, &env);

        let p = instance.particle(0).unwrap();
        assert_eq!(p.base_velocity, Vec3::new(0.0, 0.0, -10.0));
        assert_eq!(p.velocity, p.base_velocity);
        // 0.5 * -5 + 0.5 * -10
        assert!((p.location.z + 7.5).abs() < 1e-5);
    }

    #[test]
    fn test_acceleration_payload_captured_at_spawn() {
        let mut instance = emitter(
            Default::default(),
            vec![AccelerationModule::new(Vec3::X).into()],
        );
        instance.spawn_particles(1, 0.0, 0.0, &TickEnvironment::isolated());
        let stored: Vec3 = read_payload(instance.module_payload(0, 0).unwrap()).unwrap();
        assert_eq!(stored, Vec3::X);
    }

    #[test]
    fn test_acceleration_over_lifetime() {
        let mut instance = emitter(
            Default::default(),
            vec![AccelerationOverLifetimeModule::new(Vec3::Y).into()],
        );
        let env = TickEnvironment::isolated();
        instance.spawn_particles(1, 0.0, 0.0, &env);
        instance.tick(2.0, &env);
        assert_eq!(instance.particle(0).unwrap().base_velocity, Vec3::new(0.0, 2.0, 0.0));
    }
}
