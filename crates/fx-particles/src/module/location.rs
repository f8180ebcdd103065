use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::distribution::Distribution;
use crate::emitter::RequiredModule;
use crate::particle::{read_payload, write_payload};

use super::{LodBlend, Module, ModuleContext, sample_blended};

/// Offsets a new particle from the emitter origin
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocationModule {
    /// Offset in emitter space, sampled at emitter time
    pub start_location: Option<Distribution<Vec3>>,
}

impl LocationModule {
    pub fn new(start_location: impl Into<Distribution<Vec3>>) -> Self {
        Self {
            start_location: Some(start_location.into()),
        }
    }
}

impl Module for LocationModule {
    fn spawn(
        &self,
        ctx: &mut ModuleContext<'_>,
        slot: u32,
        _spawn_time: f32,
        lod: Option<LodBlend<'_, Self>>,
    ) {
        let offset = sample_blended(
            self,
            lod,
            |m| m.start_location.as_ref(),
            ctx.frame.emitter_time,
            &mut ctx.sampler,
            Vec3::ZERO,
        );
        let offset = ctx.frame.sim_vector(offset);
        if let Some(particle) = ctx.particles.particle_mut(slot) {
            particle.location += offset;
        }
    }
}

/// Payload of [`DirectLocationModule`]
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct DirectLocationPayload {
    /// Placement target at spawn, in simulation space
    pub initial_location: Vec3,
    /// Offset sampled at spawn, in simulation space
    pub offset: Vec3,
}

/// Places particles on an explicit path instead of integrating velocity
///
/// Each tick the particle's velocity is replaced so the integration step
/// lands it on the sampled location plus its spawn offset.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectLocationModule {
    /// Path in emitter space, sampled at the particle's age
    pub location: Option<Distribution<Vec3>>,
    /// Offset added to the path, sampled once at spawn
    pub location_offset: Option<Distribution<Vec3>>,
    /// Per-axis fraction of the remaining distance covered each tick
    pub scale_factor: Option<Distribution<Vec3>>,
}

impl Default for DirectLocationModule {
    fn default() -> Self {
        Self {
            location: None,
            location_offset: None,
            scale_factor: Some(Distribution::Constant(Vec3::ONE)),
        }
    }
}

impl Module for DirectLocationModule {
    fn required_bytes(&self, _required: &RequiredModule) -> usize {
        std::mem::size_of::<DirectLocationPayload>()
    }

    fn spawn(
        &self,
        ctx: &mut ModuleContext<'_>,
        slot: u32,
        spawn_time: f32,
        lod: Option<LodBlend<'_, Self>>,
    ) {
        let time = ctx.frame.emitter_time;
        let target = sample_blended(
            self,
            lod,
            |m| m.location.as_ref(),
            time,
            &mut ctx.sampler,
            Vec3::ZERO,
        );
        let offset = sample_blended(
            self,
            lod,
            |m| m.location_offset.as_ref(),
            time,
            &mut ctx.sampler,
            Vec3::ZERO,
        );
        let target = ctx.frame.sim_point(target);
        let offset = ctx.frame.sim_vector(offset);

        let Some(record) = ctx.particles.record(slot) else {
            return;
        };
        // The spawn sub-step advances by velocity * spawn_time, so an offset
        // becomes an implied velocity when the particle was spawned earlier
        // in the frame.
        if spawn_time > 0.0 {
            record.particle.location = target;
            record.particle.velocity += offset / spawn_time;
        } else {
            record.particle.location = target + offset;
        }
        write_payload(
            record.payload,
            &DirectLocationPayload {
                initial_location: target,
                offset,
            },
        );
    }

    fn update(&self, ctx: &mut ModuleContext<'_>, lod: Option<LodBlend<'_, Self>>) {
        let delta_time = ctx.frame.delta_time;
        if self.location.is_none() || delta_time <= 0.0 {
            return;
        }

        for index in 0..ctx.particles.active_count() {
            let Some(slot) = ctx.particles.slot(index) else {
                continue;
            };
            let Some(age) = ctx.particles.particle(slot).map(|p| p.relative_time) else {
                continue;
            };

            let path = sample_blended(
                self,
                lod,
                |m| m.location.as_ref(),
                age,
                &mut ctx.sampler,
                Vec3::ZERO,
            );
            let scale = sample_blended(
                self,
                lod,
                |m| m.scale_factor.as_ref(),
                age,
                &mut ctx.sampler,
                Vec3::ONE,
            );
            let path = ctx.frame.sim_point(path);

            let Some(record) = ctx.particles.record(slot) else {
                continue;
            };
            let stored: DirectLocationPayload = read_payload(record.payload).unwrap_or_default();
            let remaining = path + stored.offset - record.particle.location;
            record.particle.velocity = remaining * scale / delta_time;
        }
    }
}
