//! Attractors pulling particles toward a line, a point or another emitter's particles

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::distribution::Distribution;
use crate::emitter::RequiredModule;
use crate::particle::{Particle, ParticleStore, read_payload, write_payload};

use super::{LodBlend, Module, ModuleContext, sample_blended};

/// Below this length a line attractor is degenerate and does nothing
const MIN_LINE_LENGTH: f32 = 1.0e-4;

fn apply_pull(particle: &mut Particle, pull: Vec3, affect_base_velocity: bool) {
    particle.velocity += pull;
    if affect_base_velocity {
        particle.base_velocity += pull;
    }
}

/// Strength after the optional linear falloff toward the edge of `range`
fn falloff(strength: f32, distance: f32, range: f32, by_distance: bool) -> f32 {
    if by_distance && range > 0.0 {
        strength * ((range - distance) / range).max(0.0)
    } else {
        strength
    }
}

/// Pulls particles toward the segment between two points
///
/// Range and strength are sampled at how far along the segment the particle
/// projects, from 0 at the first end point to 1 at the second. Particles
/// projecting outside the segment are not affected.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineAttractorModule {
    /// End points in emitter space
    pub end_point0: Vec3,
    pub end_point1: Vec3,
    pub range: Option<Distribution<f32>>,
    pub strength: Option<Distribution<f32>>,
    pub affect_base_velocity: bool,
}

impl Module for LineAttractorModule {
    fn update(&self, ctx: &mut ModuleContext<'_>, lod: Option<LodBlend<'_, Self>>) {
        let start = ctx.frame.sim_point(self.end_point0);
        let end = ctx.frame.sim_point(self.end_point1);
        let line = end - start;
        let length = line.length();
        if length < MIN_LINE_LENGTH {
            return;
        }
        let line_norm = line / length;
        let delta_time = ctx.frame.delta_time;

        for index in 0..ctx.particles.active_count() {
            let Some(slot) = ctx.particles.slot(index) else {
                continue;
            };
            let Some(location) = ctx.particles.particle(slot).map(|p| p.location) else {
                continue;
            };

            let to_particle = location - start;
            let fraction = to_particle.dot(line_norm) / length;
            if !(0.0..=1.0).contains(&fraction) {
                continue;
            }
            let to_line = start + line * fraction - location;
            let distance = to_line.length();

            let range = sample_blended(
                self,
                lod,
                |m| m.range.as_ref(),
                fraction,
                &mut ctx.sampler,
                0.0,
            );
            if distance > range {
                continue;
            }
            let strength = sample_blended(
                self,
                lod,
                |m| m.strength.as_ref(),
                fraction,
                &mut ctx.sampler,
                0.0,
            );
            let direction = line_norm.cross(to_line.cross(line_norm)).normalize_or_zero();

            if let Some(particle) = ctx.particles.particle_mut(slot) {
                apply_pull(
                    particle,
                    direction * strength * delta_time,
                    self.affect_base_velocity,
                );
            }
        }
    }
}

/// Pulls particles toward a point
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointAttractorModule {
    /// Attractor position in emitter space, sampled at the particle's age
    pub position: Option<Distribution<Vec3>>,
    pub range: Option<Distribution<f32>>,
    pub strength: Option<Distribution<f32>>,
    /// Strength falls off linearly to zero at the edge of the range
    pub strength_by_distance: bool,
    pub affect_base_velocity: bool,
}

impl Module for PointAttractorModule {
    fn update(&self, ctx: &mut ModuleContext<'_>, lod: Option<LodBlend<'_, Self>>) {
        let delta_time = ctx.frame.delta_time;

        for index in 0..ctx.particles.active_count() {
            let Some(slot) = ctx.particles.slot(index) else {
                continue;
            };
            let Some((location, age)) = ctx
                .particles
                .particle(slot)
                .map(|p| (p.location, p.relative_time))
            else {
                continue;
            };

            let position = sample_blended(
                self,
                lod,
                |m| m.position.as_ref(),
                age,
                &mut ctx.sampler,
                Vec3::ZERO,
            );
            let range = sample_blended(
                self,
                lod,
                |m| m.range.as_ref(),
                age,
                &mut ctx.sampler,
                0.0,
            );
            let to_point = ctx.frame.sim_point(position) - location;
            let distance = to_point.length();
            if distance > range {
                continue;
            }
            let strength = sample_blended(
                self,
                lod,
                |m| m.strength.as_ref(),
                age,
                &mut ctx.sampler,
                0.0,
            );
            let strength = falloff(strength, distance, range, self.strength_by_distance);

            if let Some(particle) = ctx.particles.particle_mut(slot) {
                apply_pull(
                    particle,
                    to_point.normalize_or_zero() * strength * delta_time,
                    self.affect_base_velocity,
                );
            }
        }
    }
}

/// How a particle attractor picks a source particle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceSelection {
    #[default]
    Random,
    /// Walk the source emitter's live particles in order, wrapping around
    Sequential,
}

/// Payload of [`ParticleAttractorModule`]: the bound source particle
///
/// A serial of zero means no source is bound.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct AttractorSource {
    pub slot: u32,
    pub serial: u32,
}

impl AttractorSource {
    pub fn is_bound(&self) -> bool {
        self.serial != 0
    }
}

/// Pulls each particle toward a particle of a sibling emitter
///
/// Every particle binds to one source particle at spawn. When the source dies
/// the particle is left alone, unless `renew_source` is set, in which case it
/// binds to a new source. Range and strength are sampled at the source
/// particle's age. Positions of both emitters are compared as stored, so the
/// two should simulate in the same space.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParticleAttractorModule {
    /// Name of the sibling emitter providing source particles
    pub emitter_name: String,
    pub selection: SourceSelection,
    pub renew_source: bool,
    /// Add the source particle's velocity as well
    pub inherit_source_velocity: bool,
    pub range: Option<Distribution<f32>>,
    pub strength: Option<Distribution<f32>>,
    pub strength_by_distance: bool,
    pub affect_base_velocity: bool,
}

impl ParticleAttractorModule {
    pub fn new(emitter_name: impl Into<String>) -> Self {
        Self {
            emitter_name: emitter_name.into(),
            ..Default::default()
        }
    }

    /// Choose a live source particle, advancing the sequential cursor
    fn select_source(
        &self,
        ctx: &mut ModuleContext<'_>,
        source: &ParticleStore,
    ) -> AttractorSource {
        let count = source.active_count();
        let index = match self.selection {
            SourceSelection::Random => ctx.sampler.rng().next_index(count),
            SourceSelection::Sequential if count > 0 => {
                let cursor: u32 = read_payload(ctx.instance).unwrap_or(0);
                let index = cursor as usize % count;
                write_payload(ctx.instance, &u32::try_from(index + 1).unwrap_or(0));
                Some(index)
            }
            SourceSelection::Sequential => None,
        };
        index
            .and_then(|index| source.slot(index))
            .and_then(|slot| source.particle(slot).map(|p| (slot, p.serial)))
            .map_or_else(AttractorSource::default, |(slot, serial)| AttractorSource {
                slot,
                serial,
            })
    }
}

impl Module for ParticleAttractorModule {
    fn required_bytes(&self, _required: &RequiredModule) -> usize {
        std::mem::size_of::<AttractorSource>()
    }

    fn required_instance_bytes(&self) -> usize {
        std::mem::size_of::<u32>()
    }

    fn spawn(
        &self,
        ctx: &mut ModuleContext<'_>,
        slot: u32,
        _spawn_time: f32,
        _lod: Option<LodBlend<'_, Self>>,
    ) {
        let siblings = ctx.siblings;
        let Some(source) = siblings.find(&self.emitter_name) else {
            log::trace!("Attractor source emitter '{}' not found", self.emitter_name);
            return;
        };
        let binding = self.select_source(ctx, source);
        if let Some(record) = ctx.particles.record(slot) {
            write_payload(record.payload, &binding);
        }
    }

    fn update(&self, ctx: &mut ModuleContext<'_>, lod: Option<LodBlend<'_, Self>>) {
        let siblings = ctx.siblings;
        let Some(source) = siblings.find(&self.emitter_name) else {
            log::trace!("Attractor source emitter '{}' not found", self.emitter_name);
            return;
        };
        let delta_time = ctx.frame.delta_time;

        for index in 0..ctx.particles.active_count() {
            let Some(slot) = ctx.particles.slot(index) else {
                continue;
            };
            let Some((binding, location)) = ctx.particles.record(slot).map(|record| {
                let binding: AttractorSource = read_payload(record.payload).unwrap_or_default();
                (binding, record.particle.location)
            }) else {
                continue;
            };

            let live = binding
                .is_bound()
                .then(|| source.live_particle(binding.slot, binding.serial))
                .flatten();
            let source_particle = match live {
                Some(particle) => *particle,
                None if self.renew_source => {
                    let renewed = self.select_source(ctx, source);
                    if let Some(record) = ctx.particles.record(slot) {
                        write_payload(record.payload, &renewed);
                    }
                    match source.live_particle(renewed.slot, renewed.serial) {
                        Some(particle) if renewed.is_bound() => *particle,
                        _ => continue,
                    }
                }
                None => {
                    if binding.is_bound() {
                        if let Some(record) = ctx.particles.record(slot) {
                            write_payload(record.payload, &AttractorSource::default());
                        }
                    }
                    continue;
                }
            };

            let age = source_particle.relative_time;
            let range = sample_blended(
                self,
                lod,
                |m| m.range.as_ref(),
                age,
                &mut ctx.sampler,
                0.0,
            );
            let to_source = source_particle.location - location;
            let distance = to_source.length();
            if distance > range {
                continue;
            }
            let strength = sample_blended(
                self,
                lod,
                |m| m.strength.as_ref(),
                age,
                &mut ctx.sampler,
                0.0,
            );
            let strength = falloff(strength, distance, range, self.strength_by_distance);

            if let Some(particle) = ctx.particles.particle_mut(slot) {
                apply_pull(
                    particle,
                    to_source.normalize_or_zero() * strength * delta_time,
                    self.affect_base_velocity,
                );
                if self.inherit_source_velocity {
                    particle.velocity += source_particle.velocity;
                }
            }
        }
    }
}
