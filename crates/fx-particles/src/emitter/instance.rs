//! Running instance of an emitter template

use std::fmt;
use std::sync::Arc;

use glam::Mat4;

use crate::distribution::{ParameterSource, Sampler, sample_or};
use crate::error::{ParticleError, Result};
use crate::module::{
    FrameState, ModuleContext, NoSiblings, ParticleAccess, ParticleModule, SiblingEmitters,
};
use crate::particle::{InstanceLayout, Particle, ParticleStore, PayloadLayout, PayloadRange};
use crate::random::EmitterRng;

use super::{LodLevel, ParticleEmitter, RequiredModule};

/// Collaborators an emitter consults while spawning and ticking
#[derive(Clone, Copy)]
pub struct TickEnvironment<'a> {
    /// Named values for parameter distributions
    pub parameters: Option<&'a dyn ParameterSource>,
    /// Other emitters of the same system
    pub siblings: &'a dyn SiblingEmitters,
}

impl TickEnvironment<'static> {
    /// No parameters and no siblings
    pub fn isolated() -> Self {
        Self {
            parameters: None,
            siblings: &NoSiblings,
        }
    }
}

impl fmt::Debug for TickEnvironment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickEnvironment")
            .field("has_parameters", &self.parameters.is_some())
            .finish_non_exhaustive()
    }
}

/// Counts from one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickStats {
    pub spawned: usize,
    pub killed: usize,
    pub active: usize,
}

/// A lower LOD blended into the active one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodPreview {
    pub lower: usize,
    /// Weight of the active LOD, in [0, 1]
    pub alpha: f32,
}

fn instance_slice(data: &mut [u8], range: Option<PayloadRange>) -> &mut [u8] {
    range
        .and_then(|range| data.get_mut(range.as_range()))
        .unwrap_or_default()
}

/// One running copy of a [`ParticleEmitter`]
///
/// The instance owns the particle store, its random source and the payload
/// layout of the active LOD. Templates are shared through `Arc`, so many
/// instances of the same emitter can run independently.
#[derive(Debug, Clone)]
pub struct EmitterInstance {
    template: Arc<ParticleEmitter>,
    lod_index: usize,
    preview: Option<LodPreview>,
    layout: PayloadLayout,
    instance_layout: InstanceLayout,
    instance_data: Vec<u8>,
    store: ParticleStore,
    rng: EmitterRng,
    local_to_world: Mat4,
    emitter_time: f32,
    delta_time: f32,
    spawn_fraction: f32,
    loops_completed: u32,
    bursts_fired: Vec<bool>,
    finished: bool,
}

impl EmitterInstance {
    /// Create an instance running the template's first LOD
    pub fn new(template: Arc<ParticleEmitter>, seed: u64) -> Result<Self> {
        let Some(lod) = template.lods.first() else {
            return Err(ParticleError::NoLodLevels(template.name.clone()));
        };
        if template.max_particles == 0 {
            return Err(ParticleError::InvalidMaxParticles(template.max_particles));
        }
        for level in &template.lods {
            let required = &level.required;
            if required.sub_images_horizontal == 0 || required.sub_images_vertical == 0 {
                return Err(ParticleError::InvalidSubImageGrid {
                    horizontal: required.sub_images_horizontal,
                    vertical: required.sub_images_vertical,
                });
            }
        }

        let layout = PayloadLayout::compute(lod);
        let instance_layout = InstanceLayout::compute(&lod.modules);
        log::debug!(
            "Creating emitter '{}': {} modules, stride {}, capacity {}",
            template.name,
            lod.modules.len(),
            layout.stride(),
            template.max_particles
        );

        Ok(Self {
            store: ParticleStore::new(layout.stride(), template.max_particles),
            instance_data: vec![0; instance_layout.total()],
            bursts_fired: vec![false; lod.required.bursts.len()],
            template,
            lod_index: 0,
            preview: None,
            layout,
            instance_layout,
            rng: EmitterRng::new(seed),
            local_to_world: Mat4::IDENTITY,
            emitter_time: 0.0,
            delta_time: 0.0,
            spawn_fraction: 0.0,
            loops_completed: 0,
            finished: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.template.name
    }

    pub fn template(&self) -> &Arc<ParticleEmitter> {
        &self.template
    }

    pub fn lod_index(&self) -> usize {
        self.lod_index
    }

    pub fn lod_preview(&self) -> Option<LodPreview> {
        self.preview
    }

    pub fn layout(&self) -> &PayloadLayout {
        &self.layout
    }

    pub fn instance_layout(&self) -> &InstanceLayout {
        &self.instance_layout
    }

    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    pub fn active_count(&self) -> usize {
        self.store.active_count()
    }

    /// Seconds into the current loop
    pub fn emitter_time(&self) -> f32 {
        self.emitter_time
    }

    pub fn loops_completed(&self) -> u32 {
        self.loops_completed
    }

    /// Whether every configured loop has run; live particles still update
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn transform(&self) -> Mat4 {
        self.local_to_world
    }

    pub fn set_transform(&mut self, local_to_world: Mat4) {
        self.local_to_world = local_to_world;
    }

    /// Base record of the live particle at `active_index`
    pub fn particle(&self, active_index: usize) -> Option<&Particle> {
        self.store.active_particle(active_index)
    }

    /// Live particles in spawn order
    pub fn particles(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.store.iter()
    }

    /// Whole payload region of the live particle at `active_index`
    pub fn payload(&self, active_index: usize) -> Option<&[u8]> {
        self.store
            .slot(active_index)
            .and_then(|slot| self.store.payload(slot))
    }

    /// Payload bytes of one module for the live particle at `active_index`
    pub fn module_payload(&self, active_index: usize, module_index: usize) -> Option<&[u8]> {
        let range = self.layout.range(module_index)?;
        self.payload(active_index)?.get(range.as_range())
    }

    /// Sub-image record of the live particle at `active_index`
    pub fn sub_image_payload(&self, active_index: usize) -> Option<&[u8]> {
        let range = self.layout.sub_image()?;
        self.payload(active_index)?.get(range.as_range())
    }

    /// Per-instance scratch block of a module
    pub fn instance_block(&self, module_index: usize) -> Option<&[u8]> {
        let range = self.instance_layout.range(module_index)?;
        self.instance_data.get(range.as_range())
    }

    /// Remove the live particle at `active_index` immediately
    pub fn remove_particle(&mut self, active_index: usize) -> bool {
        self.store.remove(active_index)
    }

    /// Remove every particle and restart the emitter clock
    pub fn reset(&mut self) {
        self.store.clear();
        self.instance_data.fill(0);
        self.bursts_fired.fill(false);
        self.emitter_time = 0.0;
        self.spawn_fraction = 0.0;
        self.loops_completed = 0;
        self.finished = false;
    }

    /// Make another LOD level active
    ///
    /// The payload layout is recomputed; if it changes, live particles are
    /// discarded since their payload no longer matches. Any preview is
    /// cleared.
    pub fn set_lod(&mut self, index: usize) -> Result<()> {
        let template = Arc::clone(&self.template);
        let Some(lod) = template.lods.get(index) else {
            return Err(ParticleError::InvalidLod {
                index,
                count: template.lods.len(),
            });
        };
        self.preview = None;
        if index == self.lod_index {
            return Ok(());
        }

        let layout = PayloadLayout::compute(lod);
        if layout != self.layout {
            log::debug!(
                "Emitter '{}' LOD {} -> {} changes the payload layout, dropping {} particles",
                template.name,
                self.lod_index,
                index,
                self.store.active_count()
            );
            self.store = ParticleStore::new(layout.stride(), template.max_particles);
        }
        let instance_layout = InstanceLayout::compute(&lod.modules);
        if instance_layout != self.instance_layout {
            self.instance_data = vec![0; instance_layout.total()];
        }

        log::debug!("Emitter '{}' switched to LOD {}", template.name, index);
        self.layout = layout;
        self.instance_layout = instance_layout;
        self.bursts_fired.resize(lod.required.bursts.len(), false);
        self.lod_index = index;
        Ok(())
    }

    /// Blend the active LOD with `lower` while ticking
    ///
    /// Both levels must list the same module types in the same order with
    /// the same payload sizes.
    pub fn set_lod_preview(&mut self, lower: usize, alpha: f32) -> Result<()> {
        let count = self.template.lods.len();
        let Some(lower_lod) = self.template.lods.get(lower) else {
            return Err(ParticleError::InvalidLod {
                index: lower,
                count,
            });
        };
        let primary = self
            .template
            .lods
            .get(self.lod_index)
            .ok_or(ParticleError::InvalidLod {
                index: self.lod_index,
                count,
            })?;

        let modules = primary.modules.len().max(lower_lod.modules.len());
        for module_index in 0..modules {
            let a = primary.modules.get(module_index);
            let b = lower_lod.modules.get(module_index);
            let compatible = match (a, b) {
                (Some(a), Some(b)) => {
                    a.kind() == b.kind()
                        && a.required_bytes(&primary.required)
                            == b.required_bytes(&lower_lod.required)
                }
                _ => false,
            };
            if !compatible {
                return Err(ParticleError::LodMismatch {
                    module_index,
                    primary: a.map(ParticleModule::kind),
                    lower: b.map(ParticleModule::kind),
                });
            }
        }

        if !(0.0..=1.0).contains(&alpha) {
            log::warn!("LOD preview alpha {alpha} clamped to [0, 1]");
        }
        self.preview = Some(LodPreview {
            lower,
            alpha: alpha.clamp(0.0, 1.0),
        });
        Ok(())
    }

    pub fn clear_lod_preview(&mut self) {
        self.preview = None;
    }

    fn frame(&self, delta_time: f32, required: &RequiredModule) -> FrameState {
        FrameState {
            emitter_time: self.emitter_time,
            delta_time,
            local_to_world: self.local_to_world,
            use_local_space: required.use_local_space,
        }
    }

    fn module_context<'s>(
        &'s mut self,
        module_index: usize,
        frame: FrameState,
        required: &'s RequiredModule,
        env: TickEnvironment<'s>,
    ) -> ModuleContext<'s> {
        let payload = self.layout.range(module_index);
        let sub_image = self.layout.sub_image();
        let instance = instance_slice(
            &mut self.instance_data,
            self.instance_layout.range(module_index),
        );
        ModuleContext::new(
            frame,
            required,
            Sampler::new(&mut self.rng, env.parameters),
            ParticleAccess::new(&mut self.store, payload, sub_image),
            instance,
            env.siblings,
        )
    }

    /// Active LOD and, while previewing, the lower LOD with its weight
    fn levels(
        template: &ParticleEmitter,
        lod_index: usize,
        preview: Option<LodPreview>,
    ) -> Option<(&LodLevel, Option<(&LodLevel, f32)>)> {
        let lod = template.lods.get(lod_index)?;
        let lower = preview
            .and_then(|p| template.lods.get(p.lower).map(|level| (level, p.alpha)));
        Some((lod, lower))
    }

    /// Spawn `count` particles
    ///
    /// Particle `i` is treated as spawned `start_time - i * increment`
    /// seconds ago and is advanced along its velocity by that amount. Returns
    /// how many particles were actually spawned, which is less than `count`
    /// once the store is full.
    pub fn spawn_particles(
        &mut self,
        count: usize,
        start_time: f32,
        increment: f32,
        env: &TickEnvironment<'_>,
    ) -> usize {
        let template = Arc::clone(&self.template);
        let Some((lod, lower)) = Self::levels(&template, self.lod_index, self.preview) else {
            return 0;
        };
        let frame = self.frame(self.delta_time, &lod.required);
        let origin = frame.emitter_origin();

        let mut spawned = 0;
        for i in 0..count {
            let Some(slot) = self.store.allocate() else {
                log::trace!(
                    "Emitter '{}' is full, dropping {} spawns",
                    template.name,
                    count - i
                );
                break;
            };
            let spawn_time = (start_time - i as f32 * increment).max(0.0);
            if let Some(particle) = self.store.particle_mut(slot) {
                particle.location = origin;
                particle.old_location = origin;
            }

            for (module_index, module) in lod.modules.iter().enumerate() {
                let counterpart = lower.and_then(|(level, alpha)| {
                    level.modules.get(module_index).map(|m| (m, alpha))
                });
                let mut ctx = self.module_context(module_index, frame, &lod.required, *env);
                module.spawn(&mut ctx, slot, spawn_time, counterpart);
            }

            if let Some(particle) = self.store.particle_mut(slot) {
                particle.old_location = particle.location;
                particle.location += particle.velocity * spawn_time;
            }
            spawned += 1;
        }
        spawned
    }

    /// Advance the emitter by `delta_time` seconds
    ///
    /// Live particles age and reset to their base values, modules update them
    /// in list order, velocities are integrated, requested kills are applied,
    /// and finally new particles are spawned from the spawn rate and bursts.
    pub fn tick(&mut self, delta_time: f32, env: &TickEnvironment<'_>) -> TickStats {
        let template = Arc::clone(&self.template);
        let Some((lod, lower)) = Self::levels(&template, self.lod_index, self.preview) else {
            return TickStats::default();
        };
        self.delta_time = delta_time;

        let mut killed = self.age_particles(delta_time);

        let frame = self.frame(delta_time, &lod.required);
        for (module_index, module) in lod.modules.iter().enumerate() {
            let counterpart = lower
                .and_then(|(level, alpha)| level.modules.get(module_index).map(|m| (m, alpha)));
            let mut ctx = self.module_context(module_index, frame, &lod.required, *env);
            module.update(&mut ctx, counterpart);
        }

        self.integrate(delta_time);
        killed += self.store.compact();

        let (rate_count, burst_count) = self.advance_time(&lod.required, delta_time, env);
        let mut spawned = 0;
        if rate_count > 0 {
            let increment = delta_time / rate_count as f32;
            spawned += self.spawn_particles(rate_count, delta_time - increment, increment, env);
        }
        if burst_count > 0 {
            spawned += self.spawn_particles(burst_count, 0.0, 0.0, env);
        }

        let stats = TickStats {
            spawned,
            killed,
            active: self.store.active_count(),
        };
        log::trace!("Emitter '{}' tick: {:?}", template.name, stats);
        stats
    }

    /// Reset per-tick fields, age particles and drop the expired ones
    fn age_particles(&mut self, delta_time: f32) -> usize {
        for index in 0..self.store.active_count() {
            let Some(slot) = self.store.slot(index) else {
                continue;
            };
            let expired = match self.store.particle_mut(slot) {
                Some(particle) => {
                    particle.reset_to_base();
                    particle.relative_time += particle.one_over_max_lifetime * delta_time;
                    particle.relative_time > 1.0
                }
                None => false,
            };
            if expired {
                self.store.request_kill(slot);
            }
        }
        self.store.compact()
    }

    fn integrate(&mut self, delta_time: f32) {
        for index in 0..self.store.active_count() {
            let Some(slot) = self.store.slot(index) else {
                continue;
            };
            if let Some(particle) = self.store.particle_mut(slot) {
                particle.old_location = particle.location;
                particle.location += particle.velocity * delta_time;
                particle.rotation += particle.rotation_rate * delta_time;
            }
        }
    }

    /// Advance the emitter clock and count the particles due this tick
    ///
    /// Returns the spawn-rate count and the burst count separately.
    fn advance_time(
        &mut self,
        required: &RequiredModule,
        delta_time: f32,
        env: &TickEnvironment<'_>,
    ) -> (usize, usize) {
        if self.finished {
            return (0, 0);
        }

        let rate = {
            let mut sampler = Sampler::new(&mut self.rng, env.parameters);
            sample_or(
                required.spawn_rate.as_ref(),
                self.emitter_time,
                &mut sampler,
                0.0,
            )
        };
        let due = self.spawn_fraction + rate.max(0.0) * delta_time;
        let whole = due.floor();
        self.spawn_fraction = due - whole;
        let rate_count = whole as usize;

        self.emitter_time += delta_time;
        let mut burst_count = self.fire_bursts(required);

        if required.duration > 0.0 && self.emitter_time >= required.duration {
            self.loops_completed += 1;
            if required.loops != 0 && self.loops_completed >= required.loops {
                log::debug!(
                    "Emitter '{}' finished after {} loops",
                    self.template.name,
                    self.loops_completed
                );
                self.finished = true;
                self.emitter_time = required.duration;
            } else {
                self.emitter_time %= required.duration;
                self.bursts_fired.fill(false);
                burst_count += self.fire_bursts(required);
            }
        }
        (rate_count, burst_count)
    }

    fn fire_bursts(&mut self, required: &RequiredModule) -> usize {
        let mut total = 0;
        for (burst, fired) in required.bursts.iter().zip(self.bursts_fired.iter_mut()) {
            if *fired || self.emitter_time < burst.time * required.duration {
                continue;
            }
            *fired = true;
            total += match burst.count_low {
                Some(low) if low < burst.count => {
                    let spread = (burst.count - low) as usize + 1;
                    low as usize + self.rng.next_index(spread).unwrap_or(0)
                }
                _ => burst.count as usize,
            };
        }
        total
    }
}
