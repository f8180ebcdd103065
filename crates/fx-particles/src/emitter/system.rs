//! Particle systems: several emitters simulated together

use std::sync::Arc;

use glam::Mat4;

use crate::distribution::ParameterSet;
use crate::error::{ParticleError, Result};
use crate::module::SiblingEmitters;
use crate::particle::ParticleStore;

use super::{EmitterInstance, ParticleEmitter, TickEnvironment, TickStats};

/// A named group of emitter templates
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParticleSystem {
    pub name: String,
    pub emitters: Vec<Arc<ParticleEmitter>>,
}

impl ParticleSystem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            emitters: Vec::new(),
        }
    }

    pub fn with_emitter(mut self, emitter: ParticleEmitter) -> Self {
        self.emitters.push(Arc::new(emitter));
        self
    }

    pub fn emitter(&self, name: &str) -> Option<&Arc<ParticleEmitter>> {
        self.emitters.iter().find(|e| e.name == name)
    }
}

/// Every emitter of the system except the one being ticked
struct SiblingView<'a> {
    before: &'a [EmitterInstance],
    after: &'a [EmitterInstance],
}

impl SiblingEmitters for SiblingView<'_> {
    fn find(&self, name: &str) -> Option<&ParticleStore> {
        self.before
            .iter()
            .chain(self.after)
            .find(|instance| instance.name() == name)
            .map(EmitterInstance::store)
    }
}

/// Running copy of a [`ParticleSystem`]
///
/// Emitters tick in template order and see each other's particles through
/// [`SiblingEmitters`], so an attractor sees the source emitter as of this
/// tick if the source comes first and as of the last tick otherwise.
#[derive(Debug, Clone)]
pub struct ParticleSystemInstance {
    name: String,
    emitters: Vec<EmitterInstance>,
    parameters: ParameterSet,
}

impl ParticleSystemInstance {
    /// Instantiate every emitter; emitter `i` is seeded with `seed + i`
    pub fn new(system: &ParticleSystem, seed: u64) -> Result<Self> {
        let emitters = system
            .emitters
            .iter()
            .enumerate()
            .map(|(index, template)| {
                EmitterInstance::new(Arc::clone(template), seed.wrapping_add(index as u64))
            })
            .collect::<Result<Vec<_>>>()?;
        log::info!(
            "Instantiated particle system '{}' with {} emitters",
            system.name,
            emitters.len()
        );
        Ok(Self {
            name: system.name.clone(),
            emitters,
            parameters: ParameterSet::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn emitters(&self) -> &[EmitterInstance] {
        &self.emitters
    }

    pub fn emitter(&self, name: &str) -> Result<&EmitterInstance> {
        self.emitters
            .iter()
            .find(|e| e.name() == name)
            .ok_or_else(|| ParticleError::UnknownEmitter(name.to_string()))
    }

    pub fn emitter_mut(&mut self, name: &str) -> Result<&mut EmitterInstance> {
        self.emitters
            .iter_mut()
            .find(|e| e.name() == name)
            .ok_or_else(|| ParticleError::UnknownEmitter(name.to_string()))
    }

    /// Instance parameters read by parameter distributions
    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterSet {
        &mut self.parameters
    }

    /// Move every emitter to a new local-to-world transform
    pub fn set_transform(&mut self, local_to_world: Mat4) {
        for emitter in &mut self.emitters {
            emitter.set_transform(local_to_world);
        }
    }

    /// Switch every emitter to LOD `index`
    ///
    /// Nothing changes unless every emitter has that level.
    pub fn set_lod(&mut self, index: usize) -> Result<()> {
        if let Some(short) = self.emitters.iter().find(|e| e.template().lod_count() <= index) {
            return Err(ParticleError::InvalidLod {
                index,
                count: short.template().lod_count(),
            });
        }
        self.emitters.iter_mut().try_for_each(|e| e.set_lod(index))
    }

    pub fn active_count(&self) -> usize {
        self.emitters.iter().map(EmitterInstance::active_count).sum()
    }

    /// Tick every emitter and return the combined counts
    pub fn tick(&mut self, delta_time: f32) -> TickStats {
        let mut total = TickStats::default();
        for index in 0..self.emitters.len() {
            let (before, rest) = self.emitters.split_at_mut(index);
            let Some((current, after)) = rest.split_first_mut() else {
                continue;
            };
            let siblings = SiblingView { before, after };
            let env = TickEnvironment {
                parameters: Some(&self.parameters),
                siblings: &siblings,
            };
            let stats = current.tick(delta_time, &env);
            total.spawned += stats.spawned;
            total.killed += stats.killed;
            total.active += stats.active;
        }
        total
    }

    /// Remove every particle and restart every emitter
    pub fn reset(&mut self) {
        for emitter in &mut self.emitters {
            emitter.reset();
        }
    }
}
