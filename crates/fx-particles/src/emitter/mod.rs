//! Emitter templates and their running instances
//!
//! A [`ParticleEmitter`] is an immutable template: a name, a particle budget
//! and one or more LOD levels, each with its required settings and module
//! list. [`EmitterInstance`] runs a template, and [`ParticleSystemInstance`]
//! runs several emitters side by side so they can see each other.

mod instance;
mod system;

pub use instance::{EmitterInstance, LodPreview, TickEnvironment, TickStats};
pub use system::{ParticleSystem, ParticleSystemInstance};

use crate::distribution::Distribution;
use crate::module::{ModuleKind, ParticleModule};

/// How the sub-image grid is walked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SubImageMethod {
    /// No sub-image record is kept
    #[default]
    None,
    Linear,
    /// Linear, blending toward the next image
    LinearBlend,
    Random,
    /// Random, blending toward the next random pick
    RandomBlend,
}

/// A one-off spawn at a fraction of the emitter duration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burst {
    /// Position in the loop, 0 at the start and 1 at the end
    pub time: f32,
    pub count: u32,
    /// When set, the count is picked uniformly in `count_low..=count`
    pub count_low: Option<u32>,
}

impl Burst {
    pub fn new(time: f32, count: u32) -> Self {
        Self {
            time,
            count,
            count_low: None,
        }
    }

    pub fn with_range(time: f32, low: u32, high: u32) -> Self {
        Self {
            time,
            count: high.max(low),
            count_low: Some(low.min(high)),
        }
    }
}

/// Settings every LOD level carries regardless of its modules
#[derive(Debug, Clone, PartialEq)]
pub struct RequiredModule {
    /// Simulate particles in emitter space instead of world space
    pub use_local_space: bool,
    pub sub_images_horizontal: u32,
    pub sub_images_vertical: u32,
    pub sub_image_method: SubImageMethod,
    /// Normalized age a random sub-image is shown before a new pick
    pub random_image_time: f32,
    /// Particles per second, sampled at emitter time
    pub spawn_rate: Option<Distribution<f32>>,
    pub bursts: Vec<Burst>,
    /// Length of one emitter loop, in seconds
    pub duration: f32,
    /// Number of loops to run, 0 for no limit
    pub loops: u32,
}

impl Default for RequiredModule {
    fn default() -> Self {
        Self {
            use_local_space: false,
            sub_images_horizontal: 1,
            sub_images_vertical: 1,
            sub_image_method: SubImageMethod::None,
            random_image_time: 0.0,
            spawn_rate: None,
            bursts: Vec::new(),
            duration: 1.0,
            loops: 0,
        }
    }
}

impl RequiredModule {
    /// Images in the flipbook grid, saturating at `u32::MAX`
    pub fn total_sub_images(&self) -> u32 {
        self.sub_images_horizontal.saturating_mul(self.sub_images_vertical)
    }

    pub fn with_spawn_rate(mut self, rate: impl Into<Distribution<f32>>) -> Self {
        self.spawn_rate = Some(rate.into());
        self
    }

    pub fn with_burst(mut self, burst: Burst) -> Self {
        self.bursts.push(burst);
        self
    }

    pub fn with_duration(mut self, duration: f32, loops: u32) -> Self {
        self.duration = duration;
        self.loops = loops;
        self
    }

    pub fn with_sub_images(
        mut self,
        horizontal: u32,
        vertical: u32,
        method: SubImageMethod,
    ) -> Self {
        self.sub_images_horizontal = horizontal;
        self.sub_images_vertical = vertical;
        self.sub_image_method = method;
        self
    }
}

/// One level of detail: required settings and an ordered module list
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LodLevel {
    pub required: RequiredModule,
    pub modules: Vec<ParticleModule>,
}

impl LodLevel {
    pub fn new(required: RequiredModule) -> Self {
        Self {
            required,
            modules: Vec::new(),
        }
    }

    pub fn with_module(mut self, module: impl Into<ParticleModule>) -> Self {
        self.modules.push(module.into());
        self
    }

    pub fn module_kinds(&self) -> Vec<ModuleKind> {
        self.modules.iter().map(ParticleModule::kind).collect()
    }
}

/// Immutable emitter template shared by its instances
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleEmitter {
    pub name: String,
    /// Upper bound on simultaneously live particles
    pub max_particles: usize,
    /// Levels of detail, highest detail first
    pub lods: Vec<LodLevel>,
}

impl ParticleEmitter {
    pub fn new(name: impl Into<String>, max_particles: usize) -> Self {
        Self {
            name: name.into(),
            max_particles,
            lods: Vec::new(),
        }
    }

    pub fn with_lod(mut self, lod: LodLevel) -> Self {
        self.lods.push(lod);
        self
    }

    pub fn lod(&self, index: usize) -> Option<&LodLevel> {
        self.lods.get(index)
    }

    pub fn lod_count(&self) -> usize {
        self.lods.len()
    }
}
