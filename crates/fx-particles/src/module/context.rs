//! State handed to modules during spawn and update

use glam::{Mat4, Vec3};

use crate::distribution::Sampler;
use crate::emitter::RequiredModule;
use crate::particle::{Particle, ParticleStore, PayloadRange};

/// Per-tick emitter state shared by every module
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    /// Time within the current emitter loop, in seconds
    pub emitter_time: f32,
    pub delta_time: f32,
    pub local_to_world: Mat4,
    /// Particles are simulated in emitter space rather than world space
    pub use_local_space: bool,
}

impl FrameState {
    /// Bring an emitter-space vector into simulation space
    pub fn sim_vector(&self, vector: Vec3) -> Vec3 {
        if self.use_local_space {
            vector
        } else {
            self.local_to_world.transform_vector3(vector)
        }
    }

    /// Bring a world-space vector into simulation space
    pub fn world_to_sim_vector(&self, vector: Vec3) -> Vec3 {
        if self.use_local_space {
            self.local_to_world.inverse().transform_vector3(vector)
        } else {
            vector
        }
    }

    /// Bring an emitter-space point into simulation space
    pub fn sim_point(&self, point: Vec3) -> Vec3 {
        if self.use_local_space {
            point
        } else {
            self.local_to_world.transform_point3(point)
        }
    }

    /// Emitter origin in simulation space
    pub fn emitter_origin(&self) -> Vec3 {
        self.sim_point(Vec3::ZERO)
    }

    /// Emitter origin in world space
    pub fn world_origin(&self) -> Vec3 {
        self.local_to_world.transform_point3(Vec3::ZERO)
    }

    /// World-space position of a particle location
    pub fn world_point(&self, location: Vec3) -> Vec3 {
        if self.use_local_space {
            self.local_to_world.transform_point3(location)
        } else {
            location
        }
    }
}

/// Lookup of other emitters of the same particle system by name
pub trait SiblingEmitters {
    fn find(&self, name: &str) -> Option<&ParticleStore>;
}

/// Sibling lookup for an emitter simulated on its own
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSiblings;

impl SiblingEmitters for NoSiblings {
    fn find(&self, _name: &str) -> Option<&ParticleStore> {
        None
    }
}

/// Mutable view of one particle as seen by one module
#[derive(Debug)]
pub struct ModuleRecord<'a> {
    pub particle: &'a mut Particle,
    /// The module's own payload bytes, empty if it requested none
    pub payload: &'a mut [u8],
    /// The emitter-owned sub-image record, if the LOD interpolates sub-images
    pub sub_image: Option<&'a mut [u8]>,
}

/// Particle access restricted to one module's payload range
#[derive(Debug)]
pub struct ParticleAccess<'a> {
    store: &'a mut ParticleStore,
    payload: Option<PayloadRange>,
    sub_image: Option<PayloadRange>,
}

impl<'a> ParticleAccess<'a> {
    pub(crate) fn new(
        store: &'a mut ParticleStore,
        payload: Option<PayloadRange>,
        sub_image: Option<PayloadRange>,
    ) -> Self {
        Self {
            store,
            payload,
            sub_image,
        }
    }

    pub fn active_count(&self) -> usize {
        self.store.active_count()
    }

    /// Slot of the live particle at `active_index`
    pub fn slot(&self, active_index: usize) -> Option<u32> {
        self.store.slot(active_index)
    }

    pub fn particle(&self, slot: u32) -> Option<&Particle> {
        self.store.particle(slot)
    }

    pub fn particle_mut(&mut self, slot: u32) -> Option<&mut Particle> {
        self.store.particle_mut(slot)
    }

    /// Whether the module was assigned payload bytes
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// Whether the emitter assigned a sub-image record
    pub fn has_sub_image(&self) -> bool {
        self.sub_image.is_some()
    }

    /// Base record, own payload and sub-image record of a slot
    pub fn record(&mut self, slot: u32) -> Option<ModuleRecord<'_>> {
        let own = self.payload;
        let sub = self.sub_image;
        let record = self.store.record_mut(slot)?;
        let (payload, sub_image) = split_payload(record.payload, own, sub);
        Some(ModuleRecord {
            particle: record.particle,
            payload,
            sub_image,
        })
    }

    /// Ask the emitter to remove a particle once the update pass ends
    pub fn kill(&mut self, slot: u32) {
        self.store.request_kill(slot);
    }
}

/// Cut the payload region into the module's range and the sub-image range
fn split_payload(
    payload: &mut [u8],
    own: Option<PayloadRange>,
    sub: Option<PayloadRange>,
) -> (&mut [u8], Option<&mut [u8]>) {
    match (own, sub) {
        (Some(own), Some(sub)) if own.end() <= sub.offset => {
            let (head, tail) = payload.split_at_mut(sub.offset);
            (
                head.get_mut(own.as_range()).unwrap_or_default(),
                tail.get_mut(..sub.len),
            )
        }
        (Some(own), Some(sub)) => {
            let (head, tail) = payload.split_at_mut(own.offset);
            (
                tail.get_mut(..own.len).unwrap_or_default(),
                head.get_mut(sub.as_range()),
            )
        }
        (Some(own), None) => (payload.get_mut(own.as_range()).unwrap_or_default(), None),
        (None, Some(sub)) => (Default::default(), payload.get_mut(sub.as_range())),
        (None, None) => (Default::default(), None),
    }
}

/// Everything a module may touch while it runs
pub struct ModuleContext<'a> {
    pub(crate) frame: FrameState,
    pub(crate) required: &'a RequiredModule,
    pub(crate) sampler: Sampler<'a>,
    pub(crate) particles: ParticleAccess<'a>,
    pub(crate) instance: &'a mut [u8],
    pub(crate) siblings: &'a dyn SiblingEmitters,
}

impl<'a> ModuleContext<'a> {
    pub(crate) fn new(
        frame: FrameState,
        required: &'a RequiredModule,
        sampler: Sampler<'a>,
        particles: ParticleAccess<'a>,
        instance: &'a mut [u8],
        siblings: &'a dyn SiblingEmitters,
    ) -> Self {
        Self {
            frame,
            required,
            sampler,
            particles,
            instance,
            siblings,
        }
    }

    pub fn frame(&self) -> &FrameState {
        &self.frame
    }

    pub fn required(&self) -> &RequiredModule {
        self.required
    }

    pub fn sampler(&mut self) -> &mut Sampler<'a> {
        &mut self.sampler
    }

    pub fn particles(&mut self) -> &mut ParticleAccess<'a> {
        &mut self.particles
    }

    /// The module's per-instance scratch block, empty if it requested none
    pub fn instance_block(&mut self) -> &mut [u8] {
        self.instance
    }
}

impl std::fmt::Debug for ModuleContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleContext")
            .field("frame", &self.frame)
            .field("particles", &self.particles)
            .field("instance_bytes", &self.instance.len())
            .finish_non_exhaustive()
    }
}
