//! Particle records, storage and payload layout
//!
//! Every particle is stored as a fixed [`Particle`] base record followed by a
//! module payload region. The payload region is carved into per-module ranges
//! by [`PayloadLayout`] when an emitter instance is created, and each module
//! only ever sees the bytes of its own range.

mod layout;
mod store;

pub use layout::{
    InstanceLayout, PayloadLayout, PayloadRange, SUB_IMAGE_PAYLOAD_SIZE, align_stride,
};
pub use store::{ParticleRecord, ParticleStore, read_payload, write_payload};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::distribution::Lerp;

/// Size in bytes of the base particle record
pub const BASE_PARTICLE_SIZE: usize = std::mem::size_of::<Particle>();

bitflags::bitflags! {
    /// State bits kept in each particle record
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParticleFlags: u32 {
        /// The slot holds a live particle
        const ALIVE = 0x0000_0001;
        /// A module asked the emitter to remove this particle
        const KILL_PENDING = 0x0000_0002;
    }
}

/// Linear RGBA color
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct LinearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl LinearColor {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build from an RGB vector and an alpha value
    pub fn from_rgb_alpha(rgb: Vec3, alpha: f32) -> Self {
        Self::new(rgb.x, rgb.y, rgb.z, alpha)
    }

    pub fn rgb(&self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }
}

impl Lerp for LinearColor {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        Self {
            r: self.r.interpolate(&other.r, t),
            g: self.g.interpolate(&other.g, t),
            b: self.b.interpolate(&other.b, t),
            a: self.a.interpolate(&other.a, t),
        }
    }
}

/// Emitter-owned sub-image record stored after the module ranges
///
/// Image coordinates are column and row indices into the sub-image grid.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct SubImageRecord {
    /// Blend weight toward the second image
    pub interpolation: f32,
    pub image_h: f32,
    pub image_v: f32,
    pub image2_h: f32,
    pub image2_v: f32,
}

/// Fixed base record shared by every particle
///
/// `relative_time` is the normalized age in [0, 1]. It stays meaningless until
/// a lifetime module sets `one_over_max_lifetime`; a value of zero there means
/// the particle has no lifetime and never ages.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Particle {
    pub location: Vec3,
    pub old_location: Vec3,
    pub velocity: Vec3,
    pub base_velocity: Vec3,
    pub rotation: f32,
    pub rotation_rate: f32,
    pub base_rotation_rate: f32,
    pub size: Vec3,
    pub base_size: Vec3,
    pub color: LinearColor,
    pub base_color: LinearColor,
    pub relative_time: f32,
    pub one_over_max_lifetime: f32,
    /// Spawn serial, unique per emitter instance for the lifetime of a slot
    pub serial: u32,
    flags: u32,
}

impl Particle {
    pub fn flags(&self) -> ParticleFlags {
        ParticleFlags::from_bits_truncate(self.flags)
    }

    pub fn set_flags(&mut self, flags: ParticleFlags) {
        self.flags = flags.bits();
    }

    pub fn is_alive(&self) -> bool {
        self.flags().contains(ParticleFlags::ALIVE)
    }

    pub fn is_kill_pending(&self) -> bool {
        self.flags().contains(ParticleFlags::KILL_PENDING)
    }

    /// Whether a lifetime has been established
    pub fn has_lifetime(&self) -> bool {
        self.one_over_max_lifetime > 0.0
    }

    /// Maximum lifetime in seconds, if established
    pub fn max_lifetime(&self) -> Option<f32> {
        self.has_lifetime().then(|| 1.0 / self.one_over_max_lifetime)
    }

    /// Contribute a maximum lifetime
    ///
    /// The first contribution sets the inverse lifetime directly. Later
    /// contributions compose harmonically on the inverse values, so the
    /// resulting lifetime is the sum of all contributions regardless of order.
    pub fn add_max_lifetime(&mut self, max_lifetime: f32) {
        if self.has_lifetime() {
            let total = max_lifetime + 1.0 / self.one_over_max_lifetime;
            self.one_over_max_lifetime = if total > 0.0 { 1.0 / total } else { 0.0 };
        } else {
            self.one_over_max_lifetime = if max_lifetime > 0.0 {
                1.0 / max_lifetime
            } else {
                0.0
            };
        }
    }

    /// Restore the per-tick fields from their base values
    pub fn reset_to_base(&mut self) {
        self.velocity = self.base_velocity;
        self.size = self.base_size;
        self.rotation_rate = self.base_rotation_rate;
        self.color = self.base_color;
    }
}
