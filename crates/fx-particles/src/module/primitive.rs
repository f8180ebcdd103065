//! Shape-based spawn locations

use glam::Vec3;

use crate::distribution::Distribution;
use crate::random::EmitterRng;

use super::{LodBlend, Module, ModuleContext, sample_blended};

/// Rejection draws before a direction is taken from the cube as is
const MAX_DIRECTION_ATTEMPTS: usize = 16;

bitflags::bitflags! {
    /// Half-spaces a primitive may spawn into, per axis
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AxisSigns: u8 {
        const POSITIVE_X = 0x01;
        const NEGATIVE_X = 0x02;
        const POSITIVE_Y = 0x04;
        const NEGATIVE_Y = 0x08;
        const POSITIVE_Z = 0x10;
        const NEGATIVE_Z = 0x20;
    }
}

impl AxisSigns {
    fn allows(self, axis: usize) -> (bool, bool) {
        let (positive, negative) = match axis {
            0 => (Self::POSITIVE_X, Self::NEGATIVE_X),
            1 => (Self::POSITIVE_Y, Self::NEGATIVE_Y),
            _ => (Self::POSITIVE_Z, Self::NEGATIVE_Z),
        };
        (self.contains(positive), self.contains(negative))
    }

    /// Fold a signed component into the half-spaces allowed on `axis`
    fn clamp_component(self, axis: usize, value: f32) -> f32 {
        match self.allows(axis) {
            (true, true) => value,
            (true, false) => value.abs(),
            (false, true) => -value.abs(),
            (false, false) => 0.0,
        }
    }
}

impl Default for AxisSigns {
    fn default() -> Self {
        Self::all()
    }
}

/// Options shared by the primitive location modules
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveOptions {
    pub signs: AxisSigns,
    /// Spawn on the boundary of the shape instead of inside it
    pub surface_only: bool,
    /// Give particles an outward velocity along their spawn offset
    pub velocity: bool,
    /// Scale applied to that outward velocity
    pub velocity_scale: Option<Distribution<f32>>,
    /// Center of the shape in emitter space
    pub start_location: Option<Distribution<Vec3>>,
}

impl Default for PrimitiveOptions {
    fn default() -> Self {
        Self {
            signs: AxisSigns::all(),
            surface_only: false,
            velocity: false,
            velocity_scale: None,
            start_location: None,
        }
    }
}

/// Sample the shared options and apply the final offset to the particle
fn place<M>(
    ctx: &mut ModuleContext<'_>,
    slot: u32,
    module: &M,
    lod: Option<LodBlend<'_, M>>,
    options: impl Fn(&M) -> &PrimitiveOptions,
    offset: Vec3,
    velocity_direction: Vec3,
) {
    let time = ctx.frame.emitter_time;
    let center = sample_blended(
        module,
        lod,
        |m| options(m).start_location.as_ref(),
        time,
        &mut ctx.sampler,
        Vec3::ZERO,
    );
    let velocity = if options(module).velocity {
        let scale = sample_blended(
            module,
            lod,
            |m| options(m).velocity_scale.as_ref(),
            time,
            &mut ctx.sampler,
            1.0,
        );
        ctx.frame.sim_vector(velocity_direction * scale)
    } else {
        Vec3::ZERO
    };
    let offset = ctx.frame.sim_vector(center + offset);

    if let Some(particle) = ctx.particles.particle_mut(slot) {
        particle.location += offset;
        particle.velocity += velocity;
        particle.base_velocity += velocity;
    }
}

/// Random unit direction restricted to the allowed half-spaces
///
/// Only the axes listed in `axes` are drawn; the others stay zero. Draws are
/// rejected outside the unit ball for an even spread; once the attempts run
/// out the last draw is normalized as is, and a draw that folds to zero falls
/// back to the first allowed axis. Returns None only when no listed axis is
/// allowed.
fn random_direction(rng: &mut EmitterRng, signs: AxisSigns, axes: &[usize]) -> Option<Vec3> {
    let fallback = axes.iter().find_map(|&axis| match signs.allows(axis) {
        (true, _) => Some(Vec3::AXES[axis]),
        (false, true) => Some(-Vec3::AXES[axis]),
        (false, false) => None,
    })?;

    let mut last = Vec3::ZERO;
    for _ in 0..MAX_DIRECTION_ATTEMPTS {
        let mut candidate = Vec3::ZERO;
        for &axis in axes {
            candidate[axis] = rng.next_signed();
        }
        let inside_ball = candidate.length_squared() <= 1.0;
        for &axis in axes {
            candidate[axis] = signs.clamp_component(axis, candidate[axis]);
        }
        if inside_ball && candidate.length_squared() > f32::EPSILON {
            if let Some(direction) = candidate.try_normalize() {
                return Some(direction);
            }
        }
        last = candidate;
    }
    Some(last.try_normalize().unwrap_or(fallback))
}

/// Spawns particles in or on a sphere
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SphereLocationModule {
    pub start_radius: Option<Distribution<f32>>,
    pub options: PrimitiveOptions,
}

impl SphereLocationModule {
    pub fn new(radius: impl Into<Distribution<f32>>) -> Self {
        Self {
            start_radius: Some(radius.into()),
            options: PrimitiveOptions::default(),
        }
    }

    pub fn surface_only(mut self) -> Self {
        self.options.surface_only = true;
        self
    }

    pub fn with_signs(mut self, signs: AxisSigns) -> Self {
        self.options.signs = signs;
        self
    }
}

impl Module for SphereLocationModule {
    fn spawn(
        &self,
        ctx: &mut ModuleContext<'_>,
        slot: u32,
        _spawn_time: f32,
        lod: Option<LodBlend<'_, Self>>,
    ) {
        let radius = sample_blended(
            self,
            lod,
            |m| m.start_radius.as_ref(),
            ctx.frame.emitter_time,
            &mut ctx.sampler,
            0.0,
        );
        let rng = ctx.sampler.rng();
        let Some(direction) = random_direction(rng, self.options.signs, &[0, 1, 2]) else {
            log::trace!("Sphere location has no allowed direction, spawning at the center");
            place(ctx, slot, self, lod, |m| &m.options, Vec3::ZERO, Vec3::ZERO);
            return;
        };
        let distance = if self.options.surface_only {
            radius
        } else {
            radius * rng.next_f32().cbrt()
        };
        let offset = direction * distance;
        place(ctx, slot, self, lod, |m| &m.options, offset, offset);
    }
}

/// Axis a cylinder's height runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HeightAxis {
    X,
    Y,
    #[default]
    Z,
}

impl HeightAxis {
    /// Radial axes and the height axis, as component indices
    fn axes(self) -> ([usize; 2], usize) {
        match self {
            Self::X => ([1, 2], 0),
            Self::Y => ([0, 2], 1),
            Self::Z => ([0, 1], 2),
        }
    }
}

/// Spawns particles in or on a cylinder
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CylinderLocationModule {
    pub start_radius: Option<Distribution<f32>>,
    /// Full height, centered on the start location
    pub start_height: Option<Distribution<f32>>,
    pub height_axis: HeightAxis,
    /// Outward velocity ignores the height component
    pub radial_velocity: bool,
    pub options: PrimitiveOptions,
}

impl CylinderLocationModule {
    pub fn new(radius: impl Into<Distribution<f32>>, height: impl Into<Distribution<f32>>) -> Self {
        Self {
            start_radius: Some(radius.into()),
            start_height: Some(height.into()),
            ..Default::default()
        }
    }
}

impl Module for CylinderLocationModule {
    fn spawn(
        &self,
        ctx: &mut ModuleContext<'_>,
        slot: u32,
        _spawn_time: f32,
        lod: Option<LodBlend<'_, Self>>,
    ) {
        let time = ctx.frame.emitter_time;
        let radius = sample_blended(
            self,
            lod,
            |m| m.start_radius.as_ref(),
            time,
            &mut ctx.sampler,
            0.0,
        );
        let height = sample_blended(
            self,
            lod,
            |m| m.start_height.as_ref(),
            time,
            &mut ctx.sampler,
            0.0,
        );
        let (radial_axes, height_axis) = self.height_axis.axes();
        let signs = self.options.signs;
        let rng = ctx.sampler.rng();

        let mut offset = match random_direction(rng, signs, &radial_axes) {
            Some(direction) if self.options.surface_only => direction * radius,
            Some(direction) => direction * radius * rng.next_f32().sqrt(),
            None => Vec3::ZERO,
        };
        let half_height = height * 0.5;
        offset[height_axis] =
            (signs.clamp_component(height_axis, rng.next_signed()) * half_height)
                .clamp(-half_height.abs(), half_height.abs());

        let mut velocity_direction = offset;
        if self.radial_velocity {
            velocity_direction[height_axis] = 0.0;
        }
        place(ctx, slot, self, lod, |m| &m.options, offset, velocity_direction);
    }
}
