use glam::Vec3;

use crate::distribution::Distribution;

use super::{LodBlend, Module, ModuleContext, sample_blended};

/// Whether `point` lies inside the box spanned by `min` and `max`
///
/// The boundary counts as inside.
pub fn box_contains(min: Vec3, max: Vec3, point: Vec3) -> bool {
    point.cmpge(min).all() && point.cmple(max).all()
}

/// Kills particles inside, or outside, an axis-aligned box
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KillBoxModule {
    pub lower_left: Option<Distribution<Vec3>>,
    pub upper_right: Option<Distribution<Vec3>>,
    /// Corners are world positions rather than offsets from the emitter
    pub absolute: bool,
    /// Kill particles inside the box instead of outside it
    pub kill_inside: bool,
}

impl KillBoxModule {
    pub fn new(
        lower_left: impl Into<Distribution<Vec3>>,
        upper_right: impl Into<Distribution<Vec3>>,
    ) -> Self {
        Self {
            lower_left: Some(lower_left.into()),
            upper_right: Some(upper_right.into()),
            ..Default::default()
        }
    }
}

impl Module for KillBoxModule {
    fn update(&self, ctx: &mut ModuleContext<'_>, lod: Option<LodBlend<'_, Self>>) {
        let time = ctx.frame.emitter_time;
        let lower = sample_blended(
            self,
            lod,
            |m| m.lower_left.as_ref(),
            time,
            &mut ctx.sampler,
            Vec3::ZERO,
        );
        let upper = sample_blended(
            self,
            lod,
            |m| m.upper_right.as_ref(),
            time,
            &mut ctx.sampler,
            Vec3::ZERO,
        );
        let offset = if self.absolute {
            Vec3::ZERO
        } else {
            ctx.frame.world_origin()
        };
        let min = lower.min(upper) + offset;
        let max = lower.max(upper) + offset;

        for index in 0..ctx.particles.active_count() {
            let Some(slot) = ctx.particles.slot(index) else {
                continue;
            };
            let Some(location) = ctx.particles.particle(slot).map(|p| p.location) else {
                continue;
            };
            let inside = box_contains(min, max, ctx.frame.world_point(location));
            if inside == self.kill_inside {
                ctx.particles.kill(slot);
            }
        }
    }
}

/// Kills particles above, or below, a height on the Z axis
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KillHeightModule {
    pub height: Option<Distribution<f32>>,
    /// Kill below the height instead of above it
    pub floor: bool,
    /// The height is a world Z value rather than an offset from the emitter
    pub absolute: bool,
}

impl KillHeightModule {
    pub fn floor(height: impl Into<Distribution<f32>>) -> Self {
        Self {
            height: Some(height.into()),
            floor: true,
            absolute: false,
        }
    }

    pub fn ceiling(height: impl Into<Distribution<f32>>) -> Self {
        Self {
            height: Some(height.into()),
            floor: false,
            absolute: false,
        }
    }
}

impl Module for KillHeightModule {
    fn update(&self, ctx: &mut ModuleContext<'_>, lod: Option<LodBlend<'_, Self>>) {
        let mut height = sample_blended(
            self,
            lod,
            |m| m.height.as_ref(),
            ctx.frame.emitter_time,
            &mut ctx.sampler,
            0.0,
        );
        if !self.absolute {
            height += ctx.frame.world_origin().z;
        }

        for index in 0..ctx.particles.active_count() {
            let Some(slot) = ctx.particles.slot(index) else {
                continue;
            };
            let Some(location) = ctx.particles.particle(slot).map(|p| p.location) else {
                continue;
            };
            let z = ctx.frame.world_point(location).z;
            let beyond = if self.floor { z < height } else { z > height };
            if beyond {
                ctx.particles.kill(slot);
            }
        }
    }
}
