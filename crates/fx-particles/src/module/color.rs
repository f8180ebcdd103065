use glam::Vec3;

use crate::distribution::Distribution;
use crate::particle::LinearColor;

use super::{LodBlend, Module, ModuleContext, sample_blended};

fn finish_alpha(alpha: f32, clamp: bool) -> f32 {
    if clamp { alpha.clamp(0.0, 1.0) } else { alpha }
}

/// Sets the starting color of new particles
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorModule {
    pub start_color: Option<Distribution<Vec3>>,
    pub start_alpha: Option<Distribution<f32>>,
    pub clamp_alpha: bool,
}

impl ColorModule {
    pub fn new(rgb: impl Into<Distribution<Vec3>>, alpha: impl Into<Distribution<f32>>) -> Self {
        Self {
            start_color: Some(rgb.into()),
            start_alpha: Some(alpha.into()),
            clamp_alpha: true,
        }
    }
}

impl Module for ColorModule {
    fn spawn(
        &self,
        ctx: &mut ModuleContext<'_>,
        slot: u32,
        _spawn_time: f32,
        lod: Option<LodBlend<'_, Self>>,
    ) {
        let time = ctx.frame.emitter_time;
        let rgb = sample_blended(
            self,
            lod,
            |m| m.start_color.as_ref(),
            time,
            &mut ctx.sampler,
            Vec3::ONE,
        );
        let alpha = sample_blended(
            self,
            lod,
            |m| m.start_alpha.as_ref(),
            time,
            &mut ctx.sampler,
            1.0,
        );
        let color = LinearColor::from_rgb_alpha(rgb, finish_alpha(alpha, self.clamp_alpha));
        if let Some(particle) = ctx.particles.particle_mut(slot) {
            particle.color = color;
            particle.base_color = color;
        }
    }
}

/// Drives color and alpha from each particle's age
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorOverLifeModule {
    pub color_over_life: Option<Distribution<Vec3>>,
    pub alpha_over_life: Option<Distribution<f32>>,
    pub clamp_alpha: bool,
}

impl ColorOverLifeModule {
    pub fn new(rgb: impl Into<Distribution<Vec3>>, alpha: impl Into<Distribution<f32>>) -> Self {
        Self {
            color_over_life: Some(rgb.into()),
            alpha_over_life: Some(alpha.into()),
            clamp_alpha: true,
        }
    }

    fn sample(
        &self,
        ctx: &mut ModuleContext<'_>,
        lod: Option<LodBlend<'_, Self>>,
        time: f32,
    ) -> LinearColor {
        let rgb = sample_blended(
            self,
            lod,
            |m| m.color_over_life.as_ref(),
            time,
            &mut ctx.sampler,
            Vec3::ONE,
        );
        let alpha = sample_blended(
            self,
            lod,
            |m| m.alpha_over_life.as_ref(),
            time,
            &mut ctx.sampler,
            1.0,
        );
        LinearColor::from_rgb_alpha(rgb, finish_alpha(alpha, self.clamp_alpha))
    }
}

impl Module for ColorOverLifeModule {
    fn spawn(
        &self,
        ctx: &mut ModuleContext<'_>,
        slot: u32,
        _spawn_time: f32,
        lod: Option<LodBlend<'_, Self>>,
    ) {
        let time = ctx.frame.emitter_time;
        let color = self.sample(ctx, lod, time);
        if let Some(particle) = ctx.particles.particle_mut(slot) {
            particle.color = color;
            particle.base_color = color;
        }
    }

    fn update(&self, ctx: &mut ModuleContext<'_>, lod: Option<LodBlend<'_, Self>>) {
        for index in 0..ctx.particles.active_count() {
            let Some(slot) = ctx.particles.slot(index) else {
                continue;
            };
            let Some(age) = ctx.particles.particle(slot).map(|p| p.relative_time) else {
                continue;
            };
            let color = self.sample(ctx, lod, age);
            if let Some(particle) = ctx.particles.particle_mut(slot) {
                particle.color = color;
                particle.base_color = color;
            }
        }
    }
}

/// Scales the current color over each particle's age or over emitter time
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorScaleOverLifeModule {
    pub color_scale: Option<Distribution<Vec3>>,
    pub alpha_scale: Option<Distribution<f32>>,
    /// Sample at emitter time instead of particle age
    pub emitter_time: bool,
}

impl ColorScaleOverLifeModule {
    fn scale(color: &mut LinearColor, rgb: Vec3, alpha: f32) {
        color.r *= rgb.x;
        color.g *= rgb.y;
        color.b *= rgb.z;
        color.a *= alpha;
    }

    fn sample(
        &self,
        ctx: &mut ModuleContext<'_>,
        lod: Option<LodBlend<'_, Self>>,
        time: f32,
    ) -> (Vec3, f32) {
        let rgb = sample_blended(
            self,
            lod,
            |m| m.color_scale.as_ref(),
            time,
            &mut ctx.sampler,
            Vec3::ONE,
        );
        let alpha = sample_blended(
            self,
            lod,
            |m| m.alpha_scale.as_ref(),
            time,
            &mut ctx.sampler,
            1.0,
        );
        (rgb, alpha)
    }
}

impl Module for ColorScaleOverLifeModule {
    fn spawn(
        &self,
        ctx: &mut ModuleContext<'_>,
        slot: u32,
        _spawn_time: f32,
        lod: Option<LodBlend<'_, Self>>,
    ) {
        let time = ctx.frame.emitter_time;
        let (rgb, alpha) = self.sample(ctx, lod, time);
        if let Some(particle) = ctx.particles.particle_mut(slot) {
            Self::scale(&mut particle.color, rgb, alpha);
        }
    }

    fn update(&self, ctx: &mut ModuleContext<'_>, lod: Option<LodBlend<'_, Self>>) {
        for index in 0..ctx.particles.active_count() {
            let Some(slot) = ctx.particles.slot(index) else {
                continue;
            };
            let time = if self.emitter_time {
                ctx.frame.emitter_time
            } else {
                match ctx.particles.particle(slot) {
                    Some(particle) => particle.relative_time,
                    None => continue,
                }
            };
            let (rgb, alpha) = self.sample(ctx, lod, time);
            if let Some(particle) = ctx.particles.particle_mut(slot) {
                Self::scale(&mut particle.color, rgb, alpha);
            }
        }
    }
}
