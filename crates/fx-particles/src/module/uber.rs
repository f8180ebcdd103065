//! Fused modules produced by the compactor
//!
//! Each uber module embeds copies of the modules it replaces and runs their
//! spawn hooks in the original order, so a fused emitter simulates exactly
//! like the unfused one.

use crate::emitter::RequiredModule;

use super::{
    ColorOverLifeModule, LifetimeModule, LocationModule, LodBlend, Module, ModuleContext,
    SizeModule, VelocityModule,
};

/// Lifetime, Size, Velocity and ColorOverLife in one module
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UberLtisivclModule {
    pub lifetime: LifetimeModule,
    pub size: SizeModule,
    pub velocity: VelocityModule,
    pub color: ColorOverLifeModule,
}

impl Module for UberLtisivclModule {
    fn required_bytes(&self, required: &RequiredModule) -> usize {
        self.lifetime.required_bytes(required)
            + self.size.required_bytes(required)
            + self.velocity.required_bytes(required)
            + self.color.required_bytes(required)
    }

    fn spawn(
        &self,
        ctx: &mut ModuleContext<'_>,
        slot: u32,
        spawn_time: f32,
        lod: Option<LodBlend<'_, Self>>,
    ) {
        self.lifetime
            .spawn(ctx, slot, spawn_time, lod.map(|l| l.map(|m| &m.lifetime)));
        self.size
            .spawn(ctx, slot, spawn_time, lod.map(|l| l.map(|m| &m.size)));
        self.velocity
            .spawn(ctx, slot, spawn_time, lod.map(|l| l.map(|m| &m.velocity)));
        self.color
            .spawn(ctx, slot, spawn_time, lod.map(|l| l.map(|m| &m.color)));
    }

    fn update(&self, ctx: &mut ModuleContext<'_>, lod: Option<LodBlend<'_, Self>>) {
        self.color.update(ctx, lod.map(|l| l.map(|m| &m.color)));
    }
}

/// Lifetime, Size, Velocity, ColorOverLife and Location in one module
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UberLtisivclilModule {
    pub lifetime: LifetimeModule,
    pub size: SizeModule,
    pub velocity: VelocityModule,
    pub color: ColorOverLifeModule,
    pub location: LocationModule,
}

impl Module for UberLtisivclilModule {
    fn required_bytes(&self, required: &RequiredModule) -> usize {
        self.lifetime.required_bytes(required)
            + self.size.required_bytes(required)
            + self.velocity.required_bytes(required)
            + self.color.required_bytes(required)
            + self.location.required_bytes(required)
    }

    fn spawn(
        &self,
        ctx: &mut ModuleContext<'_>,
        slot: u32,
        spawn_time: f32,
        lod: Option<LodBlend<'_, Self>>,
    ) {
        self.lifetime
            .spawn(ctx, slot, spawn_time, lod.map(|l| l.map(|m| &m.lifetime)));
        self.size
            .spawn(ctx, slot, spawn_time, lod.map(|l| l.map(|m| &m.size)));
        self.velocity
            .spawn(ctx, slot, spawn_time, lod.map(|l| l.map(|m| &m.velocity)));
        self.color
            .spawn(ctx, slot, spawn_time, lod.map(|l| l.map(|m| &m.color)));
        self.location
            .spawn(ctx, slot, spawn_time, lod.map(|l| l.map(|m| &m.location)));
    }

    fn update(&self, ctx: &mut ModuleContext<'_>, lod: Option<LodBlend<'_, Self>>) {
        self.color.update(ctx, lod.map(|l| l.map(|m| &m.color)));
    }
}
