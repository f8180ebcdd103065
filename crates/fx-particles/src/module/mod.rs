//! Particle behavior modules
//!
//! A LOD level is an ordered list of [`ParticleModule`]s. Each module may
//! reserve payload bytes in every particle record and a scratch block per
//! emitter instance, initialize particles when they spawn, and modify every
//! live particle once per tick.
//!
//! The set of modules is closed: [`ParticleModule`] is an enum with one
//! variant per module type, and [`ModuleKind`] is its flat tag. Each variant
//! wraps a plain struct implementing [`Module`].
//!
//! While a LOD preview is active the emitter hands each module the module at
//! the same index of the lower LOD together with a blend weight. Modules
//! sample both and interpolate, so a transition can be previewed before it is
//! committed.

mod acceleration;
mod attractor;
mod color;
mod context;
mod kill;
mod lifetime;
mod location;
mod primitive;
mod rotation;
mod size;
mod sub_uv;
mod uber;
mod velocity;

pub use acceleration::{AccelerationModule, AccelerationOverLifetimeModule};
pub use attractor::{
    AttractorSource, LineAttractorModule, ParticleAttractorModule, PointAttractorModule,
    SourceSelection,
};
pub use color::{ColorModule, ColorOverLifeModule, ColorScaleOverLifeModule};
pub use context::{
    FrameState, ModuleContext, ModuleRecord, NoSiblings, ParticleAccess, SiblingEmitters,
};
pub use kill::{KillBoxModule, KillHeightModule, box_contains};
pub use lifetime::LifetimeModule;
pub use location::{DirectLocationModule, DirectLocationPayload, LocationModule};
pub use primitive::{
    AxisSigns, CylinderLocationModule, HeightAxis, PrimitiveOptions, SphereLocationModule,
};
pub use rotation::{RotationModule, RotationRateModule, RotationRateMultiplyLifeModule};
pub use size::{
    Axes, SizeModule, SizeMultiplyLifeModule, SizeMultiplyVelocityModule, SizeScaleModule,
};
pub use sub_uv::{SubUvModule, linear_sub_image};
pub use uber::{UberLtisivclModule, UberLtisivclilModule};
pub use velocity::{VelocityModule, VelocityOverLifetimeModule};

use std::fmt;

use crate::distribution::{Distribution, DistributionValue, Lerp, Sampler, sample_or};
use crate::emitter::RequiredModule;

/// Behavior shared by every module type
///
/// All hooks default to doing nothing, so a module only implements the ones
/// it uses.
pub trait Module: Clone + fmt::Debug + Send + Sync {
    /// Per-particle payload bytes this module needs under `required`
    fn required_bytes(&self, _required: &RequiredModule) -> usize {
        0
    }

    /// Per-instance scratch bytes this module needs
    fn required_instance_bytes(&self) -> usize {
        0
    }

    /// Initialize the particle in `slot`, spawned `spawn_time` seconds ago
    fn spawn(
        &self,
        _ctx: &mut ModuleContext<'_>,
        _slot: u32,
        _spawn_time: f32,
        _lod: Option<LodBlend<'_, Self>>,
    ) {
    }

    /// Modify every live particle for this tick
    fn update(&self, _ctx: &mut ModuleContext<'_>, _lod: Option<LodBlend<'_, Self>>) {}
}

/// Lower-LOD counterpart of a module and the weight of the primary
#[derive(Debug)]
pub struct LodBlend<'a, M> {
    pub lower: &'a M,
    /// 1.0 samples only the primary, 0.0 only the lower module
    pub alpha: f32,
}

impl<M> Clone for LodBlend<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for LodBlend<'_, M> {}

impl<'a, M> LodBlend<'a, M> {
    pub fn new(lower: &'a M, alpha: f32) -> Self {
        Self {
            lower,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    /// Narrow the blend to a component of the lower module
    pub fn map<N>(self, component: impl FnOnce(&'a M) -> &'a N) -> LodBlend<'a, N> {
        LodBlend {
            lower: component(self.lower),
            alpha: self.alpha,
        }
    }

    /// Blend a value computed from the primary with the same value from the lower module
    pub fn blend<T: Lerp>(&self, primary: T, lower: T) -> T {
        lower.interpolate(&primary, self.alpha)
    }
}

/// Sample a module's distribution, blended with its lower-LOD counterpart
pub(crate) fn sample_blended<M, T: DistributionValue>(
    module: &M,
    lod: Option<LodBlend<'_, M>>,
    field: impl Fn(&M) -> Option<&Distribution<T>>,
    time: f32,
    sampler: &mut Sampler<'_>,
    fallback: T,
) -> T {
    let value = sample_or(field(module), time, sampler, fallback);
    match lod {
        Some(blend) => {
            let lower = sample_or(field(blend.lower), time, sampler, fallback);
            blend.blend(value, lower)
        }
        None => value,
    }
}

/// Coarse grouping of module types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleGroup {
    Lifetime,
    Location,
    Velocity,
    Color,
    Size,
    Rotation,
    SubUv,
    Attractor,
    Acceleration,
    Kill,
    Uber,
}

macro_rules! particle_modules {
    ($($(#[$meta:meta])* $variant:ident($module:ident) => $group:ident),* $(,)?) => {
        /// Flat tag identifying a module type
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ModuleKind {
            $($(#[$meta])* $variant,)*
        }

        impl ModuleKind {
            /// Every module type, in declaration order
            pub const ALL: &'static [ModuleKind] = &[$(ModuleKind::$variant,)*];

            pub fn group(self) -> ModuleGroup {
                match self {
                    $(Self::$variant => ModuleGroup::$group,)*
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)*
                }
            }
        }

        /// One configured module of a LOD level
        #[derive(Debug, Clone, PartialEq)]
        pub enum ParticleModule {
            $($(#[$meta])* $variant($module),)*
        }

        impl ParticleModule {
            pub fn kind(&self) -> ModuleKind {
                match self {
                    $(Self::$variant(_) => ModuleKind::$variant,)*
                }
            }

            pub fn group(&self) -> ModuleGroup {
                self.kind().group()
            }

            pub fn required_bytes(&self, required: &RequiredModule) -> usize {
                match self {
                    $(Self::$variant(module) => module.required_bytes(required),)*
                }
            }

            pub fn required_instance_bytes(&self) -> usize {
                match self {
                    $(Self::$variant(module) => module.required_instance_bytes(),)*
                }
            }

            /// Run the spawn hook, blending with `lower` when it is the same type
            pub fn spawn(
                &self,
                ctx: &mut ModuleContext<'_>,
                slot: u32,
                spawn_time: f32,
                lower: Option<(&Self, f32)>,
            ) {
                match self {
                    $(Self::$variant(module) => {
                        let lod = lower.and_then(|(other, alpha)| match other {
                            Self::$variant(other) => Some(LodBlend::new(other, alpha)),
                            _ => None,
                        });
                        module.spawn(ctx, slot, spawn_time, lod);
                    })*
                }
            }

            /// Run the update hook, blending with `lower` when it is the same type
            pub fn update(&self, ctx: &mut ModuleContext<'_>, lower: Option<(&Self, f32)>) {
                match self {
                    $(Self::$variant(module) => {
                        let lod = lower.and_then(|(other, alpha)| match other {
                            Self::$variant(other) => Some(LodBlend::new(other, alpha)),
                            _ => None,
                        });
                        module.update(ctx, lod);
                    })*
                }
            }
        }

        $(
            impl From<$module> for ParticleModule {
                fn from(module: $module) -> Self {
                    Self::$variant(module)
                }
            }
        )*
    };
}

particle_modules! {
    Lifetime(LifetimeModule) => Lifetime,
    Location(LocationModule) => Location,
    DirectLocation(DirectLocationModule) => Location,
    CylinderLocation(CylinderLocationModule) => Location,
    SphereLocation(SphereLocationModule) => Location,
    Velocity(VelocityModule) => Velocity,
    VelocityOverLifetime(VelocityOverLifetimeModule) => Velocity,
    Color(ColorModule) => Color,
    ColorOverLife(ColorOverLifeModule) => Color,
    ColorScaleOverLife(ColorScaleOverLifeModule) => Color,
    Size(SizeModule) => Size,
    SizeMultiplyLife(SizeMultiplyLifeModule) => Size,
    SizeMultiplyVelocity(SizeMultiplyVelocityModule) => Size,
    SizeScale(SizeScaleModule) => Size,
    Rotation(RotationModule) => Rotation,
    RotationRate(RotationRateModule) => Rotation,
    RotationRateMultiplyLife(RotationRateMultiplyLifeModule) => Rotation,
    SubUv(SubUvModule) => SubUv,
    LineAttractor(LineAttractorModule) => Attractor,
    PointAttractor(PointAttractorModule) => Attractor,
    ParticleAttractor(ParticleAttractorModule) => Attractor,
    Acceleration(AccelerationModule) => Acceleration,
    AccelerationOverLifetime(AccelerationOverLifetimeModule) => Acceleration,
    KillBox(KillBoxModule) => Kill,
    KillHeight(KillHeightModule) => Kill,
    /// Fused Lifetime, Size, Velocity, ColorOverLife
    UberLtisivcl(UberLtisivclModule) => Uber,
    /// Fused Lifetime, Size, Velocity, ColorOverLife, Location
    UberLtisivclil(UberLtisivclilModule) => Uber,
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared fixtures for module unit tests
#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use crate::emitter::{
        EmitterInstance, LodLevel, ParticleEmitter, RequiredModule, TickEnvironment,
    };

    use super::ParticleModule;

    pub fn emitter(required: RequiredModule, modules: Vec<ParticleModule>) -> EmitterInstance {
        let lod = LodLevel {
            required,
            modules,
        };
        let template = ParticleEmitter::new("test", 64).with_lod(lod);
        EmitterInstance::new(Arc::new(template), 7).unwrap()
    }

    /// Emitter with default requirements and a single spawned particle
    pub fn spawn_one(modules: Vec<ParticleModule>) -> EmitterInstance {
        let mut instance = emitter(RequiredModule::default(), modules);
        instance.spawn_particles(1, 0.0, 0.0, &TickEnvironment::isolated());
        instance
    }
}
