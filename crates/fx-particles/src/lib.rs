//! Module-driven particle emitter simulation
//!
//! An emitter template ([`ParticleEmitter`]) holds one or more LOD levels,
//! each an ordered list of [`ParticleModule`]s plus a [`RequiredModule`]
//! with the settings every level carries. Modules reserve payload bytes in
//! each particle record, initialize particles at spawn and modify them every
//! tick. [`EmitterInstance`] runs a template; [`ParticleSystemInstance`] runs
//! several emitters that can see each other's particles.
//!
//! ```
//! use std::sync::Arc;
//!
//! use fx_particles::glam::Vec3;
//! use fx_particles::{
//!     EmitterInstance, LifetimeModule, LodLevel, ParticleEmitter, RequiredModule,
//!     TickEnvironment, VelocityModule,
//! };
//!
//! let lod = LodLevel::new(RequiredModule::default().with_spawn_rate(20.0))
//!     .with_module(LifetimeModule::new(2.0))
//!     .with_module(VelocityModule::new(Vec3::Z));
//! let emitter = ParticleEmitter::new("fountain", 100).with_lod(lod);
//!
//! let mut instance = EmitterInstance::new(Arc::new(emitter), 42)?;
//! let env = TickEnvironment::isolated();
//! for _ in 0..10 {
//!     instance.tick(0.1, &env);
//! }
//! assert_eq!(instance.active_count(), 20);
//! # Ok::<(), fx_particles::ParticleError>(())
//! ```

pub mod compact;
pub mod distribution;
pub mod emitter;
pub mod error;
pub mod module;
pub mod particle;
pub mod random;

pub use glam;

pub use compact::{UberKind, compact_emitter, convert_to_uber_module, find_compatible};
pub use distribution::{Curve, Distribution, Lerp, ParameterSet, ParameterSource, Sampler};
pub use emitter::{
    Burst, EmitterInstance, LodLevel, LodPreview, ParticleEmitter, ParticleSystem,
    ParticleSystemInstance, RequiredModule, SubImageMethod, TickEnvironment, TickStats,
};
pub use error::{ParticleError, Result};
pub use module::*;
pub use particle::{LinearColor, Particle, ParticleStore, PayloadLayout};
pub use random::EmitterRng;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
