//! Common test utilities and fixtures

#![allow(dead_code)]

use std::sync::Arc;

use fx_particles::{EmitterInstance, LodLevel, ParticleEmitter, ParticleModule, RequiredModule};

/// Seed shared by tests that compare two instances
pub const SEED: u64 = 0x5EED;

/// Single-LOD emitter template
pub fn template(
    name: &str,
    required: RequiredModule,
    modules: Vec<ParticleModule>,
) -> ParticleEmitter {
    ParticleEmitter::new(name, 256).with_lod(LodLevel { required, modules })
}

/// Instance of a single-LOD emitter with default requirements
pub fn instance(modules: Vec<ParticleModule>) -> EmitterInstance {
    let emitter = template("test", RequiredModule::default(), modules);
    EmitterInstance::new(Arc::new(emitter), SEED).expect("valid template")
}

/// Route library logs to the test output when RUST_LOG is set
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
