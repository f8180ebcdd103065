//! LOD switching and preview blending

use std::sync::Arc;

use fx_particles::glam::Vec3;
use fx_particles::{
    EmitterInstance, KillBoxModule, LifetimeModule, LocationModule, LodLevel, ModuleKind,
    ParticleEmitter, ParticleError, RequiredModule, SizeModule, TickEnvironment,
};
use pretty_assertions::assert_eq;

use crate::common::SEED;

fn sized_lod(size: f32) -> LodLevel {
    LodLevel::new(RequiredModule::default())
        .with_module(LifetimeModule::new(2.0))
        .with_module(SizeModule::new(Vec3::splat(size)))
}

fn two_level(high: LodLevel, low: LodLevel) -> EmitterInstance {
    let emitter = ParticleEmitter::new("blend", 16).with_lod(high).with_lod(low);
    EmitterInstance::new(Arc::new(emitter), SEED).unwrap()
}

fn spawned_size(alpha: Option<f32>) -> Vec3 {
    let mut instance = two_level(sized_lod(1.0), sized_lod(3.0));
    if let Some(alpha) = alpha {
        instance.set_lod_preview(1, alpha).unwrap();
    }
    instance.spawn_particles(1, 0.0, 0.0, &TickEnvironment::isolated());
    instance.particle(0).unwrap().size
}

#[test]
fn test_preview_interpolates_toward_active_level() {
    assert_eq!(spawned_size(None), Vec3::ONE);
    assert_eq!(spawned_size(Some(1.0)), Vec3::ONE);
    assert_eq!(spawned_size(Some(0.0)), Vec3::splat(3.0));
    assert_eq!(spawned_size(Some(0.25)), Vec3::splat(2.5));
}

#[test]
fn test_preview_alpha_is_clamped() {
    let mut instance = two_level(sized_lod(1.0), sized_lod(3.0));
    instance.set_lod_preview(1, 4.0).unwrap();
    assert_eq!(instance.lod_preview().unwrap().alpha, 1.0);
}

#[test]
fn test_preview_rejects_different_module_counts() {
    let low = sized_lod(3.0).with_module(LocationModule::new(Vec3::X));
    let mut instance = two_level(sized_lod(1.0), low);
    assert_eq!(
        instance.set_lod_preview(1, 0.5).unwrap_err(),
        ParticleError::LodMismatch {
            module_index: 2,
            primary: None,
            lower: Some(ModuleKind::Location),
        }
    );
}

#[test]
fn test_preview_rejects_unknown_level() {
    let mut instance = two_level(sized_lod(1.0), sized_lod(3.0));
    assert_eq!(
        instance.set_lod_preview(2, 0.5).unwrap_err(),
        ParticleError::InvalidLod { index: 2, count: 2 }
    );
}

#[test]
fn test_set_lod_clears_preview() {
    let mut instance = two_level(sized_lod(1.0), sized_lod(3.0));
    instance.set_lod_preview(1, 0.5).unwrap();
    instance.set_lod(1).unwrap();
    assert!(instance.lod_preview().is_none());

    instance.spawn_particles(1, 0.0, 0.0, &TickEnvironment::isolated());
    assert_eq!(instance.particle(0).unwrap().size, Vec3::splat(3.0));
}

fn kill_box_lod(at: Vec3) -> LodLevel {
    LodLevel::new(RequiredModule::default())
        .with_module(LocationModule::new(at))
        .with_module(KillBoxModule::new(Vec3::splat(-1.0), Vec3::splat(1.0)))
}

#[test]
fn test_kill_box_boundary_same_on_blended_path() {
    let env = TickEnvironment::isolated();
    for blended in [false, true] {
        let mut instance = two_level(
            kill_box_lod(Vec3::new(1.0, 0.0, 0.0)),
            kill_box_lod(Vec3::new(1.0, 0.0, 0.0)),
        );
        if blended {
            instance.set_lod_preview(1, 0.5).unwrap();
        }
        instance.spawn_particles(1, 0.0, 0.0, &env);
        instance.tick(0.0, &env);
        assert_eq!(instance.active_count(), 1, "blended: {blended}");
    }
}
