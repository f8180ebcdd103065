//! Uber-module compaction keeps simulation results unchanged

use std::sync::Arc;

use fx_particles::distribution::Curve;
use fx_particles::glam::Vec3;
use fx_particles::{
    ColorOverLifeModule, Distribution, EmitterInstance, LifetimeModule, LocationModule,
    LodLevel, Particle, ParticleEmitter, ParticleError, RequiredModule, SizeModule,
    SizeScaleModule, TickEnvironment, UberKind, VelocityModule, compact_emitter,
    convert_to_uber_module,
};
use pretty_assertions::assert_eq;

use crate::common::SEED;

fn random_lod(with_location: bool) -> LodLevel {
    let lod = LodLevel::new(RequiredModule::default().with_spawn_rate(30.0))
        .with_module(LifetimeModule::new(Distribution::Uniform { min: 0.5, max: 1.5 }))
        .with_module(SizeModule::new(Distribution::Uniform {
            min: Vec3::splat(0.5),
            max: Vec3::splat(2.0),
        }))
        .with_module(VelocityModule::new(Distribution::Uniform {
            min: Vec3::new(-1.0, -1.0, 2.0),
            max: Vec3::new(1.0, 1.0, 5.0),
        }))
        .with_module(ColorOverLifeModule::new(
            Distribution::Curve(Curve::linear([(0.0, Vec3::ONE), (1.0, Vec3::ZERO)])),
            Distribution::Curve(Curve::linear([(0.0, 1.0_f32), (1.0, 0.0)])),
        ));
    if with_location {
        lod.with_module(LocationModule::new(Distribution::Uniform {
            min: Vec3::splat(-3.0),
            max: Vec3::splat(3.0),
        }))
    } else {
        lod
    }
}

fn run(emitter: ParticleEmitter, ticks: usize) -> Vec<Particle> {
    let mut instance = EmitterInstance::new(Arc::new(emitter), SEED).unwrap();
    let env = TickEnvironment::isolated();
    for _ in 0..ticks {
        instance.tick(1.0 / 30.0, &env);
    }
    instance.particles().copied().collect()
}

#[test]
fn test_fused_emitter_matches_unfused() {
    for (kind, with_location) in [(UberKind::Ltisivcl, false), (UberKind::Ltisivclil, true)] {
        let unfused = ParticleEmitter::new("sparks", 128).with_lod(random_lod(with_location));
        let mut fused = unfused.clone();
        convert_to_uber_module(&mut fused, kind).unwrap();
        assert_eq!(fused.lods[0].module_kinds(), vec![kind.module_kind()]);

        let expected = run(unfused, 45);
        assert!(!expected.is_empty());
        assert_eq!(run(fused, 45), expected, "{kind}");
    }
}

#[test]
fn test_compact_every_lod_or_none() {
    let mut emitter = ParticleEmitter::new("sparks", 128)
        .with_lod(random_lod(false))
        .with_lod(random_lod(false));
    assert_eq!(compact_emitter(&mut emitter).unwrap(), UberKind::Ltisivcl);
    assert_eq!(emitter.lods[1].modules.len(), 1);

    let mut mixed = ParticleEmitter::new("mixed", 128)
        .with_lod(random_lod(false))
        .with_lod(random_lod(true));
    let before = mixed.clone();
    assert!(matches!(
        compact_emitter(&mut mixed),
        Err(ParticleError::UberIncompatible { uber: None, .. })
    ));
    assert_eq!(mixed, before);
}

#[test]
fn test_extra_module_blocks_compaction() {
    let lod = random_lod(false).with_module(SizeScaleModule::new(Vec3::ONE));
    let mut emitter = ParticleEmitter::new("scaled", 16).with_lod(lod);
    let err = convert_to_uber_module(&mut emitter, UberKind::Ltisivcl).unwrap_err();
    assert!(err.to_string().contains("scaled"));
    assert_eq!(emitter.lods[0].modules.len(), 5);
}
