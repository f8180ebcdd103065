//! Particle systems with emitters that read each other's particles

use std::sync::Arc;

use fx_particles::glam::{Mat4, Vec3};
use fx_particles::{
    Distribution, EmitterInstance, LifetimeModule, LocationModule, LodLevel,
    ParticleAttractorModule, ParticleEmitter, ParticleError, ParticleSystem,
    ParticleSystemInstance, RequiredModule, SourceSelection, TickEnvironment,
};
use pretty_assertions::assert_eq;

use crate::common::{SEED, init_logging};

fn attractor_system(source_first: bool) -> ParticleSystem {
    let source = ParticleEmitter::new("core", 8).with_lod(
        LodLevel::new(RequiredModule::default().with_spawn_rate(10.0))
            .with_module(LifetimeModule::new(100.0))
            .with_module(LocationModule::new(Vec3::new(10.0, 0.0, 0.0))),
    );
    let follower = ParticleEmitter::new("dust", 8).with_lod(
        LodLevel::new(RequiredModule::default().with_spawn_rate(10.0))
            .with_module(LifetimeModule::new(100.0))
            .with_module(ParticleAttractorModule {
                selection: SourceSelection::Sequential,
                renew_source: true,
                range: Some(Distribution::Constant(100.0)),
                strength: Some(Distribution::Constant(5.0)),
                ..ParticleAttractorModule::new("core")
            }),
    );
    let system = ParticleSystem::new("vortex");
    if source_first {
        system.with_emitter(source).with_emitter(follower)
    } else {
        system.with_emitter(follower).with_emitter(source)
    }
}

#[test]
fn test_attractor_pulls_toward_sibling() {
    init_logging();
    for source_first in [true, false] {
        let system = attractor_system(source_first);
        let mut instance = ParticleSystemInstance::new(&system, SEED).unwrap();
        for _ in 0..4 {
            instance.tick(0.1);
        }

        // The oldest dust particle has been pulled for several ticks
        let dust = instance.emitter("dust").unwrap();
        let oldest = dust.particle(0).unwrap();
        assert!(oldest.velocity.x > 0.0, "source_first: {source_first}");
        assert!(oldest.location.x > 0.0);
        assert!(oldest.velocity.y.abs() < 1e-5);
    }
}

#[test]
fn test_emitters_are_seeded_independently() {
    let system = attractor_system(true);
    let a = ParticleSystemInstance::new(&system, SEED).unwrap();
    let b = ParticleSystemInstance::new(&system, SEED).unwrap();
    assert_eq!(a.emitters().len(), 2);
    assert_eq!(a.name(), "vortex");
    assert_eq!(b.emitter("core").unwrap().name(), "core");
}

#[test]
fn test_system_transform_moves_spawns() {
    let mut instance = ParticleSystemInstance::new(&attractor_system(true), SEED).unwrap();
    instance.set_transform(Mat4::from_translation(Vec3::new(0.0, 0.0, 50.0)));
    instance.tick(0.1);

    let core = instance.emitter("core").unwrap();
    assert_eq!(core.particle(0).unwrap().location, Vec3::new(10.0, 0.0, 50.0));
}

#[test]
fn test_system_lod_and_lookup_errors() {
    let mut instance = ParticleSystemInstance::new(&attractor_system(true), SEED).unwrap();
    assert_eq!(
        instance.set_lod(1).unwrap_err(),
        ParticleError::InvalidLod { index: 1, count: 1 }
    );
    assert!(instance.emitter_mut("smoke").is_err());

    instance.tick(0.5);
    assert!(instance.active_count() > 0);
    instance.reset();
    assert_eq!(instance.active_count(), 0);
}

#[test]
fn test_instances_share_a_template_across_threads() {
    let system = attractor_system(true);
    let template = Arc::clone(&system.emitters[0]);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let template = Arc::clone(&template);
            std::thread::spawn(move || {
                let mut instance = EmitterInstance::new(template, SEED).unwrap();
                for _ in 0..20 {
                    instance.tick(0.05, &TickEnvironment::isolated());
                }
                instance.particles().map(|p| p.location).collect::<Vec<_>>()
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results[0].len(), 8);
    assert!(results.windows(2).all(|w| w[0] == w[1]));
}
