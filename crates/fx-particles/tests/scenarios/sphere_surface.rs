//! Spawning on the surface of a sphere

use std::sync::Arc;

use fx_particles::{
    AxisSigns, EmitterInstance, LodLevel, ParticleEmitter, RequiredModule, SphereLocationModule,
    TickEnvironment,
};

use crate::common::{SEED, instance};

fn octant(location: fx_particles::glam::Vec3) -> usize {
    usize::from(location.x > 0.0)
        | usize::from(location.y > 0.0) << 1
        | usize::from(location.z > 0.0) << 2
}

#[test]
fn test_surface_spawns_stay_on_radius() {
    let sphere = SphereLocationModule::new(100.0)
        .surface_only()
        .with_signs(AxisSigns::all());
    let lod = LodLevel::new(RequiredModule::default()).with_module(sphere);
    let emitter = ParticleEmitter::new("shell", 1000).with_lod(lod);
    let mut instance = EmitterInstance::new(Arc::new(emitter), SEED).unwrap();

    let spawned = instance.spawn_particles(1000, 0.0, 0.0, &TickEnvironment::isolated());
    assert_eq!(spawned, 1000);

    let mut octants = [false; 8];
    for particle in instance.particles() {
        let distance = particle.location.length();
        assert!(
            (99.999..=100.001).contains(&distance),
            "distance {distance} off the surface"
        );
        octants[octant(particle.location)] = true;
    }
    assert!(octants.iter().all(|&hit| hit));
}

#[test]
fn test_surface_spawns_stay_on_radius_for_every_seed() {
    let sphere = SphereLocationModule::new(100.0).surface_only();
    let lod = LodLevel::new(RequiredModule::default()).with_module(sphere);
    let emitter = Arc::new(ParticleEmitter::new("shell", 1000).with_lod(lod));

    for seed in 0..100 {
        let mut instance = EmitterInstance::new(Arc::clone(&emitter), seed).unwrap();
        instance.spawn_particles(1000, 0.0, 0.0, &TickEnvironment::isolated());
        for particle in instance.particles() {
            let distance = particle.location.length();
            assert!(
                (99.999..=100.001).contains(&distance),
                "seed {seed}: distance {distance} off the surface"
            );
        }
    }
}

#[test]
fn test_sign_flags_restrict_hemisphere() {
    let sphere = SphereLocationModule::new(10.0)
        .surface_only()
        .with_signs(AxisSigns::all() - AxisSigns::NEGATIVE_Z);
    let mut instance = instance(vec![sphere.into()]);
    instance.spawn_particles(200, 0.0, 0.0, &TickEnvironment::isolated());

    assert!(instance.particles().all(|p| p.location.z >= 0.0));
    assert!(instance.particles().any(|p| p.location.z > 1.0));
    assert!(
        instance
            .particles()
            .all(|p| (p.location.length() - 10.0).abs() < 1e-3)
    );
}
