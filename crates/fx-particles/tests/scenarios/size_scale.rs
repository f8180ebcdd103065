//! Size shrinking to nothing over a particle's life

use fx_particles::distribution::Curve;
use fx_particles::glam::Vec3;
use fx_particles::{Distribution, LifetimeModule, SizeModule, SizeScaleModule, TickEnvironment};
use pretty_assertions::assert_eq;

use crate::common::instance;

#[test]
fn test_size_halves_at_half_life() {
    let shrink = Distribution::Curve(Curve::linear([(0.0, Vec3::ONE), (1.0, Vec3::ZERO)]));
    let mut instance = instance(vec![
        LifetimeModule::new(2.0).into(),
        SizeModule::new(Vec3::ONE).into(),
        SizeScaleModule::new(shrink).into(),
    ]);
    let env = TickEnvironment::isolated();
    instance.spawn_particles(1, 0.0, 0.0, &env);
    assert_eq!(instance.particle(0).unwrap().size, Vec3::ONE);

    instance.tick(1.0, &env);
    let particle = instance.particle(0).unwrap();
    assert_eq!(particle.relative_time, 0.5);
    assert_eq!(particle.size, Vec3::splat(0.5));
    // The base size is left alone
    assert_eq!(particle.base_size, Vec3::ONE);
}

#[test]
fn test_particle_dies_at_end_of_life() {
    let mut instance = instance(vec![
        LifetimeModule::new(2.0).into(),
        SizeModule::new(Vec3::ONE).into(),
    ]);
    let env = TickEnvironment::isolated();
    instance.spawn_particles(1, 0.0, 0.0, &env);

    instance.tick(1.0, &env);
    instance.tick(1.0, &env);
    assert_eq!(instance.active_count(), 1);
    let stats = instance.tick(0.5, &env);
    assert_eq!(stats.killed, 1);
    assert_eq!(instance.active_count(), 0);
}
