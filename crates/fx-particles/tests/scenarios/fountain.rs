//! A fountain with gravity, a floor, fading color and a flipbook

use std::sync::Arc;

use fx_particles::distribution::Curve;
use fx_particles::glam::Vec3;
use fx_particles::particle::{SubImageRecord, read_payload};
use fx_particles::{
    AccelerationModule, ColorOverLifeModule, Distribution, EmitterInstance, KillHeightModule,
    LifetimeModule, LodLevel, ParticleEmitter, RequiredModule, RotationRateModule,
    SubImageMethod, SubUvModule, TickEnvironment, VelocityModule,
};

use crate::common::{SEED, init_logging};

const MAX_PARTICLES: usize = 64;

fn fountain() -> EmitterInstance {
    let required = RequiredModule::default()
        .with_spawn_rate(40.0)
        .with_sub_images(2, 2, SubImageMethod::LinearBlend);
    let lod = LodLevel::new(required)
        .with_module(LifetimeModule::new(Distribution::Uniform { min: 1.0, max: 2.0 }))
        .with_module(VelocityModule::new(Distribution::Uniform {
            min: Vec3::new(-1.0, -1.0, 4.0),
            max: Vec3::new(1.0, 1.0, 6.0),
        }))
        .with_module(AccelerationModule::new(Vec3::new(0.0, 0.0, -9.8)))
        .with_module(RotationRateModule::new(Distribution::Uniform { min: -3.0, max: 3.0 }))
        .with_module(ColorOverLifeModule::new(
            Vec3::ONE,
            Distribution::Curve(Curve::linear([(0.0, 1.0_f32), (1.0, 0.0)])),
        ))
        .with_module(SubUvModule::default())
        .with_module(KillHeightModule::floor(-0.5));
    let emitter = ParticleEmitter::new("fountain", MAX_PARTICLES).with_lod(lod);
    EmitterInstance::new(Arc::new(emitter), SEED).unwrap()
}

#[test]
fn test_fountain_reaches_steady_state() {
    init_logging();
    let mut instance = fountain();
    let env = TickEnvironment::isolated();

    let mut spawned = 0;
    let mut killed = 0;
    for _ in 0..240 {
        let stats = instance.tick(1.0 / 60.0, &env);
        spawned += stats.spawned;
        killed += stats.killed;
        assert!(instance.active_count() <= MAX_PARTICLES);
        assert_eq!(stats.active, instance.active_count());
    }

    assert!(spawned > 100);
    assert!(killed > 0);
    assert_eq!(spawned - killed, instance.active_count());

    for (index, particle) in instance.particles().enumerate() {
        assert!((0.0..=1.0).contains(&particle.relative_time));
        assert!(particle.color.a <= 1.0);

        let record: SubImageRecord =
            read_payload(instance.sub_image_payload(index).unwrap()).unwrap();
        assert!((0.0..=1.0).contains(&record.interpolation));
        for image in [record.image_h, record.image_v, record.image2_h, record.image2_v] {
            assert!((0.0..2.0).contains(&image));
        }
    }
}

#[test]
fn test_same_seed_same_fountain() {
    let env = TickEnvironment::isolated();
    let mut a = fountain();
    let mut b = fountain();
    for _ in 0..90 {
        a.tick(1.0 / 60.0, &env);
        b.tick(1.0 / 60.0, &env);
    }
    assert!(a.particles().eq(b.particles()));
}
