//! Payload layout seen through a running emitter

use std::sync::Arc;

use fx_particles::glam::Vec3;
use fx_particles::particle::{
    BASE_PARTICLE_SIZE, PayloadRange, SUB_IMAGE_PAYLOAD_SIZE, read_payload,
};
use fx_particles::{
    AccelerationModule, DirectLocationModule, DirectLocationPayload, EmitterInstance,
    LifetimeModule, LodLevel, ParticleAttractorModule, ParticleEmitter, RequiredModule,
    SubImageMethod, SubUvModule, TickEnvironment,
};
use pretty_assertions::assert_eq;

use crate::common::SEED;

fn mixed_lod() -> LodLevel {
    LodLevel::new(RequiredModule::default().with_sub_images(4, 4, SubImageMethod::Random))
        .with_module(AccelerationModule::new(Vec3::new(0.0, 0.0, -9.8)))
        .with_module(ParticleAttractorModule::new("missing"))
        .with_module(SubUvModule::default())
        .with_module(LifetimeModule::new(5.0))
        .with_module(DirectLocationModule {
            location: Some(Vec3::new(1.0, 2.0, 3.0).into()),
            ..Default::default()
        })
}

fn mixed_instance() -> EmitterInstance {
    let emitter = ParticleEmitter::new("mixed", 8).with_lod(mixed_lod());
    EmitterInstance::new(Arc::new(emitter), SEED).unwrap()
}

#[test]
fn test_ranges_follow_module_order() {
    let instance = mixed_instance();
    let layout = instance.layout();

    assert_eq!(
        layout.ranges(),
        &[
            Some(PayloadRange { offset: 0, len: 12 }),
            Some(PayloadRange { offset: 12, len: 8 }),
            Some(PayloadRange { offset: 20, len: 4 }),
            None,
            Some(PayloadRange { offset: 24, len: 24 }),
        ]
    );
    assert_eq!(
        layout.sub_image(),
        Some(PayloadRange {
            offset: 48,
            len: SUB_IMAGE_PAYLOAD_SIZE
        })
    );
    assert_eq!(layout.payload_size(), 48 + SUB_IMAGE_PAYLOAD_SIZE);
    assert_eq!(layout.stride(), BASE_PARTICLE_SIZE + 68);
    assert_eq!(instance.store().stride(), layout.stride());
}

#[test]
fn test_instance_block_only_for_requesting_modules() {
    let instance = mixed_instance();
    assert_eq!(instance.instance_layout().total(), 4);
    assert_eq!(instance.instance_block(1).map(<[u8]>::len), Some(4));
    assert!(instance.instance_block(0).is_none());
}

#[test]
fn test_modules_write_only_their_own_range() {
    let mut instance = mixed_instance();
    instance.spawn_particles(2, 0.0, 0.0, &TickEnvironment::isolated());

    let acceleration: Vec3 = read_payload(instance.module_payload(1, 0).unwrap()).unwrap();
    assert_eq!(acceleration, Vec3::new(0.0, 0.0, -9.8));

    // The attractor found no source emitter and left its range untouched
    assert!(instance.module_payload(1, 1).unwrap().iter().all(|&b| b == 0));

    let direct: DirectLocationPayload =
        read_payload(instance.module_payload(1, 4).unwrap()).unwrap();
    assert_eq!(direct.initial_location, Vec3::new(1.0, 2.0, 3.0));

    assert!(instance.module_payload(1, 3).is_none());
    assert_eq!(
        instance.sub_image_payload(1).map(<[u8]>::len),
        Some(SUB_IMAGE_PAYLOAD_SIZE)
    );
}

#[test]
fn test_layout_without_payload_uses_base_stride() {
    let lod = LodLevel::new(RequiredModule::default()).with_module(LifetimeModule::new(1.0));
    let emitter = ParticleEmitter::new("plain", 8).with_lod(lod);
    let instance = EmitterInstance::new(Arc::new(emitter), SEED).unwrap();

    assert_eq!(instance.layout().payload_size(), 0);
    assert_eq!(instance.layout().stride(), BASE_PARTICLE_SIZE);
    assert_eq!(instance.layout().sub_image(), None);
}
