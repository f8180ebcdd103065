//! Emitter tick benchmarks

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use fx_particles::distribution::Curve;
use fx_particles::glam::Vec3;
use fx_particles::{
    AccelerationModule, ColorOverLifeModule, Distribution, EmitterInstance, LifetimeModule,
    LodLevel, ParticleEmitter, RequiredModule, SizeModule, SizeScaleModule, TickEnvironment,
    UberKind, VelocityModule, convert_to_uber_module,
};

fn basic_lod(rate: f32) -> LodLevel {
    LodLevel::new(RequiredModule::default().with_spawn_rate(rate))
        .with_module(LifetimeModule::new(Distribution::Uniform { min: 1.0, max: 2.0 }))
        .with_module(SizeModule::new(Vec3::ONE))
        .with_module(VelocityModule::new(Distribution::Uniform {
            min: Vec3::new(-1.0, -1.0, 2.0),
            max: Vec3::new(1.0, 1.0, 4.0),
        }))
        .with_module(ColorOverLifeModule::new(
            Vec3::ONE,
            Distribution::Curve(Curve::linear([(0.0, 1.0_f32), (1.0, 0.0)])),
        ))
}

/// Instance ticked long enough to hold a steady particle count
fn warmed(emitter: ParticleEmitter) -> EmitterInstance {
    let mut instance = EmitterInstance::new(Arc::new(emitter), 1).expect("valid emitter");
    let env = TickEnvironment::isolated();
    for _ in 0..120 {
        instance.tick(1.0 / 60.0, &env);
    }
    instance
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("emitter_tick");
    let env = TickEnvironment::isolated();

    for rate in [100.0_f32, 1000.0, 5000.0] {
        let plain = ParticleEmitter::new("plain", 10_000).with_lod(
            basic_lod(rate)
                .with_module(AccelerationModule::new(Vec3::new(0.0, 0.0, -9.8)))
                .with_module(SizeScaleModule::new(Distribution::Curve(Curve::linear([
                    (0.0, Vec3::ONE),
                    (1.0, Vec3::ZERO),
                ])))),
        );
        let mut instance = warmed(plain);
        group.bench_with_input(BenchmarkId::new("modules", rate), &rate, |b, _| {
            b.iter(|| instance.tick(black_box(1.0 / 60.0), &env));
        });
    }

    group.finish();
}

fn bench_uber(c: &mut Criterion) {
    let mut group = c.benchmark_group("uber_vs_flat");
    let env = TickEnvironment::isolated();

    let flat = ParticleEmitter::new("flat", 10_000).with_lod(basic_lod(2000.0));
    let mut fused = flat.clone();
    convert_to_uber_module(&mut fused, UberKind::Ltisivcl).expect("fusable emitter");

    for (name, emitter) in [("flat", flat), ("uber", fused)] {
        let mut instance = warmed(emitter);
        group.bench_function(name, |b| {
            b.iter(|| instance.tick(black_box(1.0 / 60.0), &env));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tick, bench_uber);
criterion_main!(benches);
