//! Built-in particle systems
//!
//! Every preset emitter has two LOD levels with the same module list, so any
//! of them can be previewed between levels.

use clap::ValueEnum;
use fx_particles::distribution::Curve;
use fx_particles::glam::Vec3;
use fx_particles::{
    AccelerationModule, AccelerationOverLifetimeModule, AxisSigns, Burst, ColorModule,
    ColorOverLifeModule, ColorScaleOverLifeModule, CylinderLocationModule, DirectLocationModule,
    Distribution, KillBoxModule, KillHeightModule, LifetimeModule, LineAttractorModule,
    LocationModule, LodLevel, ParticleAttractorModule, ParticleEmitter, ParticleSystem,
    PointAttractorModule, PrimitiveOptions, RequiredModule, RotationModule, RotationRateModule,
    RotationRateMultiplyLifeModule, SizeModule, SizeMultiplyLifeModule,
    SizeMultiplyVelocityModule, SizeScaleModule, SourceSelection, SphereLocationModule,
    SubImageMethod, SubUvModule, VelocityModule, VelocityOverLifetimeModule,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    Fountain,
    Sparks,
    Smoke,
    Vortex,
}

impl Preset {
    pub fn description(self) -> &'static str {
        match self {
            Self::Fountain => "Water jet under gravity with a fusable mist emitter",
            Self::Sparks => "Looping spark bursts from a sphere and a spinning ring",
            Self::Smoke => "Rising smoke puffs with a random flipbook",
            Self::Vortex => "Dust pulled toward particles orbiting on an explicit path",
        }
    }

    /// Build the preset with every emitter capped at `max_particles`
    pub fn build(self, max_particles: usize) -> ParticleSystem {
        let emitters = match self {
            Self::Fountain => vec![
                emitter("jet", max_particles, jet(80.0), jet(30.0)),
                emitter("mist", max_particles, mist(40.0), mist(10.0)),
            ],
            Self::Sparks => vec![
                emitter("sparks", max_particles, sparks(48), sparks(16)),
                emitter("ring", max_particles, ring(30.0), ring(10.0)),
            ],
            Self::Smoke => vec![emitter("smoke", max_particles, smoke(25.0), smoke(8.0))],
            Self::Vortex => vec![
                emitter("core", max_particles, core(6.0), core(3.0)),
                emitter("dust", max_particles, dust(60.0), dust(20.0)),
            ],
        };
        let name = self
            .to_possible_value()
            .map_or_else(|| format!("{self:?}"), |v| v.get_name().to_string());
        emitters
            .into_iter()
            .fold(ParticleSystem::new(name), ParticleSystem::with_emitter)
    }
}

fn emitter(name: &str, max_particles: usize, high: LodLevel, low: LodLevel) -> ParticleEmitter {
    ParticleEmitter::new(name, max_particles)
        .with_lod(high)
        .with_lod(low)
}

fn linear<T: fx_particles::distribution::DistributionValue>(from: T, to: T) -> Distribution<T> {
    Distribution::Curve(Curve::linear([(0.0, from), (1.0, to)]))
}

fn jet(rate: f32) -> LodLevel {
    LodLevel::new(RequiredModule::default().with_spawn_rate(rate))
        .with_module(LifetimeModule::new(Distribution::Uniform { min: 1.2, max: 1.8 }))
        .with_module(SizeModule::new(Vec3::splat(0.3)))
        .with_module(VelocityModule::new(Distribution::Uniform {
            min: Vec3::new(-0.5, -0.5, 7.0),
            max: Vec3::new(0.5, 0.5, 9.0),
        }))
        .with_module(AccelerationModule::new(Vec3::new(0.0, 0.0, -9.8)))
        .with_module(ColorOverLifeModule::new(
            linear(Vec3::new(0.6, 0.8, 1.0), Vec3::ONE),
            linear(1.0, 0.2),
        ))
        .with_module(KillHeightModule::floor(-0.1))
}

/// Lifetime, Size, Velocity, ColorOverLife, Location: fusable
fn mist(rate: f32) -> LodLevel {
    LodLevel::new(RequiredModule::default().with_spawn_rate(rate))
        .with_module(LifetimeModule::new(Distribution::Uniform { min: 0.5, max: 1.0 }))
        .with_module(SizeModule::new(Distribution::Uniform {
            min: Vec3::splat(0.5),
            max: Vec3::splat(1.0),
        }))
        .with_module(VelocityModule::new(Distribution::Uniform {
            min: Vec3::new(-1.0, -1.0, -0.5),
            max: Vec3::new(1.0, 1.0, 0.5),
        }))
        .with_module(ColorOverLifeModule::new(Vec3::ONE, linear(0.4, 0.0)))
        .with_module(LocationModule::new(Vec3::new(0.0, 0.0, 3.5)))
}

fn sparks(burst: u32) -> LodLevel {
    let required = RequiredModule::default()
        .with_duration(1.5, 0)
        .with_burst(Burst::with_range(0.0, burst / 2, burst));
    let sphere = SphereLocationModule {
        start_radius: Some(Distribution::Constant(0.25)),
        options: PrimitiveOptions {
            velocity: true,
            velocity_scale: Some(Distribution::Uniform { min: 8.0, max: 14.0 }),
            ..Default::default()
        },
    };
    LodLevel::new(required)
        .with_module(LifetimeModule::new(Distribution::Uniform { min: 0.4, max: 0.9 }))
        .with_module(sphere.surface_only())
        .with_module(SizeModule::new(Vec3::splat(0.05)))
        .with_module(SizeMultiplyVelocityModule::new(Vec3::new(0.1, 0.02, 0.02)))
        .with_module(AccelerationModule::new(Vec3::new(0.0, 0.0, -4.0)))
        .with_module(ColorModule::new(Vec3::new(1.0, 0.7, 0.2), 1.0))
        .with_module(ColorScaleOverLifeModule {
            color_scale: Some(linear(Vec3::ONE, Vec3::new(1.0, 0.2, 0.0))),
            alpha_scale: Some(linear(1.0, 0.0)),
            emitter_time: false,
        })
        .with_module(KillBoxModule::new(Vec3::splat(-6.0), Vec3::splat(6.0)))
}

fn ring(rate: f32) -> LodLevel {
    let cylinder = CylinderLocationModule {
        radial_velocity: true,
        options: PrimitiveOptions {
            surface_only: true,
            velocity: true,
            velocity_scale: Some(Distribution::Constant(1.5)),
            signs: AxisSigns::all(),
            start_location: Some(Vec3::new(0.0, 0.0, 0.5).into()),
        },
        ..CylinderLocationModule::new(2.0, 0.2)
    };
    LodLevel::new(RequiredModule::default().with_spawn_rate(rate))
        .with_module(LifetimeModule::new(1.0))
        .with_module(cylinder)
        .with_module(SizeModule::new(Vec3::splat(0.2)))
        .with_module(SizeMultiplyLifeModule::new(linear(Vec3::ONE, Vec3::splat(0.1))))
        .with_module(RotationModule::new(Distribution::Uniform { min: 0.0, max: 1.0 }))
        .with_module(RotationRateModule::new(4.0))
        .with_module(RotationRateMultiplyLifeModule {
            life_multiplier: Some(linear(1.0, 0.0)),
        })
}

fn smoke(rate: f32) -> LodLevel {
    let required = RequiredModule {
        random_image_time: 0.25,
        ..RequiredModule::default()
            .with_spawn_rate(rate)
            .with_sub_images(4, 4, SubImageMethod::RandomBlend)
    };
    LodLevel::new(required)
        .with_module(LifetimeModule::new(Distribution::Uniform { min: 2.0, max: 3.5 }))
        .with_module(LocationModule::new(Distribution::Uniform {
            min: Vec3::new(-0.3, -0.3, 0.0),
            max: Vec3::new(0.3, 0.3, 0.2),
        }))
        .with_module(
            VelocityModule::new(Distribution::Uniform {
                min: Vec3::new(-0.2, -0.2, 1.0),
                max: Vec3::new(0.2, 0.2, 1.6),
            })
            .with_radial(0.3),
        )
        .with_module(VelocityOverLifetimeModule::scale(linear(Vec3::ONE, Vec3::splat(0.3))))
        .with_module(SizeModule::new(Vec3::splat(0.6)))
        .with_module(SizeScaleModule::new(linear(Vec3::ONE, Vec3::splat(3.0))))
        .with_module(ColorModule::new(Vec3::splat(0.35), 0.8))
        .with_module(ColorScaleOverLifeModule {
            color_scale: None,
            alpha_scale: Some(linear(1.0, 0.0)),
            emitter_time: false,
        })
        .with_module(RotationModule::new(Distribution::Uniform { min: 0.0, max: 1.0 }))
        .with_module(RotationRateModule::new(Distribution::Uniform { min: -0.5, max: 0.5 }))
        .with_module(SubUvModule::default())
}

/// Particles riding a circle of radius 3 over their lifetime
fn core(rate: f32) -> LodLevel {
    let circle = Curve::linear([
        (0.0, Vec3::new(3.0, 0.0, 1.0)),
        (0.25, Vec3::new(0.0, 3.0, 1.0)),
        (0.5, Vec3::new(-3.0, 0.0, 1.0)),
        (0.75, Vec3::new(0.0, -3.0, 1.0)),
        (1.0, Vec3::new(3.0, 0.0, 1.0)),
    ]);
    LodLevel::new(RequiredModule::default().with_spawn_rate(rate))
        .with_module(LifetimeModule::new(4.0))
        .with_module(DirectLocationModule {
            location: Some(Distribution::Curve(circle)),
            ..Default::default()
        })
        .with_module(ColorModule::new(Vec3::new(0.4, 0.6, 1.0), 1.0))
}

fn dust(rate: f32) -> LodLevel {
    LodLevel::new(RequiredModule::default().with_spawn_rate(rate))
        .with_module(LifetimeModule::new(Distribution::Uniform { min: 2.0, max: 4.0 }))
        .with_module(SphereLocationModule::new(6.0))
        .with_module(ParticleAttractorModule {
            selection: SourceSelection::Sequential,
            renew_source: true,
            range: Some(Distribution::Constant(4.0)),
            strength: Some(Distribution::Constant(3.0)),
            strength_by_distance: true,
            ..ParticleAttractorModule::new("core")
        })
        .with_module(PointAttractorModule {
            position: Some(Vec3::ZERO.into()),
            range: Some(Distribution::Constant(8.0)),
            strength: Some(Distribution::Constant(1.0)),
            strength_by_distance: true,
            affect_base_velocity: false,
        })
        .with_module(LineAttractorModule {
            end_point0: Vec3::new(0.0, 0.0, -4.0),
            end_point1: Vec3::new(0.0, 0.0, 4.0),
            range: Some(Distribution::Constant(2.0)),
            strength: Some(linear(0.5, 2.0)),
            affect_base_velocity: false,
        })
        .with_module(AccelerationOverLifetimeModule::new(linear(
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 1.0),
        )))
        .with_module(KillBoxModule {
            kill_inside: true,
            ..KillBoxModule::new(Vec3::splat(-0.25), Vec3::splat(0.25))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fx_particles::ParticleSystemInstance;

    #[test]
    fn test_every_preset_instantiates_and_previews() {
        for preset in Preset::value_variants() {
            let system = preset.build(64);
            let mut instance = ParticleSystemInstance::new(&system, 1).unwrap();
            for emitter in &system.emitters {
                let running = instance.emitter_mut(&emitter.name).unwrap();
                running.set_lod_preview(1, 0.5).unwrap();
            }
            for _ in 0..30 {
                instance.tick(1.0 / 30.0);
            }
            assert!(instance.active_count() > 0, "{preset:?}");
        }
    }
}
