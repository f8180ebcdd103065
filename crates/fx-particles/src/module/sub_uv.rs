//! Sub-image (flipbook) selection

use crate::distribution::Distribution;
use crate::emitter::{RequiredModule, SubImageMethod};
use crate::particle::{SubImageRecord, read_payload, write_payload};

use super::{LodBlend, Module, ModuleContext, sample_blended};

/// Image index, next image index and blend fraction for a linear scan
///
/// `position` is a fractional image index. The index never exceeds the last
/// image and never decreases as `position` grows.
pub fn linear_sub_image(position: f32, total: u32, blend: bool) -> (u32, u32, f32) {
    let last = total.saturating_sub(1);
    let position = position.max(0.0);
    let index = (position.floor() as u32).min(last);
    if !blend {
        return (index, index, 0.0);
    }
    let interpolation = if index < last {
        (position - index as f32).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (index, (index + 1).min(last), interpolation)
}

fn grid_record(current: u32, next: u32, interpolation: f32, horizontal: u32) -> SubImageRecord {
    SubImageRecord {
        interpolation,
        image_h: (current % horizontal) as f32,
        image_v: (current / horizontal) as f32,
        image2_h: (next % horizontal) as f32,
        image2_v: (next / horizontal) as f32,
    }
}

fn grid_index(h: f32, v: f32, horizontal: u32) -> u32 {
    (v as u32).saturating_mul(horizontal).saturating_add(h as u32)
}

/// Picks which sub-image of the emitter's grid each particle shows
///
/// The selection method and grid come from the LOD's required settings.
/// Linear methods scan the grid over the particle's age, or follow
/// `sub_image_index` when it is set. Random methods pick a new image whenever
/// the particle has shown the current one for longer than the random image
/// time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubUvModule {
    /// Fractional image index over the particle's age
    pub sub_image_index: Option<Distribution<f32>>,
}

impl SubUvModule {
    fn apply(
        &self,
        ctx: &mut ModuleContext<'_>,
        slot: u32,
        lod: Option<LodBlend<'_, Self>>,
        spawning: bool,
    ) {
        let method = ctx.required.sub_image_method;
        if method == SubImageMethod::None || !ctx.particles.has_sub_image() {
            return;
        }
        let horizontal = ctx.required.sub_images_horizontal.max(1);
        let total = horizontal.saturating_mul(ctx.required.sub_images_vertical.max(1));
        let Some(age) = ctx.particles.particle(slot).map(|p| p.relative_time) else {
            return;
        };

        match method {
            SubImageMethod::Linear | SubImageMethod::LinearBlend => {
                let position = if self.sub_image_index.is_some() {
                    sample_blended(
                        self,
                        lod,
                        |m| m.sub_image_index.as_ref(),
                        age,
                        &mut ctx.sampler,
                        0.0,
                    )
                } else {
                    age.clamp(0.0, 1.0) * total as f32
                };
                let (current, next, interpolation) =
                    linear_sub_image(position, total, method == SubImageMethod::LinearBlend);
                if let Some(record) = ctx.particles.record(slot) {
                    if let Some(sub_image) = record.sub_image {
                        write_payload(
                            sub_image,
                            &grid_record(current, next, interpolation, horizontal),
                        );
                    }
                }
            }
            SubImageMethod::Random | SubImageMethod::RandomBlend => {
                self.apply_random(ctx, slot, age, spawning, horizontal, total);
            }
            SubImageMethod::None => {}
        }
    }

    fn apply_random(
        &self,
        ctx: &mut ModuleContext<'_>,
        slot: u32,
        age: f32,
        spawning: bool,
        horizontal: u32,
        total: u32,
    ) {
        let blend = ctx.required.sub_image_method == SubImageMethod::RandomBlend;
        let dwell = ctx.required.random_image_time;

        let (last_change, previous) = {
            let Some(record) = ctx.particles.record(slot) else {
                return;
            };
            let last_change: f32 = read_payload(record.payload).unwrap_or(0.0);
            let previous: SubImageRecord = record
                .sub_image
                .as_deref()
                .and_then(read_payload)
                .unwrap_or_default();
            (last_change, previous)
        };
        let elapsed = age - last_change;

        let reroll = spawning || elapsed > dwell;
        let updated = if reroll {
            let rng = ctx.sampler.rng();
            let mut roll = || rng.next_index(total as usize).unwrap_or(0) as u32;
            let next = roll();
            let current = match (blend, spawning) {
                (false, _) => next,
                (true, true) => roll(),
                (true, false) => grid_index(previous.image2_h, previous.image2_v, horizontal),
            };
            grid_record(current, next, 0.0, horizontal)
        } else {
            let interpolation = if blend && dwell > 0.0 {
                (elapsed / dwell).clamp(0.0, 1.0)
            } else {
                0.0
            };
            SubImageRecord {
                interpolation,
                ..previous
            }
        };

        let Some(record) = ctx.particles.record(slot) else {
            return;
        };
        if reroll {
            write_payload(record.payload, &age);
        }
        if let Some(sub_image) = record.sub_image {
            write_payload(sub_image, &updated);
        }
    }
}

impl Module for SubUvModule {
    fn required_bytes(&self, required: &RequiredModule) -> usize {
        match required.sub_image_method {
            SubImageMethod::Random | SubImageMethod::RandomBlend => std::mem::size_of::<f32>(),
            _ => 0,
        }
    }

    fn spawn(
        &self,
        ctx: &mut ModuleContext<'_>,
        slot: u32,
        _spawn_time: f32,
        lod: Option<LodBlend<'_, Self>>,
    ) {
        self.apply(ctx, slot, lod, true);
    }

    fn update(&self, ctx: &mut ModuleContext<'_>, lod: Option<LodBlend<'_, Self>>) {
        for index in 0..ctx.particles.active_count() {
            if let Some(slot) = ctx.particles.slot(index) {
                self.apply(ctx, slot, lod, false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::TickEnvironment;
    use crate::module::LifetimeModule;
    use crate::module::testing::emitter;
    use test_case::test_case;

    #[test_case(0.0, 4, false => (0, 0, 0.0); "start")]
    #[test_case(2.5, 4, false => (2, 2, 0.0); "middle")]
    #[test_case(2.5, 4, true => (2, 3, 0.5); "middle blended")]
    #[test_case(4.0, 4, true => (3, 3, 0.0); "end clamps")]
    #[test_case(-3.0, 4, true => (0, 1, 0.0); "negative clamps")]
    fn test_linear_sub_image(position: f32, total: u32, blend: bool) -> (u32, u32, f32) {
        linear_sub_image(position, total, blend)
    }

    fn flipbook(method: SubImageMethod) -> RequiredModule {
        RequiredModule {
            sub_images_horizontal: 2,
            sub_images_vertical: 2,
            sub_image_method: method,
            random_image_time: 0.25,
            ..Default::default()
        }
    }

    fn sub_image(instance: &crate::emitter::EmitterInstance) -> SubImageRecord {
        read_payload(instance.sub_image_payload(0).unwrap()).unwrap()
    }

    #[test]
    fn test_linear_scan_over_age() {
        let mut instance = emitter(
            flipbook(SubImageMethod::Linear),
            vec![LifetimeModule::new(1.0).into(), SubUvModule::default().into()],
        );
        let env = TickEnvironment::isolated();
        instance.spawn_particles(1, 0.0, 0.0, &env);
        instance.tick(0.6, &env);

        // Age 0.6 over four images is image 2: column 0, row 1
        let record = sub_image(&instance);
        assert_eq!((record.image_h, record.image_v), (0.0, 1.0));
    }

    #[test]
    fn test_random_requests_timestamp_bytes() {
        let module = SubUvModule::default();
        assert_eq!(module.required_bytes(&flipbook(SubImageMethod::Random)), 4);
        assert_eq!(module.required_bytes(&flipbook(SubImageMethod::Linear)), 0);
    }

    #[test]
    fn test_random_holds_within_dwell() {
        let mut instance = emitter(
            flipbook(SubImageMethod::Random),
            vec![LifetimeModule::new(1.0).into(), SubUvModule::default().into()],
        );
        let env = TickEnvironment::isolated();
        instance.spawn_particles(1, 0.0, 0.0, &env);
        let first = sub_image(&instance);

        instance.tick(0.1, &env);
        instance.tick(0.1, &env);
        assert_eq!(sub_image(&instance), first);
    }

    #[test]
    fn test_no_method_is_noop() {
        let mut instance = emitter(
            RequiredModule::default(),
            vec![SubUvModule::default().into()],
        );
        instance.spawn_particles(1, 0.0, 0.0, &TickEnvironment::isolated());
        assert!(instance.sub_image_payload(0).is_none());
    }

    #[test_case(SubImageMethod::Linear; "linear")]
    #[test_case(SubImageMethod::LinearBlend; "linear blend")]
    #[test_case(SubImageMethod::RandomBlend; "random blend")]
    fn test_oversized_grid_saturates(method: SubImageMethod) {
        let required = RequiredModule {
            sub_images_horizontal: u32::MAX,
            sub_images_vertical: 2,
            ..flipbook(method)
        };
        assert_eq!(required.total_sub_images(), u32::MAX);

        let mut instance = emitter(
            required,
            vec![LifetimeModule::new(1.0).into(), SubUvModule::default().into()],
        );
        let env = TickEnvironment::isolated();
        instance.spawn_particles(1, 0.0, 0.0, &env);
        instance.tick(0.3, &env);
        instance.tick(0.3, &env);

        let record = sub_image(&instance);
        assert!(record.image_v <= 1.0 && record.image2_v <= 1.0);
        assert!((0.0..=1.0).contains(&record.interpolation));
    }
}
