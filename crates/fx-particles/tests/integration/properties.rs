//! Property tests for layout, lifetime composition and sub-image selection

use fx_particles::distribution::Curve;
use fx_particles::glam::Vec3;
use fx_particles::particle::PayloadLayout;
use fx_particles::{
    Distribution, LifetimeModule, SizeModule, SizeScaleModule, TickEnvironment, linear_sub_image,
};
use proptest::prelude::*;

use crate::common::instance;

fn requirements() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(prop_oneof![Just(0_usize), 1_usize..64], 0..12)
}

fn lifetime() -> impl Strategy<Value = f32> {
    0.05_f32..20.0
}

proptest! {
    #[test]
    fn layout_ranges_are_disjoint_and_exact(
        requirements in requirements(),
        sub_image in any::<bool>(),
    ) {
        let layout = PayloadLayout::from_requirements(requirements.clone(), sub_image);

        let mut covered = 0;
        let mut end = 0;
        for (bytes, range) in requirements.iter().zip(layout.ranges()) {
            match range {
                Some(range) => {
                    prop_assert_eq!(range.len, *bytes);
                    prop_assert_eq!(range.offset, end);
                    end = range.end();
                    covered += range.len;
                }
                None => prop_assert_eq!(*bytes, 0),
            }
        }
        let sub_image_len = layout.sub_image().map_or(0, |range| range.len);
        prop_assert_eq!(covered + sub_image_len, layout.payload_size());
        prop_assert_eq!(layout.stride() % 4, 0);
        prop_assert!(layout.stride() >= layout.base_size() + layout.payload_size());
    }

    #[test]
    fn lifetime_composition_is_commutative(a in lifetime(), b in lifetime()) {
        let env = TickEnvironment::isolated();
        let mut forward =
            instance(vec![LifetimeModule::new(a).into(), LifetimeModule::new(b).into()]);
        let mut reverse =
            instance(vec![LifetimeModule::new(b).into(), LifetimeModule::new(a).into()]);
        forward.spawn_particles(1, 0.0, 0.0, &env);
        reverse.spawn_particles(1, 0.0, 0.0, &env);

        let x = forward.particle(0).unwrap().one_over_max_lifetime;
        let y = reverse.particle(0).unwrap().one_over_max_lifetime;
        prop_assert!((x - y).abs() <= 1e-5 * x.max(y));
        prop_assert!((1.0 / x - (a + b)).abs() <= 1e-3 * (a + b));
    }

    #[test]
    fn linear_sub_image_is_monotonic(
        first in 0.0_f32..=1.0,
        second in 0.0_f32..=1.0,
        horizontal in 1_u32..8,
        vertical in 1_u32..8,
    ) {
        let total = horizontal * vertical;
        let (low_age, high_age) = if first <= second { (first, second) } else { (second, first) };
        let (low, _, _) = linear_sub_image(low_age * total as f32, total, false);
        let (high, _, _) = linear_sub_image(high_age * total as f32, total, false);
        prop_assert!(low <= high);
        prop_assert!(high < total);
    }

    #[test]
    fn size_scale_update_is_idempotent(age in 0.0_f32..0.99) {
        let scale = Distribution::Curve(Curve::linear([(0.0, Vec3::ONE), (1.0, Vec3::ZERO)]));
        let mut instance = instance(vec![
            LifetimeModule::new(1.0).into(),
            SizeModule::new(Vec3::splat(2.0)).into(),
            SizeScaleModule::new(scale).into(),
        ]);
        let env = TickEnvironment::isolated();
        instance.spawn_particles(1, 0.0, 0.0, &env);
        instance.tick(age, &env);
        let once = instance.particle(0).unwrap().size;

        // A zero-length tick keeps the age and reapplies the scale
        instance.tick(0.0, &env);
        instance.tick(0.0, &env);
        prop_assert_eq!(instance.particle(0).unwrap().size, once);
    }
}
