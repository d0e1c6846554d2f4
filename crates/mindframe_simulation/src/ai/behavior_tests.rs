//! Tests for Chase / Orbit / Strafe.

#[cfg(test)]
mod tests {
    use super::super::behavior::*;
    use crate::components::IdealRange;
    use bevy::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ctx(position: Vec3, target: Option<Vec3>) -> BehaviorContext {
        BehaviorContext {
            position,
            target,
            ideal_range: None,
            delta: 1.0 / 60.0,
        }
    }

    #[test]
    fn test_no_target_no_destination() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for mut behavior in [
            Behavior::Chase(Chase::default()),
            Behavior::Orbit(Orbit::default()),
            Behavior::Strafe(Strafe::default()),
        ] {
            let ctx = ctx(Vec3::ZERO, None);
            behavior.perform(&ctx, &mut rng);
            assert_eq!(behavior.get_destination(&ctx), None, "{}", behavior.name());
        }
    }

    #[test]
    fn test_decay_radius_stays_in_bounds_and_approaches_goal() {
        let bounds = (3.0, 15.0);
        for rate in [0.0, 0.1, 1.0, 50.0, f32::INFINITY, f32::NAN, -2.0] {
            for current in [0.0, 3.0, 8.0, 15.0, 40.0] {
                let next = decay_radius(current, 8.0, rate, 0.1, bounds);
                assert!((3.0..=15.0).contains(&next), "rate {rate}, current {current} → {next}");

                let clamped = current.clamp(3.0, 15.0);
                assert!(
                    (next - 8.0).abs() <= (clamped - 8.0).abs() + 1e-5,
                    "must not move away from the goal"
                );
            }
        }
    }

    #[test]
    fn test_orbit_radius_narrowed_by_ideal_range() {
        let mut orbit = Orbit::default();
        orbit.min_radius = 3.0;
        orbit.max_radius = 15.0;

        assert_eq!(orbit.radius_bounds(None), (3.0, 15.0));
        assert_eq!(orbit.radius_bounds(Some(IdealRange::new(5.0, 9.0))), (5.0, 9.0));
        // Ideal range partly outside the configured range
        assert_eq!(orbit.radius_bounds(Some(IdealRange::new(1.0, 30.0))), (3.0, 15.0));
    }

    #[test]
    fn test_orbit_converges_to_preferred_radius() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut orbit = Behavior::Orbit(Orbit::default());
        let ctx = ctx(Vec3::new(14.0, 0.0, 0.0), Some(Vec3::ZERO));

        for _ in 0..(60 * 30) {
            orbit.perform(&ctx, &mut rng);
        }

        let Behavior::Orbit(orbit) = orbit else {
            unreachable!();
        };
        let radius = orbit.radius().unwrap();
        assert!((radius - 8.0).abs() < 0.01, "radius {radius}");
    }

    #[test]
    fn test_orbit_destination_on_circle() {
        let orbit = Orbit::default();
        let target = Vec3::new(2.0, 0.0, 2.0);
        let ctx = ctx(Vec3::new(20.0, 0.0, 2.0), Some(target));

        let destination = orbit.get_destination(&ctx).unwrap();

        let radius = orbit.current_radius(None);
        assert!((destination.distance(target) - radius).abs() < 1e-4);
    }

    #[test]
    fn test_orbit_direction_reverses_over_time() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut orbit = Orbit::default();
        let ctx = ctx(Vec3::new(8.0, 0.0, 0.0), Some(Vec3::ZERO));
        let start = orbit.direction();
        let mut flipped = false;

        let mut behavior = Behavior::Orbit(orbit.clone());
        for _ in 0..(60 * 10) {
            behavior.perform(&ctx, &mut rng);
            if let Behavior::Orbit(current) = &behavior {
                flipped |= current.direction() != start;
                orbit = current.clone();
            }
        }

        assert!(flipped, "max interval is 6s, 10s must see a reversal");
        assert!(orbit.direction().abs() == 1.0);
    }

    #[test]
    fn test_infinite_interval_never_flips() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let ctx = ctx(Vec3::new(8.0, 0.0, 0.0), Some(Vec3::ZERO));
        let mut orbit = Orbit::default();
        orbit.reverse_interval = (2.0, f32::INFINITY);
        let mut strafe = Strafe::default();
        strafe.switch_interval = (f32::INFINITY, 1.0);
        let mut orbit = Behavior::Orbit(orbit);
        let mut strafe = Behavior::Strafe(strafe);

        for _ in 0..(60 * 30) {
            orbit.perform(&ctx, &mut rng);
            strafe.perform(&ctx, &mut rng);
        }

        let Behavior::Orbit(orbit) = orbit else { unreachable!() };
        let Behavior::Strafe(strafe) = strafe else { unreachable!() };
        assert_eq!(orbit.direction(), 1.0);
        assert_eq!(strafe.side(), 1.0);
    }

    #[test]
    fn test_chase_pre_move_only_adds_lateral() {
        let mut chase = Behavior::Chase(Chase::default());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let ctx = ctx(Vec3::ZERO, Some(Vec3::new(0.0, 0.0, -10.0)));
        for _ in 0..10 {
            chase.perform(&ctx, &mut rng);
        }

        let destination = chase.get_destination(&ctx);
        assert_eq!(destination, Some(Vec3::new(0.0, 0.0, -10.0)));

        let base = Vec3::new(0.0, 0.0, -4.0);
        let mut wish = base;
        chase.pre_move(&ctx, destination, 4.0, &mut wish);

        let added = wish - base;
        assert!(added.z.abs() < 1e-5, "weave is perpendicular to travel");
        assert!(added.x.abs() > 0.0);
    }

    #[test]
    fn test_chase_stops_close_to_target() {
        let chase = Chase::default();
        let ctx = ctx(Vec3::ZERO, Some(Vec3::new(1.0, 0.0, 0.0)));

        assert_eq!(Behavior::Chase(chase).get_destination(&ctx), None);
    }

    #[test]
    fn test_strafe_moves_sideways_at_hold_distance() {
        let strafe = Strafe::default();
        let target = Vec3::new(0.0, 0.0, -6.0);
        let ctx = ctx(Vec3::ZERO, Some(target));

        let destination = Behavior::Strafe(strafe.clone()).get_destination(&ctx).unwrap();

        // Already at hold distance: pure side-step of `step` metres
        assert!((destination.length() - strafe.step).abs() < 1e-4);
        assert!(destination.z.abs() < 1e-4);
    }

    #[test]
    fn test_same_seed_same_behavior() {
        let run = |seed: u64| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut behavior = Behavior::Strafe(Strafe::default());
            let ctx = ctx(Vec3::ZERO, Some(Vec3::new(0.0, 0.0, -6.0)));
            (0..600)
                .map(|_| {
                    behavior.perform(&ctx, &mut rng);
                    behavior.get_destination(&ctx).unwrap()
                })
                .collect::<Vec<_>>()
        };

        assert_eq!(run(11), run(11));
    }
}
