//! Kinematic controller for agents.
//!
//! - AI пишет только `MovementInput.wish_velocity`
//! - velocity догоняет wish с ограниченным ускорением
//! - velocity → Transform только через валидирующий setter

use bevy::prelude::*;

use crate::components::{Proxy, TransformExt, Velocity};
use crate::SimulationSet;

#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct KinematicController {
    /// Max velocity change per second (m/s²)
    pub acceleration: f32,
    /// Жёсткий лимит горизонтальной скорости (m/s)
    pub max_speed: f32,
}

impl Default for KinematicController {
    fn default() -> Self {
        Self {
            acceleration: 30.0,
            max_speed: 8.0,
        }
    }
}

/// Желаемая скорость на этот тик.
///
/// Headless тесты: ставить напрямую. В игре: пишут behaviors.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct MovementInput {
    pub wish_velocity: Vec3,
}

/// Velocity one acceleration step closer to `wish` (capped at `max_speed`).
pub fn step_velocity(current: Vec3, wish: Vec3, controller: &KinematicController, delta: f32) -> Vec3 {
    let wish = if wish.is_finite() {
        wish.clamp_length_max(controller.max_speed.max(0.0))
    } else {
        Vec3::ZERO
    };
    let current = if current.is_finite() { current } else { Vec3::ZERO };

    let difference = wish - current;
    let max_change = controller.acceleration.max(0.0) * delta.max(0.0);

    if difference.length() <= max_change {
        wish
    } else {
        current + difference.normalize_or_zero() * max_change
    }
}

/// System: MovementInput → Velocity
pub fn apply_movement_input(
    time: Res<Time<Fixed>>,
    mut query: Query<(&KinematicController, &MovementInput, &mut Velocity), Without<Proxy>>,
) {
    let delta = time.delta_secs();

    for (controller, input, mut velocity) in query.iter_mut() {
        let next = step_velocity(velocity.0, input.wish_velocity, controller, delta);
        if next != velocity.0 {
            velocity.0 = next;
        }
    }
}

/// System: Velocity → Transform (headless, без коллизий)
pub fn integrate_velocity(
    time: Res<Time<Fixed>>,
    mut query: Query<(Entity, &mut Transform, &mut Velocity), (With<KinematicController>, Without<Proxy>)>,
) {
    let delta = time.delta_secs();

    for (entity, mut transform, mut velocity) in query.iter_mut() {
        if velocity.0 == Vec3::ZERO {
            continue;
        }

        let next = transform.translation + velocity.0 * delta;
        if transform.try_set_translation(next).is_err() {
            crate::log_warning(&format!("{:?}: movement rejected, velocity reset", entity));
            velocity.0 = Vec3::ZERO;
        }
    }
}

/// Kinematic controller plugin (`SimulationSet::Physics`)
pub struct KinematicControllerPlugin;

impl Plugin for KinematicControllerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (apply_movement_input, integrate_velocity)
                .chain()
                .in_set(SimulationSet::Physics),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_velocity_reaches_wish_with_bounded_acceleration() {
        let controller = KinematicController {
            acceleration: 10.0,
            max_speed: 8.0,
        };
        let wish = Vec3::new(4.0, 0.0, 0.0);

        let first = step_velocity(Vec3::ZERO, wish, &controller, 0.1);
        assert!((first.length() - 1.0).abs() < 1e-5, "one step = accel * dt");

        let mut velocity = first;
        for _ in 0..10 {
            velocity = step_velocity(velocity, wish, &controller, 0.1);
        }
        assert_eq!(velocity, wish);
    }

    #[test]
    fn test_wish_is_capped_and_sanitized() {
        let controller = KinematicController {
            acceleration: 1000.0,
            max_speed: 2.0,
        };

        let capped = step_velocity(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), &controller, 1.0);
        assert!((capped.length() - 2.0).abs() < 1e-5);

        let sanitized = step_velocity(Vec3::ONE, Vec3::new(f32::NAN, 0.0, 0.0), &controller, 1.0);
        assert_eq!(sanitized, Vec3::ZERO);
    }

    #[test]
    fn test_integrate_moves_transform() {
        let mut app = App::new();
        app.insert_resource(Time::<Fixed>::from_hz(10.0));
        app.add_systems(Update, integrate_velocity);

        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                Velocity(Vec3::new(1.0, 0.0, 0.0)),
                KinematicController::default(),
            ))
            .id();

        let timestep = app.world().resource::<Time<Fixed>>().timestep();
        app.world_mut().resource_mut::<Time<Fixed>>().advance_by(timestep);
        app.update();

        let transform = app.world().get::<Transform>(entity).unwrap();
        assert!((transform.translation.x - 0.1).abs() < 1e-5);
    }
}
