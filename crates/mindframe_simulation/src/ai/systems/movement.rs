//! Behavior → navigation → wish-velocity, and aim → transform.

use bevy::prelude::*;

use crate::ai::behavior::{flat, Behavior, BehaviorContext};
use crate::ai::mind::Mind;
use crate::ai::navigation::{Navigation, NavigationServer};
use crate::components::{IdealRange, MovementSpeed, Proxy, TransformExt};
use crate::modules::Module;
use crate::physics::MovementInput;
use crate::DeterministicRng;

/// System: run the selected behavior and feed the controller.
///
/// perform → get_destination → navigation.move_to → pre_move (additive).
/// Без behavior (или destination) агент стоит на месте.
pub fn behavior_movement(
    time: Res<Time<Fixed>>,
    mut rng: ResMut<DeterministicRng>,
    navigation_server: Res<NavigationServer>,
    minds: Query<(&Module, &Mind)>,
    mut behaviors: Query<&mut Behavior>,
    mut navigations: Query<&mut Navigation>,
    mut agents: Query<
        (&Transform, &mut MovementInput, Option<&MovementSpeed>, Option<&IdealRange>),
        Without<Proxy>,
    >,
) {
    let delta = time.delta_secs();
    let service = navigation_server.service();

    for (module, mind) in &minds {
        let Some(agent) = module.parent() else {
            continue;
        };
        let Ok((transform, mut input, speed, ideal_range)) = agents.get_mut(agent) else {
            continue;
        };
        let position = transform.translation;
        let speed = speed.copied().unwrap_or_default().speed;
        let mut navigation = mind
            .navigation()
            .and_then(|entity| navigations.get_mut(entity).ok());

        let Some(mut behavior) = mind
            .behavior()
            .and_then(|entity| behaviors.get_mut(entity).ok())
        else {
            if let Some(navigation) = navigation.as_mut() {
                navigation.stop();
            }
            input.wish_velocity = Vec3::ZERO;
            continue;
        };

        let ctx = BehaviorContext {
            position,
            target: mind.last_known_target_position(),
            ideal_range: ideal_range.copied(),
            delta,
        };

        behavior.perform(&ctx, &mut rng.rng);
        let destination = behavior.get_destination(&ctx);

        let mut wish = match (destination, navigation.as_mut()) {
            (Some(destination), Some(navigation)) => {
                navigation.move_to(service, position, destination);
                navigation.wish_velocity(position, speed)
            }
            (Some(destination), None) => flat(destination - position).normalize_or_zero() * speed,
            (None, Some(navigation)) => {
                navigation.stop();
                Vec3::ZERO
            }
            (None, None) => Vec3::ZERO,
        };

        behavior.pre_move(&ctx, destination, speed, &mut wish);

        if wish.is_finite() {
            input.wish_velocity = wish;
        } else {
            crate::log_warning(&format!(
                "{} on {:?}: non-finite wish velocity {:?}, stopping",
                behavior.name(),
                agent,
                wish
            ));
            input.wish_velocity = Vec3::ZERO;
        }
    }
}

/// System: copy the mind's aim rotation onto the agent (validated write).
pub fn apply_aim_rotation(
    minds: Query<(&Module, &Mind), Changed<Mind>>,
    mut agents: Query<&mut Transform, Without<Proxy>>,
) {
    for (module, mind) in &minds {
        let Some(agent) = module.parent() else {
            continue;
        };
        let Ok(mut transform) = agents.get_mut(agent) else {
            continue;
        };

        if transform.rotation != mind.aim_rotation() {
            let _ = transform.try_set_rotation(mind.aim_rotation());
        }
    }
}
