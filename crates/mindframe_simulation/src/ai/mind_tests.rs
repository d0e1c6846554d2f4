//! Tests for the Mind dispatcher and aiming.

#[cfg(test)]
mod tests {
    use super::super::events::MentalStateChanged;
    use super::super::mental_state::{mental_state_module, MentalState};
    use super::super::mind::*;
    use crate::components::{agent_host, Authority, Proxy};
    use crate::modules::{try_register, ModuleRegistered, ModuleRegistrationFailed, ModuleRemoved};
    use bevy::prelude::*;

    struct Fixture {
        world: World,
        mind: Entity,
        idle: Entity,
        alert: Entity,
        fighting: Entity,
        chase: Entity,
    }

    /// agent → mind → {idle (default), alert, fighting → alert}, all bound
    fn fixture() -> Fixture {
        let mut world = World::new();
        world.init_resource::<Events<ModuleRegistered>>();
        world.init_resource::<Events<ModuleRemoved>>();
        world.init_resource::<Events<ModuleRegistrationFailed>>();
        world.init_resource::<Events<MentalStateChanged>>();

        let agent = world.spawn(agent_host(1)).id();
        let mind = world
            .spawn((mind_module(MindConfig::default()), ChildOf(agent)))
            .id();
        let chase = world.spawn_empty().id();
        let idle = world
            .spawn((mental_state_module(MentalState::idle().as_default()), ChildOf(mind)))
            .id();
        let alert = world
            .spawn((mental_state_module(MentalState::alert()), ChildOf(mind)))
            .id();
        let fighting = world
            .spawn((
                mental_state_module(MentalState::fighting().with_next(alert).with_behavior(chase)),
                ChildOf(mind),
            ))
            .id();

        for module in [mind, idle, alert, fighting] {
            try_register(&mut world, module).unwrap();
        }
        world.get_mut::<Mind>(mind).unwrap().set_default_state(Some(idle));

        Fixture {
            world,
            mind,
            idle,
            alert,
            fighting,
            chase,
        }
    }

    fn candidate(owner: Entity, entity: Entity) -> Option<StateCandidate> {
        Some(StateCandidate {
            entity,
            owner: Some(owner),
            behavior: None,
        })
    }

    #[test]
    fn test_transition_selects_state_behavior() {
        let mut f = fixture();

        let change = try_set_state(&mut f.world, f.mind, f.fighting).unwrap();

        assert_eq!(
            change,
            StateChange::Changed {
                from: None,
                to: f.fighting
            }
        );
        let mind = f.world.get::<Mind>(f.mind).unwrap();
        assert_eq!(mind.state(), Some(f.fighting));
        assert_eq!(mind.behavior(), Some(f.chase));
        assert_eq!(f.world.resource::<Events<MentalStateChanged>>().len(), 1);
    }

    #[test]
    fn test_same_state_is_noop() {
        let mut f = fixture();
        try_set_state(&mut f.world, f.mind, f.alert).unwrap();

        let again = try_set_state(&mut f.world, f.mind, f.alert).unwrap();

        assert_eq!(again, StateChange::Unchanged);
        assert_eq!(f.world.resource::<Events<MentalStateChanged>>().len(), 1);
    }

    #[test]
    fn test_proxy_cannot_transition() {
        let mut f = fixture();
        let agent = f.world.get::<ChildOf>(f.mind).unwrap().parent();
        f.world.entity_mut(agent).insert(Proxy);

        let result = try_set_state(&mut f.world, f.mind, f.alert);

        assert_eq!(result, Err(TransitionError::NotAuthoritative));
        assert_eq!(f.world.get::<Mind>(f.mind).unwrap().state(), None);
        assert_eq!(
            set_target(&mut f.world, f.mind, Some(agent)),
            Err(TransitionError::NotAuthoritative)
        );
    }

    #[test]
    fn test_foreign_and_invalid_states_are_rejected() {
        let mut f = fixture();
        let stranger = f.world.spawn(mind_module(MindConfig::default())).id();
        let foreign = f
            .world
            .spawn((mental_state_module(MentalState::alert()), ChildOf(stranger)))
            .id();
        let _ = try_register(&mut f.world, foreign);
        let not_a_state = f.world.spawn_empty().id();

        assert_eq!(
            try_set_state(&mut f.world, f.mind, foreign),
            Err(TransitionError::ForeignState {
                state: foreign,
                owner: Some(stranger)
            })
        );
        assert_eq!(
            try_set_state(&mut f.world, f.mind, not_a_state),
            Err(TransitionError::InvalidState)
        );
        assert_eq!(
            try_set_state(&mut f.world, not_a_state, f.alert),
            Err(TransitionError::NotAMind(not_a_state))
        );
    }

    #[test]
    fn test_end_goes_to_next_then_default() {
        let mut f = fixture();
        try_set_state(&mut f.world, f.mind, f.fighting).unwrap();

        try_end_state(&mut f.world, f.mind).unwrap();
        assert_eq!(f.world.get::<Mind>(f.mind).unwrap().state(), Some(f.alert));

        // Alert declares no next state → default
        try_end_state(&mut f.world, f.mind).unwrap();
        assert_eq!(f.world.get::<Mind>(f.mind).unwrap().state(), Some(f.idle));
    }

    #[test]
    fn test_entered_at_only_moves_on_change() {
        let mind_entity = Entity::from_raw(1);
        let state = Entity::from_raw(2);
        let mut mind = Mind::default();

        mind.try_set_state(mind_entity, Authority::Authoritative, candidate(mind_entity, state), 1.0)
            .unwrap();
        mind.try_set_state(mind_entity, Authority::Authoritative, candidate(mind_entity, state), 4.0)
            .unwrap();

        assert_eq!(mind.state_entered_at(), 1.0);
    }

    #[test]
    fn test_set_target_resets_sighting() {
        let mut mind = Mind::default();
        let first = Entity::from_raw(10);
        mind.set_target(Some(first));
        mind.observe_target(true, Some(Vec3::new(1.0, 0.0, 0.0)), 2.0);
        assert!(mind.is_target_visible());

        mind.set_target(Some(Entity::from_raw(11)));

        assert!(!mind.is_target_visible());
        assert_eq!(mind.last_seen_target_at(), None);
        assert_eq!(mind.last_known_target_position(), None);
    }

    #[test]
    fn test_aim_tracks_visible_target_smoothly() {
        let mut mind = Mind::default();
        mind.set_target(Some(Entity::from_raw(10)));
        // Target to the +X side: yaw of -90°
        mind.observe_target(true, Some(Vec3::new(10.0, 0.0, 0.0)), 0.0);
        let goal = Quat::from_rotation_y(-std::f32::consts::FRAC_PI_2);

        mind.update_aiming(Vec3::ZERO, Vec3::ZERO, 1.0 / 60.0);
        let first = mind.aim_rotation();
        assert!(!first.abs_diff_eq(goal, 1e-3), "aim must not snap");
        assert!(first.angle_between(goal) < Quat::IDENTITY.angle_between(goal));

        for _ in 0..300 {
            mind.update_aiming(Vec3::ZERO, Vec3::ZERO, 1.0 / 60.0);
        }
        assert!(mind.aim_rotation().angle_between(goal) < 1e-2);
    }

    #[test]
    fn test_aim_follows_velocity_then_holds() {
        let mut mind = Mind::default();
        let velocity = Vec3::new(0.0, 0.0, 3.0); // moving toward +Z: yaw 180°
        for _ in 0..300 {
            mind.update_aiming(Vec3::ZERO, velocity, 1.0 / 60.0);
        }
        let facing = mind.aim_rotation();
        assert!(facing.angle_between(Quat::from_rotation_y(std::f32::consts::PI)) < 1e-2);

        // Below threshold: keep orientation
        mind.update_aiming(Vec3::ZERO, Vec3::new(0.05, 0.0, 0.0), 1.0);
        assert_eq!(mind.aim_rotation(), facing);
    }

    #[test]
    fn test_non_finite_aim_position_rejected() {
        let mut mind = Mind::default();
        mind.try_set_aim_position(Vec3::ONE).unwrap();

        assert!(mind.try_set_aim_position(Vec3::new(f32::NAN, 0.0, 0.0)).is_err());
        assert_eq!(mind.aim_position(), Some(Vec3::ONE));
    }
}
