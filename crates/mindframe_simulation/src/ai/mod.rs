//! AI cognition: Mind → MentalState → Behavior.
//!
//! - mind: диспетчер агента (активный state, target, aim)
//! - mental_state: Idle / Alert / Fighting и их правила think
//! - behavior: политики движения Chase / Orbit / Strafe
//! - detection / navigation: модули агента, которые mind резолвит при привязке
//! - spawn: готовая иерархия бойца

use bevy::prelude::*;

pub mod behavior;
pub mod detection;
pub mod events;
pub mod mental_state;
pub mod mind;
pub mod navigation;
pub mod spawn;
pub mod systems;

#[cfg(test)]
mod behavior_tests;
#[cfg(test)]
mod mind_tests;

pub use behavior::{behavior_module, Behavior, BehaviorContext, Chase, Orbit, Strafe};
pub use detection::{detection_module, Detection};
pub use events::{DamageTaken, MentalStateChanged, SensorEvent};
pub use mental_state::{mental_state_module, MentalState, MentalStateKind, StateRequest, ThinkContext};
pub use mind::{
    mind_module, set_target, try_end_state, try_set_state, Mind, MindCommandsExt, MindConfig,
    StateCandidate, StateChange, TransitionError,
};
pub use navigation::{navigation_module, Navigation, NavigationServer, NavigationService, OpenGround};
pub use spawn::{spawn_combatant, CombatantBlueprint, CombatantHandles};

use crate::SimulationSet;

/// AI Plugin
///
/// Perception (`SimulationSet::Perception`):
/// 1. link_mind_modules — hooks регистрации → handles в Mind
/// 2. proximity_sensor — встроенный sight range → SensorEvent
/// 3. apply_sensor_events — SensorEvent → Detection
/// 4. advance_detection_timers
///
/// Cognition (`SimulationSet::Cognition`):
/// 1. react_to_damage — DamageTaken → target + Fighting
/// 2. mind_think — state think + aiming
/// 3. apply_aim_rotation — aim → agent Transform
///
/// Movement (`SimulationSet::Movement`): behavior_movement
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SensorEvent>()
            .add_event::<DamageTaken>()
            .add_event::<MentalStateChanged>()
            .init_resource::<NavigationServer>();

        app.add_systems(
            FixedUpdate,
            (
                systems::link_mind_modules,
                systems::proximity_sensor,
                systems::apply_sensor_events,
                systems::advance_detection_timers,
            )
                .chain()
                .in_set(SimulationSet::Perception),
        );

        app.add_systems(
            FixedUpdate,
            (
                systems::react_to_damage,
                systems::mind_think,
                systems::apply_aim_rotation,
            )
                .chain()
                .in_set(SimulationSet::Cognition),
        );

        app.add_systems(
            FixedUpdate,
            systems::behavior_movement.in_set(SimulationSet::Movement),
        );
    }
}
