//! Combatant spawning: agent root + mind + states + behaviors + sensors.
//!
//! Иерархия (привязки резолвятся на следующем тике):
//! ```text
//! Agent (ModuleHost: Agent)
//! ├── Detection
//! ├── Navigation
//! └── Mind (ModuleHost: Mind)
//!     ├── Idle (default) ── Alert ── Fighting
//!     └── Chase / Orbit / Strafe
//! ```

use bevy::prelude::*;

use crate::ai::behavior::{behavior_module, Behavior, Orbit};
use crate::ai::detection::detection_module;
use crate::ai::mental_state::{mental_state_module, MentalState};
use crate::ai::mind::{mind_module, MindConfig};
use crate::ai::navigation::navigation_module;
use crate::components::{agent_host, IdealRange};

/// Tuning of one combatant
#[derive(Debug, Clone)]
pub struct CombatantBlueprint {
    pub team: u64,
    pub position: Vec3,
    /// Proximity sensor radius; `None` → external sensor events only
    pub sight_range: Option<f32>,
    pub alert_patience: f32,
    pub fighting_patience: f32,
    /// Behavior while Fighting
    pub fighting_behavior: Behavior,
    /// Behavior while Alert (`None` → stand still)
    pub alert_behavior: Option<Behavior>,
    pub ideal_range: Option<IdealRange>,
    pub mind: MindConfig,
}

impl Default for CombatantBlueprint {
    fn default() -> Self {
        Self {
            team: 1,
            position: Vec3::ZERO,
            sight_range: Some(20.0),
            alert_patience: 10.0,
            fighting_patience: 5.0,
            fighting_behavior: Behavior::Orbit(Orbit::default()),
            alert_behavior: None,
            ideal_range: None,
            mind: MindConfig::default(),
        }
    }
}

/// Entities created by `spawn_combatant`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatantHandles {
    pub agent: Entity,
    pub mind: Entity,
    pub detection: Entity,
    pub navigation: Entity,
    pub idle: Entity,
    pub alert: Entity,
    pub fighting: Entity,
    pub fighting_behavior: Entity,
    pub alert_behavior: Option<Entity>,
}

pub fn spawn_combatant(world: &mut World, blueprint: CombatantBlueprint) -> CombatantHandles {
    let mut agent = world.spawn((agent_host(blueprint.team), Transform::from_translation(blueprint.position)));
    if let Some(range) = blueprint.ideal_range {
        agent.insert(range);
    }
    let agent = agent.id();

    let detection = world
        .spawn((detection_module(blueprint.sight_range), ChildOf(agent)))
        .id();
    let navigation = world.spawn((navigation_module(), ChildOf(agent))).id();
    let mind = world.spawn((mind_module(blueprint.mind), ChildOf(agent))).id();

    let fighting_behavior = world
        .spawn((behavior_module(blueprint.fighting_behavior), ChildOf(mind)))
        .id();
    let alert_behavior = blueprint
        .alert_behavior
        .map(|behavior| world.spawn((behavior_module(behavior), ChildOf(mind))).id());

    let idle = world
        .spawn((mental_state_module(MentalState::idle().as_default()), ChildOf(mind)))
        .id();

    let mut alert_state = MentalState::alert().with_patience(blueprint.alert_patience);
    if let Some(behavior) = alert_behavior {
        alert_state = alert_state.with_behavior(behavior);
    }
    let alert = world
        .spawn((mental_state_module(alert_state), ChildOf(mind)))
        .id();

    let fighting = world
        .spawn((
            mental_state_module(
                MentalState::fighting()
                    .with_patience(blueprint.fighting_patience)
                    .with_next(alert)
                    .with_behavior(fighting_behavior),
            ),
            ChildOf(mind),
        ))
        .id();

    crate::log(&format!(
        "🤖 Spawned combatant {:?} (team {}, mind {:?})",
        agent, blueprint.team, mind
    ));

    CombatantHandles {
        agent,
        mind,
        detection,
        navigation,
        idle,
        alert,
        fighting,
        fighting_behavior,
        alert_behavior,
    }
}
