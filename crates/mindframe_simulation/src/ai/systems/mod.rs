//! AI systems (perception, cognition, movement).

use bevy::prelude::*;

use crate::ai::events::MentalStateChanged;
use crate::ai::mental_state::{MentalState, MentalStateKind};
use crate::ai::mind::{report_transition_error, Mind, StateCandidate, StateChange};
use crate::components::{Authority, Proxy};
use crate::modules::{Module, ModuleHost};

pub mod links;
pub mod movement;
pub mod perception;
pub mod reactions;
pub mod think;

pub use links::link_mind_modules;
pub use movement::{apply_aim_rotation, behavior_movement};
pub use perception::{advance_detection_timers, apply_sensor_events, proximity_sensor};
pub use reactions::react_to_damage;
pub use think::mind_think;

/// Read access to every bound mental state.
pub type StateQuery<'w, 's> = Query<'w, 's, (&'static Module, &'static MentalState)>;

/// First state of `kind` registered on the mind's host.
pub(crate) fn find_state_of_kind(host: &ModuleHost, states: &StateQuery, kind: MentalStateKind) -> Option<Entity> {
    host.modules().iter().copied().find(|&module| {
        states
            .get(module)
            .is_ok_and(|(_, state)| state.kind == kind)
    })
}

/// Query-side twin of `authority_of`: a `Proxy` on the entity or any
/// ancestor makes it a replica.
pub(crate) fn is_replica(entity: Entity, proxies: &Query<(), With<Proxy>>, parents: &Query<&ChildOf>) -> bool {
    let mut current = Some(entity);
    while let Some(candidate) = current {
        if proxies.contains(candidate) {
            return true;
        }
        current = parents.get(candidate).ok().map(ChildOf::parent);
    }
    false
}

/// Dispatcher call from inside a system: authoritative by construction
/// (callers filter proxies), announces successful transitions.
pub(crate) fn apply_transition(
    mind_entity: Entity,
    mind: &mut Mind,
    next: Option<Entity>,
    states: &StateQuery,
    now: f32,
    changes: &mut EventWriter<MentalStateChanged>,
) -> Option<StateChange> {
    let candidate = next.and_then(|entity| {
        states
            .get(entity)
            .ok()
            .map(|(module, state)| StateCandidate::new(entity, module, state))
    });

    match mind.try_set_state(mind_entity, Authority::Authoritative, candidate, now) {
        Ok(change) => {
            if let StateChange::Changed { from, to } = change {
                let kind = candidate_kind(states, to);
                changes.write(MentalStateChanged {
                    mind: mind_entity,
                    from,
                    to,
                    kind,
                });
                crate::log_info(&format!("🧠 Mind {:?} → {:?} ({:?})", mind_entity, kind, to));
            }
            Some(change)
        }
        Err(error) => {
            report_transition_error(mind_entity, error);
            None
        }
    }
}

fn candidate_kind(states: &StateQuery, state: Entity) -> MentalStateKind {
    states
        .get(state)
        .map(|(_, state)| state.kind)
        .unwrap_or_default()
}
