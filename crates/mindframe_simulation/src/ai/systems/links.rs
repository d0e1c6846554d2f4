//! Mind wiring: keeps the Mind's resolved handles (default state, detection,
//! navigation) in step with module registration hooks.

use bevy::ecs::query::QueryFilter;
use bevy::prelude::*;

use crate::ai::detection::Detection;
use crate::ai::events::MentalStateChanged;
use crate::ai::mental_state::MentalState;
use crate::ai::mind::Mind;
use crate::ai::navigation::Navigation;
use crate::ai::systems::{apply_transition, is_replica, StateQuery};
use crate::components::Proxy;
use crate::modules::{ModuleHost, ModuleRegistered, ModuleRemoved};

/// System: react to `ModuleRegistered` / `ModuleRemoved`.
///
/// - default MentalState зарегистрирован на mind → становится `default_state`
///   (первый выигрывает), входим в него, если у mind ещё нет state
/// - Detection / Navigation зарегистрированы на агенте → линкуются к его minds
/// - что-то удалено → handles на него чистятся
pub fn link_mind_modules(
    time: Res<Time<Fixed>>,
    mut registered: EventReader<ModuleRegistered>,
    mut removed: EventReader<ModuleRemoved>,
    mut minds: Query<(Entity, &mut Mind)>,
    hosts: Query<&ModuleHost>,
    states: StateQuery,
    mental_states: Query<&MentalState>,
    detections: Query<(), With<Detection>>,
    navigations: Query<(), With<Navigation>>,
    proxies: Query<(), With<Proxy>>,
    parents: Query<&ChildOf>,
    mut changes: EventWriter<MentalStateChanged>,
) {
    let now = time.elapsed_secs();

    for event in registered.read() {
        // MentalState → its mind
        if let Ok(state) = mental_states.get(event.module) {
            if state.is_default {
                if let Ok((mind_entity, mut mind)) = minds.get_mut(event.parent) {
                    if mind.default_state().is_none() {
                        mind.set_default_state(Some(event.module));
                    }
                    if mind.state().is_none() && !is_replica(mind_entity, &proxies, &parents) {
                        let initial = mind.default_state();
                        apply_transition(mind_entity, &mut mind, initial, &states, now, &mut changes);
                    }
                }
            }
            continue;
        }

        // Mind → agent: резолвим сенсоры/навигацию агента
        if let Ok((_, mut mind)) = minds.get_mut(event.module) {
            if let Ok(agent_host) = hosts.get(event.parent) {
                mind.detection = first_of(agent_host, &detections);
                mind.navigation = first_of(agent_host, &navigations);
            }
            continue;
        }

        // Detection / Navigation → agent: линкуем к minds агента
        let is_detection = detections.contains(event.module);
        let is_navigation = navigations.contains(event.module);
        if !is_detection && !is_navigation {
            continue;
        }
        let Ok(agent_host) = hosts.get(event.parent) else {
            continue;
        };
        for &sibling in agent_host.modules() {
            let Ok((_, mut mind)) = minds.get_mut(sibling) else {
                continue;
            };
            if is_detection && mind.detection.is_none() {
                mind.detection = Some(event.module);
            }
            if is_navigation && mind.navigation.is_none() {
                mind.navigation = Some(event.module);
            }
        }
    }

    for event in removed.read() {
        let module = event.module;

        for (mind_entity, mut mind) in &mut minds {
            if mind_entity == module {
                mind.detection = None;
                mind.navigation = None;
                continue;
            }

            if mind.detection == Some(module) {
                mind.detection = None;
            }
            if mind.navigation == Some(module) {
                mind.navigation = None;
            }

            if mind.default_state() == Some(module) {
                let replacement = hosts
                    .get(mind_entity)
                    .ok()
                    .and_then(|host| first_default_state(host, &mental_states, module));
                mind.set_default_state(replacement);
            }

            if mind.state() == Some(module) {
                mind.clear_state();
                crate::log_warning(&format!(
                    "Mind {:?}: active state {:?} removed, falling back to default",
                    mind_entity, module
                ));
                if !is_replica(mind_entity, &proxies, &parents) {
                    let fallback = mind.default_state();
                    apply_transition(mind_entity, &mut mind, fallback, &states, now, &mut changes);
                }
            }
        }
    }
}

fn first_of<F: QueryFilter>(host: &ModuleHost, filter: &Query<(), F>) -> Option<Entity> {
    host.modules().iter().copied().find(|&module| filter.contains(module))
}

fn first_default_state(host: &ModuleHost, states: &Query<&MentalState>, excluded: Entity) -> Option<Entity> {
    host.modules().iter().copied().find(|&module| {
        module != excluded && states.get(module).is_ok_and(|state| state.is_default)
    })
}
