//! Reactions to external stimuli.

use bevy::prelude::*;

use crate::ai::events::{DamageTaken, MentalStateChanged};
use crate::ai::mental_state::MentalStateKind;
use crate::ai::mind::Mind;
use crate::ai::systems::{apply_transition, find_state_of_kind, is_replica, StateQuery};
use crate::components::Proxy;
use crate::modules::ModuleHost;

/// System: damage → turn on the attacker.
///
/// Mind жертвы берёт атакующего в цель (если не занят видимой целью),
/// запоминает откуда прилетело и эскалирует в Fighting.
pub fn react_to_damage(
    time: Res<Time<Fixed>>,
    mut damage_events: EventReader<DamageTaken>,
    agents: Query<&ModuleHost>,
    mut minds: Query<(Entity, &ModuleHost, &mut Mind)>,
    states: StateQuery,
    transforms: Query<&Transform>,
    proxies: Query<(), With<Proxy>>,
    parents: Query<&ChildOf>,
    mut changes: EventWriter<MentalStateChanged>,
) {
    let now = time.elapsed_secs();

    for event in damage_events.read() {
        if event.victim == event.attacker || is_replica(event.victim, &proxies, &parents) {
            continue;
        }
        let Ok(agent_host) = agents.get(event.victim) else {
            continue;
        };

        for &module in agent_host.modules() {
            let Ok((mind_entity, mind_host, mut mind)) = minds.get_mut(module) else {
                continue;
            };

            if !mind.is_target_visible() || mind.target().is_none() {
                mind.set_target(Some(event.attacker));
            }
            if mind.target() == Some(event.attacker) {
                if let Ok(transform) = transforms.get(event.attacker) {
                    mind.remember_target_position(transform.translation);
                }
            }

            crate::log(&format!(
                "💥 {:?} hit by {:?} → mind {:?} reacts",
                event.victim, event.attacker, mind_entity
            ));

            let fighting = find_state_of_kind(mind_host, &states, MentalStateKind::Fighting);
            if fighting.is_some() {
                apply_transition(mind_entity, &mut mind, fighting, &states, now, &mut changes);
            }
        }
    }
}
