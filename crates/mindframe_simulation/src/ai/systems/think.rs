//! Cognition tick: perception refresh → state think → aiming.

use bevy::prelude::*;

use crate::ai::detection::Detection;
use crate::ai::events::MentalStateChanged;
use crate::ai::mental_state::{MentalStateKind, StateRequest, ThinkContext};
use crate::ai::mind::Mind;
use crate::ai::systems::{apply_transition, find_state_of_kind, is_replica, StateQuery};
use crate::components::{Proxy, Velocity};
use crate::modules::{Module, ModuleHost};

/// System: один шаг think на каждый авторитетный mind.
///
/// 1. Perception: берём видимую цель из Detection, если текущая не видна;
///    обновляем видимость, время last-seen и последнюю известную позицию
/// 2. Активный state думает; End → next/default, Escalate → Fighting
/// 3. Aim: на видимую цель, иначе по velocity, иначе держим
///
/// Proxy пропускают всё (их Mind приходит через репликацию).
pub fn mind_think(
    time: Res<Time<Fixed>>,
    mut minds: Query<(Entity, &Module, &ModuleHost, &mut Mind)>,
    states: StateQuery,
    detections: Query<&Detection>,
    bodies: Query<(&Transform, Option<&Velocity>)>,
    proxies: Query<(), With<Proxy>>,
    parents: Query<&ChildOf>,
    mut changes: EventWriter<MentalStateChanged>,
) {
    let now = time.elapsed_secs();
    let delta = time.delta_secs();

    for (mind_entity, module, host, mut mind) in &mut minds {
        if is_replica(mind_entity, &proxies, &parents) {
            continue;
        }

        // 1. Perception
        let detection = mind.detection().and_then(|entity| detections.get(entity).ok());

        if let Some(target) = mind.target() {
            if !bodies.contains(target) {
                crate::log(&format!("Mind {:?}: target {:?} is gone", mind_entity, target));
                mind.set_target(None);
            }
        }
        // Потерянная цель уступает любому, кто сейчас в поле зрения
        if let Some(detection) = detection {
            let tracking_visible = mind
                .target()
                .is_some_and(|target| detection.is_visible(target));
            if !tracking_visible {
                let spotted = detection
                    .visible()
                    .iter()
                    .copied()
                    .find(|&candidate| bodies.contains(candidate));
                if let Some(spotted) = spotted {
                    if let Some(previous) = mind.target() {
                        crate::log(&format!(
                            "Mind {:?}: switching target {:?} → {:?}",
                            mind_entity, previous, spotted
                        ));
                    }
                    mind.set_target(Some(spotted));
                }
            }
        }

        let target_position = mind
            .target()
            .and_then(|target| bodies.get(target).ok())
            .map(|(transform, _)| transform.translation);
        let visible = match (mind.target(), detection) {
            (Some(target), Some(detection)) => detection.is_visible(target),
            _ => false,
        };
        mind.observe_target(visible, target_position, now);

        // 2. State
        if mind.state().is_none() {
            let initial = mind.default_state();
            if initial.is_some() {
                apply_transition(mind_entity, &mut mind, initial, &states, now, &mut changes);
            }
        }

        let request = mind
            .state()
            .and_then(|active| states.get(active).ok())
            .map(|(_, state)| {
                let ctx = ThinkContext {
                    now,
                    entered_at: mind.state_entered_at(),
                    target_visible: mind.is_target_visible(),
                    last_seen_at: mind.last_seen_target_at(),
                };
                (state.think(&ctx), state.next_state)
            });

        match request {
            Some((StateRequest::End, declared_next)) => {
                let next = mind.end_target(declared_next);
                apply_transition(mind_entity, &mut mind, next, &states, now, &mut changes);
            }
            Some((StateRequest::Escalate, _)) => {
                let fighting = find_state_of_kind(host, &states, MentalStateKind::Fighting);
                if fighting.is_some() {
                    apply_transition(mind_entity, &mut mind, fighting, &states, now, &mut changes);
                }
            }
            Some((StateRequest::Stay, _)) | None => {}
        }

        // 3. Aim
        let Some(agent) = module.parent() else {
            continue;
        };
        if let Ok((transform, velocity)) = bodies.get(agent) {
            let velocity = velocity.map_or(Vec3::ZERO, |velocity| velocity.0);
            mind.update_aiming(transform.translation, velocity, delta);
        }
    }
}
