//! Perception: SensorEvent → Detection, plus the built-in proximity sensor.

use bevy::prelude::*;

use crate::ai::detection::Detection;
use crate::ai::events::SensorEvent;
use crate::components::{Proxy, Team};
use crate::modules::{Module, ModuleHost};

/// System: built-in proximity sensor for detections with a `sight_range`.
///
/// Шлёт TargetSpotted/TargetLost для враждебных агентов, входящих/выходящих
/// из радиуса. Без sight range агент полагается только на внешние сенсоры.
pub fn proximity_sensor(
    detections: Query<(&Module, &Detection)>,
    observers: Query<(&Transform, &Team), Without<Proxy>>,
    candidates: Query<(Entity, &Transform, &Team)>,
    mut sensor_events: EventWriter<SensorEvent>,
) {
    for (module, detection) in &detections {
        let Some(range) = detection.sight_range else {
            continue;
        };
        let Some(observer) = module.parent() else {
            continue;
        };
        let Ok((observer_transform, observer_team)) = observers.get(observer) else {
            continue;
        };

        for (target, target_transform, target_team) in &candidates {
            if target == observer || !observer_team.is_hostile_to(target_team) {
                continue;
            }

            let in_range = observer_transform
                .translation
                .distance(target_transform.translation)
                <= range;
            let visible = detection.is_visible(target);

            if in_range && !visible {
                sensor_events.write(SensorEvent::TargetSpotted { observer, target });
            } else if !in_range && visible {
                sensor_events.write(SensorEvent::TargetLost { observer, target });
            }
        }
    }
}

/// System: apply sensor events to the observer's Detection module(s).
pub fn apply_sensor_events(
    mut sensor_events: EventReader<SensorEvent>,
    hosts: Query<&ModuleHost>,
    mut detections: Query<&mut Detection, With<Module>>,
) {
    for event in sensor_events.read() {
        let (observer, target, spotted) = match *event {
            SensorEvent::TargetSpotted { observer, target } => (observer, target, true),
            SensorEvent::TargetLost { observer, target } => (observer, target, false),
        };

        let Ok(host) = hosts.get(observer) else {
            continue;
        };

        for &module in host.modules() {
            let Ok(mut detection) = detections.get_mut(module) else {
                continue;
            };

            if spotted && detection.spot(target) {
                crate::log(&format!("👁️ {:?} spotted {:?}", observer, target));
            } else if !spotted && detection.lose(target) {
                crate::log(&format!("👻 {:?} lost sight of {:?}", observer, target));
            }
        }
    }
}

/// System: забыть деспавненные цели, продвинуть `time_since_seen`.
pub fn advance_detection_timers(
    time: Res<Time<Fixed>>,
    mut detections: Query<&mut Detection>,
    entities: Query<Entity>,
) {
    let delta = time.delta_secs();

    for mut detection in &mut detections {
        let before = detection.visible().len();
        detection.retain_alive(|target| entities.contains(target));

        let removed = before - detection.visible().len();
        if removed > 0 {
            crate::log(&format!("Detection: dropped {} despawned targets", removed));
        }

        detection.advance(delta);
    }
}
