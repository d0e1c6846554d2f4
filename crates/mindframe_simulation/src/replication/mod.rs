//! Mind replication contract.
//!
//! Транспорт внешний. Authority публикует `MindSnapshot`, когда меняется
//! реплицируемая часть Mind (`MindSnapshotReady`); транспорт доставляет его
//! репликам как `MindReplicated`, применяется только к proxy minds.
//! Entity ids идут как `Entity::to_bits`, маппинг между мирами на стороне
//! транспорта.

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::Mind;
use crate::ai::systems::is_replica;
use crate::components::{Proxy, TransformError};
use crate::SimulationSet;

/// Реплицируемая часть Mind: активный state, target, aim.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MindSnapshot {
    pub state: Option<u64>,
    pub target: Option<u64>,
    pub aim_position: Option<[f32; 3]>,
    pub aim_rotation: [f32; 4],
}

impl MindSnapshot {
    pub fn capture(mind: &Mind) -> Self {
        Self {
            state: mind.state().map(Entity::to_bits),
            target: mind.target().map(Entity::to_bits),
            aim_position: mind.aim_position().map(|position| position.to_array()),
            aim_rotation: mind.aim_rotation().to_array(),
        }
    }
}

impl Mind {
    pub fn snapshot(&self) -> MindSnapshot {
        MindSnapshot::capture(self)
    }

    /// Перезаписать реплицируемые поля. Non-finite aim отклоняется целиком,
    /// невалидные entity bits декодируются в `None`.
    pub fn apply_snapshot(&mut self, snapshot: &MindSnapshot) -> Result<(), TransformError> {
        let aim_position = snapshot.aim_position.map(Vec3::from_array);
        if let Some(position) = aim_position {
            if !position.is_finite() {
                return Err(TransformError::Translation(position));
            }
        }
        let aim_rotation = Quat::from_array(snapshot.aim_rotation);
        if !aim_rotation.is_finite() {
            return Err(TransformError::Rotation(aim_rotation));
        }

        self.state = snapshot.state.and_then(decode_entity);
        self.target = snapshot.target.and_then(decode_entity);
        self.aim_position = aim_position;
        self.aim_rotation = aim_rotation;
        Ok(())
    }
}

fn decode_entity(bits: u64) -> Option<Entity> {
    Entity::try_from_bits(bits).ok()
}

/// Outgoing: authority → transport
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct MindSnapshotReady {
    pub mind: Entity,
    pub snapshot: MindSnapshot,
}

/// Incoming: transport → replica
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct MindReplicated {
    pub mind: Entity,
    pub snapshot: MindSnapshot,
}

/// System: публикует изменившиеся snapshots авторитетных minds.
pub fn publish_mind_snapshots(
    mut published: Local<HashMap<Entity, MindSnapshot>>,
    mut despawned: RemovedComponents<Mind>,
    minds: Query<(Entity, &Mind), Changed<Mind>>,
    proxies: Query<(), With<Proxy>>,
    parents: Query<&ChildOf>,
    mut ready: EventWriter<MindSnapshotReady>,
) {
    for entity in despawned.read() {
        published.remove(&entity);
    }

    for (entity, mind) in &minds {
        if is_replica(entity, &proxies, &parents) {
            continue;
        }

        let snapshot = mind.snapshot();
        if published.get(&entity) == Some(&snapshot) {
            continue;
        }

        published.insert(entity, snapshot);
        ready.write(MindSnapshotReady {
            mind: entity,
            snapshot,
        });
    }
}

/// System: применяет входящие snapshots только к proxy minds.
pub fn apply_replicated_minds(
    mut incoming: EventReader<MindReplicated>,
    mut minds: Query<&mut Mind>,
    proxies: Query<(), With<Proxy>>,
    parents: Query<&ChildOf>,
) {
    for event in incoming.read() {
        if !is_replica(event.mind, &proxies, &parents) {
            crate::log_warning(&format!(
                "Replication: ignoring snapshot for authoritative mind {:?}",
                event.mind
            ));
            continue;
        }
        let Ok(mut mind) = minds.get_mut(event.mind) else {
            continue;
        };

        if let Err(error) = mind.apply_snapshot(&event.snapshot) {
            crate::log_warning(&format!("Replication: mind {:?}: {}", event.mind, error));
        }
    }
}

/// Replication plugin (`SimulationSet::Replication`)
pub struct ReplicationPlugin;

impl Plugin for ReplicationPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<MindSnapshotReady>()
            .add_event::<MindReplicated>();

        app.add_systems(
            FixedUpdate,
            (apply_replicated_minds, publish_mind_snapshots)
                .chain()
                .in_set(SimulationSet::Replication),
        );
    }
}
