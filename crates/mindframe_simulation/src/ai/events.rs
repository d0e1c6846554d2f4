//! AI events (perception in, transitions out)

use bevy::prelude::*;

use crate::ai::mental_state::MentalStateKind;

/// Вход perception. Шлёт встроенный proximity sensor или внешний сенсор
/// (raycast, звук); ядро обрабатывает их одинаково.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorEvent {
    /// `observer` (agent root) can now see `target`
    TargetSpotted { observer: Entity, target: Entity },
    /// `observer` lost sight of `target`
    TargetLost { observer: Entity, target: Entity },
}

/// Something hit `victim` (agent root). The victim's mind turns on the
/// attacker.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageTaken {
    pub victim: Entity,
    pub attacker: Entity,
}

/// Emitted on every successful mental-state transition.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MentalStateChanged {
    pub mind: Entity,
    pub from: Option<Entity>,
    pub to: Entity,
    pub kind: MentalStateKind,
}
