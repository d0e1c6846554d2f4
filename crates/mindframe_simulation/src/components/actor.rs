//! Agent / vehicle markers and team membership

use bevy::prelude::*;

use crate::components::{MovementSpeed, Velocity};
use crate::modules::{ModuleHost, ParentKind};
use crate::physics::{KinematicController, MovementInput};

/// Автономный агент (NPC, бот): корневая entity с когнитивными модулями.
///
/// Required components дают каждому агенту transform, velocity и слот
/// ввода controller; module host добавляет `agent_host`.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(Transform, Velocity, MovementSpeed, MovementInput, KinematicController, Team)]
pub struct Agent;

/// Корень техники. Сиденья/ввод внешние, маркер нужен только чтобы
/// модули техники привязывались избирательно.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(Transform, Velocity)]
pub struct Vehicle;

/// Принадлежность к команде (стабильный faction id)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect)]
#[reflect(Component)]
pub struct Team {
    pub id: u64,
}

impl Team {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn is_hostile_to(&self, other: &Team) -> bool {
        self.id != other.id
    }
}

/// Agent root bundle: marker, team, module host.
pub fn agent_host(team: u64) -> impl Bundle {
    (Agent, Team::new(team), ModuleHost::new(ParentKind::Agent))
}

/// Vehicle root bundle: marker + module host.
pub fn vehicle_host() -> impl Bundle {
    (Vehicle, ModuleHost::new(ParentKind::Vehicle))
}
