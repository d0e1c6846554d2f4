//! Detection module: which targets the agent currently sees.
//!
//! Питается `SensorEvent`-ами (внешние сенсоры) и, если задан `sight_range`,
//! встроенным proximity sensor.

use bevy::prelude::*;

use crate::modules::{Module, ParentKind};

#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct Detection {
    visible: Vec<Entity>,
    time_since_seen: f32,
    /// Proximity sensor radius (m); `None` → only external sensor events
    pub sight_range: Option<f32>,
}

impl Detection {
    pub fn with_sight_range(range: f32) -> Self {
        Self {
            sight_range: Some(range.max(0.0)),
            ..default()
        }
    }

    pub fn visible(&self) -> &[Entity] {
        &self.visible
    }

    pub fn is_visible(&self, target: Entity) -> bool {
        self.visible.contains(&target)
    }

    pub fn any_visible(&self) -> bool {
        !self.visible.is_empty()
    }

    /// Секунд с момента, когда хоть что-то было видно
    pub fn time_since_seen(&self) -> f32 {
        self.time_since_seen
    }

    /// Returns true if `target` was not visible before.
    pub fn spot(&mut self, target: Entity) -> bool {
        if self.is_visible(target) {
            return false;
        }
        self.visible.push(target);
        self.time_since_seen = 0.0;
        true
    }

    /// Returns true if `target` was visible before.
    pub fn lose(&mut self, target: Entity) -> bool {
        let before = self.visible.len();
        self.visible.retain(|&visible| visible != target);
        before != self.visible.len()
    }

    /// Drop targets for which `alive` is false.
    pub fn retain_alive(&mut self, alive: impl Fn(Entity) -> bool) {
        self.visible.retain(|&target| alive(target));
    }

    pub fn advance(&mut self, delta: f32) {
        if self.visible.is_empty() {
            self.time_since_seen += delta.max(0.0);
        } else {
            self.time_since_seen = 0.0;
        }
    }
}

/// Detection bundle (binds to an agent).
pub fn detection_module(sight_range: Option<f32>) -> impl Bundle {
    let detection = match sight_range {
        Some(range) => Detection::with_sight_range(range),
        None => Detection::default(),
    };
    (Module::new(ParentKind::Agent), detection)
}
