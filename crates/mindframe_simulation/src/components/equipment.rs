//! Equipment-derived tuning

use bevy::prelude::*;

/// Ideal engagement range of the equipment an agent holds (metres).
///
/// Orbit behavior narrows its radius range to this window.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct IdealRange {
    pub min: f32,
    pub max: f32,
}

impl IdealRange {
    /// Swaps inverted bounds so `min <= max` always holds.
    pub fn new(a: f32, b: f32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }
}

impl Default for IdealRange {
    fn default() -> Self {
        Self::new(4.0, 12.0)
    }
}
