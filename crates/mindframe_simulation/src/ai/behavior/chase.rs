//! Chase: close the distance, weaving side to side.

use std::f32::consts::TAU;

use bevy::prelude::*;

use super::{flat, flat_direction, BehaviorContext};

#[derive(Debug, Clone, Reflect)]
pub struct Chase {
    /// Stop pushing forward inside this distance (m)
    pub stop_distance: f32,
    /// Боковое виляние (доля от скорости движения)
    pub weave_amplitude: f32,
    /// Weave frequency (Hz)
    pub weave_frequency: f32,
    phase: f32,
}

impl Default for Chase {
    fn default() -> Self {
        Self {
            stop_distance: 1.5,
            weave_amplitude: 0.35,
            weave_frequency: 0.8,
            phase: 0.0,
        }
    }
}

impl Chase {
    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub(super) fn perform(&mut self, ctx: &BehaviorContext) {
        let step = TAU * self.weave_frequency * ctx.delta.max(0.0);
        if step.is_finite() {
            self.phase = (self.phase + step).rem_euclid(TAU);
        }
    }

    pub(super) fn get_destination(&self, ctx: &BehaviorContext) -> Option<Vec3> {
        let target = ctx.target?;
        if flat(target - ctx.position).length() <= self.stop_distance {
            return None;
        }
        Some(target)
    }

    pub(super) fn pre_move(&self, ctx: &BehaviorContext, destination: Option<Vec3>, speed: f32, wish: &mut Vec3) {
        let Some(destination) = destination else {
            return;
        };
        let forward = flat_direction(ctx.position, destination, Vec3::ZERO);
        if forward == Vec3::ZERO {
            return;
        }

        let lateral = Vec3::Y.cross(forward);
        *wish += lateral * (self.phase.sin() * self.weave_amplitude * speed);
    }
}
