//! Strafe: side-step around the target at a holding distance.

use bevy::prelude::*;
use rand::Rng;

use super::{clamp_to, flat, flat_direction, tick_flip_timer, BehaviorContext};

#[derive(Debug, Clone, Reflect)]
pub struct Strafe {
    /// Lateral offset of each destination (m)
    pub step: f32,
    /// Distance to keep from the target (m), clamped to the ideal range
    pub hold_distance: f32,
    /// Side switch interval range (s)
    pub switch_interval: (f32, f32),
    side: f32,
    switch_in: Option<f32>,
}

impl Default for Strafe {
    fn default() -> Self {
        Self {
            step: 2.0,
            hold_distance: 6.0,
            switch_interval: (1.0, 3.0),
            side: 1.0,
            switch_in: None,
        }
    }
}

impl Strafe {
    /// +1 right, -1 left (relative to the target direction)
    pub fn side(&self) -> f32 {
        self.side
    }

    pub(super) fn perform(&mut self, ctx: &BehaviorContext, rng: &mut impl Rng) {
        tick_flip_timer(
            &mut self.switch_in,
            &mut self.side,
            ctx.delta,
            self.switch_interval,
            rng,
        );
    }

    pub(super) fn get_destination(&self, ctx: &BehaviorContext) -> Option<Vec3> {
        let target = ctx.target?;
        let hold = ctx
            .ideal_range
            .map_or(self.hold_distance, |range| {
                clamp_to(self.hold_distance, range.min.min(range.max), range.max.max(range.min))
            });

        let to_target = flat_direction(ctx.position, target, Vec3::NEG_Z);
        let distance = flat(target - ctx.position).length();
        let lateral = Vec3::Y.cross(to_target) * self.side;

        Some(ctx.position + lateral * self.step + to_target * (distance - hold))
    }
}
