//! Orbit: circle the target at a radius that eases toward the preferred one.

use bevy::prelude::*;
use rand::Rng;

use super::{clamp_to, flat, flat_direction, tick_flip_timer, BehaviorContext};
use crate::components::IdealRange;

#[derive(Debug, Clone, Reflect)]
pub struct Orbit {
    pub min_radius: f32,
    pub max_radius: f32,
    pub preferred_radius: f32,
    /// Exponential decay rate of the radius toward `preferred_radius` (1/s)
    pub decay_rate: f32,
    /// Насколько вперёд по окружности ставится destination (радианы)
    pub lead_angle: f32,
    /// Direction reversal interval range (s)
    pub reverse_interval: (f32, f32),
    radius: Option<f32>,
    direction: f32,
    reverse_in: Option<f32>,
}

impl Default for Orbit {
    fn default() -> Self {
        Self {
            min_radius: 3.0,
            max_radius: 15.0,
            preferred_radius: 8.0,
            decay_rate: 0.5,
            lead_angle: 0.6,
            reverse_interval: (2.0, 6.0),
            radius: None,
            direction: 1.0,
            reverse_in: None,
        }
    }
}

impl Orbit {
    pub fn radius(&self) -> Option<f32> {
        self.radius
    }

    /// +1 counter-clockwise, -1 clockwise (seen from above)
    pub fn direction(&self) -> f32 {
        self.direction
    }

    /// `[min_radius, max_radius]`, narrowed to the equipment's ideal range.
    pub fn radius_bounds(&self, ideal: Option<IdealRange>) -> (f32, f32) {
        let lo = self.min_radius.min(self.max_radius).max(0.0);
        let hi = self.min_radius.max(self.max_radius).max(0.0);

        match ideal {
            Some(range) => {
                let a = clamp_to(range.min.min(range.max), lo, hi);
                let b = clamp_to(range.max.max(range.min), lo, hi);
                (a, b)
            }
            None => (lo, hi),
        }
    }

    /// Current radius clamped into the bounds (preferred when not started).
    pub fn current_radius(&self, ideal: Option<IdealRange>) -> f32 {
        let (lo, hi) = self.radius_bounds(ideal);
        clamp_to(self.radius.unwrap_or(self.preferred_radius), lo, hi)
    }

    pub(super) fn perform(&mut self, ctx: &BehaviorContext, rng: &mut impl Rng) {
        let bounds = self.radius_bounds(ctx.ideal_range);
        let goal = clamp_to(self.preferred_radius, bounds.0, bounds.1);
        let current = self.radius.unwrap_or_else(|| {
            ctx.target
                .map_or(goal, |target| flat(target - ctx.position).length())
        });
        self.radius = Some(decay_radius(current, goal, self.decay_rate, ctx.delta, bounds));

        tick_flip_timer(
            &mut self.reverse_in,
            &mut self.direction,
            ctx.delta,
            self.reverse_interval,
            rng,
        );
    }

    pub(crate) fn get_destination(&self, ctx: &BehaviorContext) -> Option<Vec3> {
        let target = ctx.target?;
        let radius = self.current_radius(ctx.ideal_range);
        let outward = flat_direction(target, ctx.position, Vec3::X);
        let ahead = Quat::from_rotation_y(self.direction * self.lead_angle) * outward;
        Some(target + ahead * radius)
    }
}

/// Один шаг экспоненциального затухания `current` к `goal` в пределах
/// `bounds`. Не перелетает цель и не выходит за границы.
pub fn decay_radius(current: f32, goal: f32, rate: f32, delta: f32, bounds: (f32, f32)) -> f32 {
    let (lo, hi) = (bounds.0.min(bounds.1), bounds.0.max(bounds.1));
    let goal = clamp_to(goal, lo, hi);
    if !current.is_finite() {
        return goal;
    }

    let factor = (-rate.max(0.0) * delta.max(0.0)).exp();
    let factor = if factor.is_finite() { factor } else { 0.0 };
    let radius = goal + (current - goal) * factor;

    if radius.is_finite() {
        clamp_to(radius, lo, hi)
    } else {
        goal
    }
}
