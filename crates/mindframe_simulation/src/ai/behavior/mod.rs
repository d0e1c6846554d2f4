//! Behaviors: movement policies selected by the active mental state.
//!
//! Каждый тик movement system вызывает по порядку:
//! 1. `perform` — advance internal timers/phases (consumes the seeded RNG)
//! 2. `get_destination` — where to go this tick
//! 3. `pre_move` — add to the navigation wish-velocity (never replace it)

use bevy::prelude::*;
use rand::Rng;

use crate::components::IdealRange;
use crate::modules::{Module, ParentKind};

mod chase;
mod orbit;
mod strafe;

pub use chase::Chase;
pub use orbit::{decay_radius, Orbit};
pub use strafe::Strafe;

/// Inputs of one behavior tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorContext {
    pub position: Vec3,
    /// Visible position of the target, else its last known position
    pub target: Option<Vec3>,
    pub ideal_range: Option<IdealRange>,
    pub delta: f32,
}

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub enum Behavior {
    Chase(Chase),
    Orbit(Orbit),
    Strafe(Strafe),
}

impl Default for Behavior {
    fn default() -> Self {
        Self::Chase(Chase::default())
    }
}

impl Behavior {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Chase(_) => "Chase",
            Self::Orbit(_) => "Orbit",
            Self::Strafe(_) => "Strafe",
        }
    }

    pub fn perform(&mut self, ctx: &BehaviorContext, rng: &mut impl Rng) {
        match self {
            Self::Chase(chase) => chase.perform(ctx),
            Self::Orbit(orbit) => orbit.perform(ctx, rng),
            Self::Strafe(strafe) => strafe.perform(ctx, rng),
        }
    }

    pub fn get_destination(&self, ctx: &BehaviorContext) -> Option<Vec3> {
        match self {
            Self::Chase(chase) => chase.get_destination(ctx),
            Self::Orbit(orbit) => orbit.get_destination(ctx),
            Self::Strafe(strafe) => strafe.get_destination(ctx),
        }
    }

    pub fn pre_move(&self, ctx: &BehaviorContext, destination: Option<Vec3>, speed: f32, wish: &mut Vec3) {
        if let Self::Chase(chase) = self {
            chase.pre_move(ctx, destination, speed, wish);
        }
    }
}

/// Behavior bundle (binds to a Mind).
pub fn behavior_module(behavior: Behavior) -> impl Bundle {
    (Module::new(ParentKind::Mind), behavior)
}

/// Horizontal component of `v`.
pub(crate) fn flat(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Horizontal direction from `from` to `to`, `fallback` when they coincide.
pub(crate) fn flat_direction(from: Vec3, to: Vec3, fallback: Vec3) -> Vec3 {
    let offset = flat(to - from);
    if offset.length_squared() > 1e-4 {
        offset.normalize()
    } else {
        fallback
    }
}

/// `value` limited to `[lo, hi]`. Unlike `f32::clamp` it never panics on
/// inverted or NaN bounds.
pub(crate) fn clamp_to(value: f32, lo: f32, hi: f32) -> f32 {
    value.max(lo).min(hi)
}

/// Равномерный интервал в `[min, max]` (границы в любом порядке).
/// Бесконечная верхняя граница: таймер никогда не срабатывает.
pub(crate) fn roll_interval(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    let (lo, hi) = (min.min(max).max(0.0), min.max(max).max(0.0));
    if !hi.is_finite() {
        return f32::INFINITY;
    }
    if hi - lo <= f32::EPSILON {
        return lo;
    }
    rng.gen_range(lo..=hi)
}

/// Обратный отсчёт: по истечении переворачивает знак ±1 и перезаводится
/// случайным интервалом. Общий для направления orbit и стороны strafe.
pub(crate) fn tick_flip_timer(
    remaining: &mut Option<f32>,
    sign: &mut f32,
    delta: f32,
    interval: (f32, f32),
    rng: &mut impl Rng,
) {
    let left = remaining.unwrap_or_else(|| roll_interval(rng, interval.0, interval.1)) - delta.max(0.0);
    if left <= 0.0 {
        *sign = -*sign;
        *remaining = Some(roll_interval(rng, interval.0, interval.1));
    } else {
        *remaining = Some(left);
    }
}
