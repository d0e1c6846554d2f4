//! Mind: per-agent driver of the mental-state / behavior machine.
//!
//! Mind одновременно модуль агента и хост для своих MentalState и
//! Behavior модулей. Хранит только handles (entities), логика состояний
//! живёт в `MentalState::think`.

use bevy::prelude::*;
use thiserror::Error;

use crate::ai::events::MentalStateChanged;
use crate::ai::mental_state::MentalState;
use crate::components::{authority_of, yaw_towards, Authority, TransformError};
use crate::modules::{Module, ModuleHost, ParentKind};

/// Aiming tuning
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct MindConfig {
    /// Exponential slew rate of the aim rotation (1/s)
    pub aim_turn_rate: f32,
    /// Ниже этой скорости агент держит ориентацию (m/s)
    pub aim_velocity_threshold: f32,
}

impl Default for MindConfig {
    fn default() -> Self {
        Self {
            aim_turn_rate: 8.0,
            aim_velocity_threshold: 0.1,
        }
    }
}

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Mind {
    pub(crate) state: Option<Entity>,
    pub(crate) default_state: Option<Entity>,
    pub(crate) behavior: Option<Entity>,
    pub(crate) target: Option<Entity>,
    pub(crate) target_visible: bool,
    pub(crate) last_seen_target_at: Option<f32>,
    pub(crate) last_known_target_position: Option<Vec3>,
    pub(crate) aim_position: Option<Vec3>,
    pub(crate) aim_rotation: Quat,
    pub(crate) state_entered_at: f32,
    pub(crate) detection: Option<Entity>,
    pub(crate) navigation: Option<Entity>,
    pub config: MindConfig,
}

impl Default for Mind {
    fn default() -> Self {
        Self {
            state: None,
            default_state: None,
            behavior: None,
            target: None,
            target_visible: false,
            last_seen_target_at: None,
            last_known_target_position: None,
            aim_position: None,
            aim_rotation: Quat::IDENTITY,
            state_entered_at: 0.0,
            detection: None,
            navigation: None,
            config: MindConfig::default(),
        }
    }
}

/// Что диспетчеру нужно знать о запрошенном state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateCandidate {
    pub entity: Entity,
    /// Mind the state module is bound to
    pub owner: Option<Entity>,
    /// Behavior the state selects while active
    pub behavior: Option<Entity>,
}

impl StateCandidate {
    pub fn new(entity: Entity, module: &Module, state: &MentalState) -> Self {
        Self {
            entity,
            owner: module.parent(),
            behavior: state.behavior,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    Unchanged,
    Changed { from: Option<Entity>, to: Entity },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("entity {0:?} has no Mind")]
    NotAMind(Entity),
    #[error("requested state is not a live MentalState")]
    InvalidState,
    #[error("caller is not the authoritative owner")]
    NotAuthoritative,
    #[error("state {state:?} belongs to {owner:?}, not to this mind")]
    ForeignState { state: Entity, owner: Option<Entity> },
}

impl Mind {
    pub fn state(&self) -> Option<Entity> {
        self.state
    }

    pub fn default_state(&self) -> Option<Entity> {
        self.default_state
    }

    pub fn behavior(&self) -> Option<Entity> {
        self.behavior
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    pub fn is_target_visible(&self) -> bool {
        self.target_visible
    }

    pub fn last_seen_target_at(&self) -> Option<f32> {
        self.last_seen_target_at
    }

    pub fn last_known_target_position(&self) -> Option<Vec3> {
        self.last_known_target_position
    }

    pub fn aim_position(&self) -> Option<Vec3> {
        self.aim_position
    }

    pub fn aim_rotation(&self) -> Quat {
        self.aim_rotation
    }

    pub fn state_entered_at(&self) -> f32 {
        self.state_entered_at
    }

    pub fn detection(&self) -> Option<Entity> {
        self.detection
    }

    pub fn navigation(&self) -> Option<Entity> {
        self.navigation
    }

    /// `SetTarget`. Новая цель стартует невидимой и без известной позиции.
    pub fn set_target(&mut self, target: Option<Entity>) {
        if self.target == target {
            return;
        }
        self.target = target;
        self.target_visible = false;
        self.last_seen_target_at = None;
        self.last_known_target_position = None;
    }

    /// Внешняя подсказка, где цель (например, только что попала по нам).
    pub fn remember_target_position(&mut self, position: Vec3) {
        if position.is_finite() {
            self.last_known_target_position = Some(position);
        }
    }

    pub fn try_set_aim_position(&mut self, position: Vec3) -> Result<(), TransformError> {
        if !position.is_finite() {
            crate::log_warning(&format!("Mind: rejected non-finite aim position {:?}", position));
            return Err(TransformError::Translation(position));
        }
        self.aim_position = Some(position);
        Ok(())
    }

    /// Результат perception за тик для текущей цели.
    pub fn observe_target(&mut self, visible: bool, position: Option<Vec3>, now: f32) {
        self.target_visible = visible && self.target.is_some();
        if !self.target_visible {
            return;
        }

        self.last_seen_target_at = Some(now);
        if let Some(position) = position {
            self.remember_target_position(position);
            let _ = self.try_set_aim_position(position);
        }
    }

    /// `TrySetState`. Диспетчер не ветирует валидный собственный state,
    /// решают сами states.
    pub fn try_set_state(
        &mut self,
        mind: Entity,
        authority: Authority,
        next: Option<StateCandidate>,
        now: f32,
    ) -> Result<StateChange, TransitionError> {
        if !authority.can_simulate() {
            return Err(TransitionError::NotAuthoritative);
        }
        let next = next.ok_or(TransitionError::InvalidState)?;
        if next.owner != Some(mind) {
            return Err(TransitionError::ForeignState {
                state: next.entity,
                owner: next.owner,
            });
        }
        if self.state == Some(next.entity) {
            return Ok(StateChange::Unchanged);
        }

        let from = self.state.replace(next.entity);
        self.state_entered_at = now;
        self.behavior = next.behavior;

        Ok(StateChange::Changed {
            from,
            to: next.entity,
        })
    }

    /// Where `TryEnd` hands off to: the state's declared next, else default.
    pub fn end_target(&self, next_state: Option<Entity>) -> Option<Entity> {
        next_state.or(self.default_state)
    }

    pub fn set_behavior(&mut self, behavior: Option<Entity>) {
        self.behavior = behavior;
    }

    /// `UpdateAiming`: видимая цель → смотрим на неё; движемся → по velocity;
    /// иначе держим. Экспоненциальный slerp, без рывков.
    pub fn update_aiming(&mut self, position: Vec3, velocity: Vec3, delta: f32) {
        let desired = if self.target_visible {
            self.aim_position.map(|aim| aim - position)
        } else if velocity.length() > self.config.aim_velocity_threshold {
            Some(velocity)
        } else {
            None
        };

        let Some(goal) = desired.and_then(yaw_towards) else {
            return;
        };

        let t = 1.0 - (-self.config.aim_turn_rate.max(0.0) * delta.max(0.0)).exp();
        let next = self.aim_rotation.slerp(goal, t.clamp(0.0, 1.0)).normalize();
        if next.is_finite() {
            self.aim_rotation = next;
        }
    }

    pub(crate) fn set_default_state(&mut self, state: Option<Entity>) {
        self.default_state = state;
    }

    pub(crate) fn clear_state(&mut self) {
        self.state = None;
        self.behavior = None;
    }
}

/// Mind bundle: module bound to an agent + host for its states/behaviors.
pub fn mind_module(config: MindConfig) -> impl Bundle {
    (
        Module::new(ParentKind::Agent),
        ModuleHost::new(ParentKind::Mind),
        Mind {
            config,
            ..default()
        },
    )
}

/// Snapshot of `state` as a transition candidate, if it is a live state module.
pub fn state_candidate(world: &World, state: Entity) -> Option<StateCandidate> {
    let module = world.get::<Module>(state)?;
    let mental_state = world.get::<MentalState>(state)?;
    Some(StateCandidate::new(state, module, mental_state))
}

fn fixed_now(world: &World) -> f32 {
    world
        .get_resource::<Time<Fixed>>()
        .map(|time| time.elapsed_secs())
        .unwrap_or(0.0)
}

/// World-level `TrySetState` for external systems.
pub fn try_set_state(world: &mut World, mind: Entity, next: Entity) -> Result<StateChange, TransitionError> {
    let authority = authority_of(world, mind);
    let candidate = state_candidate(world, next);
    let now = fixed_now(world);

    let change = world
        .get_mut::<Mind>(mind)
        .ok_or(TransitionError::NotAMind(mind))?
        .try_set_state(mind, authority, candidate, now)?;

    if let StateChange::Changed { from, to } = change {
        announce(world, mind, from, to);
    }
    Ok(change)
}

/// World-level `TryEnd`: active state's next state, else the default.
pub fn try_end_state(world: &mut World, mind: Entity) -> Result<StateChange, TransitionError> {
    let current = world
        .get::<Mind>(mind)
        .ok_or(TransitionError::NotAMind(mind))?;
    let declared_next = current
        .state
        .and_then(|active| world.get::<MentalState>(active))
        .and_then(|active| active.next_state);
    let target = current.end_target(declared_next);

    match target {
        Some(next) => try_set_state(world, mind, next),
        None => Err(TransitionError::InvalidState),
    }
}

/// World-level `SetTarget`.
pub fn set_target(world: &mut World, mind: Entity, target: Option<Entity>) -> Result<(), TransitionError> {
    if !authority_of(world, mind).can_simulate() {
        return Err(TransitionError::NotAuthoritative);
    }
    world
        .get_mut::<Mind>(mind)
        .ok_or(TransitionError::NotAMind(mind))?
        .set_target(target);
    Ok(())
}

fn announce(world: &mut World, mind: Entity, from: Option<Entity>, to: Entity) {
    let Some(kind) = world.get::<MentalState>(to).map(|state| state.kind) else {
        return;
    };
    world.send_event(MentalStateChanged { mind, from, to, kind });
    crate::log_info(&format!("🧠 Mind {:?} → {:?} ({:?})", mind, kind, to));
}

/// Лог отклонённого перехода. На репликах нарушение authority штатно,
/// поэтому уровень debug.
pub fn report_transition_error(mind: Entity, error: TransitionError) {
    match error {
        TransitionError::NotAuthoritative => crate::log(&format!("Mind {:?}: {}", mind, error)),
        _ => crate::log_warning(&format!("Mind {:?}: {}", mind, error)),
    }
}

/// Точки входа для других систем (урон, скрипты, сценарии).
pub trait MindCommandsExt {
    fn set_mind_target(&mut self, mind: Entity, target: Option<Entity>);
    fn try_set_mind_state(&mut self, mind: Entity, state: Entity);
    fn try_end_mind_state(&mut self, mind: Entity);
}

impl MindCommandsExt for Commands<'_, '_> {
    fn set_mind_target(&mut self, mind: Entity, target: Option<Entity>) {
        self.queue(move |world: &mut World| {
            if let Err(error) = set_target(world, mind, target) {
                report_transition_error(mind, error);
            }
        });
    }

    fn try_set_mind_state(&mut self, mind: Entity, state: Entity) {
        self.queue(move |world: &mut World| {
            if let Err(error) = try_set_state(world, mind, state) {
                report_transition_error(mind, error);
            }
        });
    }

    fn try_end_mind_state(&mut self, mind: Entity) {
        self.queue(move |world: &mut World| {
            if let Err(error) = try_end_state(world, mind) {
                report_transition_error(mind, error);
            }
        });
    }
}
