//! MentalState: one selectable mode of a Mind (Idle / Alert / Fighting).
//!
//! Каждый state = модуль, привязанный к Mind entity. `think` только
//! *запрашивает* переход, выполняет его диспетчер Mind.

use bevy::prelude::*;

use crate::modules::{Module, ParentKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum MentalStateKind {
    #[default]
    Idle,
    Alert,
    Fighting,
}

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct MentalState {
    pub kind: MentalStateKind,
    /// Candidate for `Mind.default_state` (first registered wins)
    pub is_default: bool,
    /// Where `TryEnd` goes; `None` → the mind's default state
    pub next_state: Option<Entity>,
    /// Behavior selected while this state is active
    pub behavior: Option<Entity>,
    /// Секунд без контакта до завершения state
    pub patience: f32,
}

impl Default for MentalState {
    fn default() -> Self {
        Self::idle()
    }
}

impl MentalState {
    pub fn idle() -> Self {
        Self {
            kind: MentalStateKind::Idle,
            is_default: false,
            next_state: None,
            behavior: None,
            patience: 0.0,
        }
    }

    pub fn alert() -> Self {
        Self {
            kind: MentalStateKind::Alert,
            patience: 10.0,
            ..Self::idle()
        }
    }

    pub fn fighting() -> Self {
        Self {
            kind: MentalStateKind::Fighting,
            patience: 5.0,
            ..Self::idle()
        }
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn with_next(mut self, next_state: Entity) -> Self {
        self.next_state = Some(next_state);
        self
    }

    pub fn with_behavior(mut self, behavior: Entity) -> Self {
        self.behavior = Some(behavior);
        self
    }

    pub fn with_patience(mut self, patience: f32) -> Self {
        self.patience = patience.max(0.0);
        self
    }

    /// Per-tick decision for the active state.
    pub fn think(&self, ctx: &ThinkContext) -> StateRequest {
        if ctx.target_visible {
            if let Some(request) = self.on_target_seen() {
                return request;
            }
        }

        match self.kind {
            MentalStateKind::Idle => StateRequest::Stay,
            MentalStateKind::Alert | MentalStateKind::Fighting => {
                if ctx.time_without_sighting() >= self.patience {
                    StateRequest::End
                } else {
                    StateRequest::Stay
                }
            }
        }
    }

    /// Общий hook на обнаружение: всё ниже Fighting эскалирует.
    pub fn on_target_seen(&self) -> Option<StateRequest> {
        match self.kind {
            MentalStateKind::Idle | MentalStateKind::Alert => Some(StateRequest::Escalate),
            MentalStateKind::Fighting => None,
        }
    }
}

/// Mind-side facts a state thinks about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThinkContext {
    pub now: f32,
    pub entered_at: f32,
    pub target_visible: bool,
    pub last_seen_at: Option<f32>,
}

impl ThinkContext {
    /// Seconds since the target was last seen, counted from state entry at
    /// the earliest (a fresh state always gets its full patience).
    pub fn time_without_sighting(&self) -> f32 {
        let since = self
            .last_seen_at
            .map_or(self.entered_at, |seen| seen.max(self.entered_at));
        (self.now - since).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateRequest {
    Stay,
    /// `TryEnd`: next state, else default
    End,
    /// Switch to the mind's Fighting state
    Escalate,
}

/// MentalState bundle (binds to a Mind).
pub fn mental_state_module(state: MentalState) -> impl Bundle {
    (Module::new(ParentKind::Mind), state)
}
