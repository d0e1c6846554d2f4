//! Navigation module + pluggable path service.
//!
//! Pathfinding внешний: ядру нужен только путь и запрос "ближайшая
//! проходимая точка". `OpenGround` = headless default (прямые линии,
//! опциональные прямоугольные границы).

use bevy::prelude::*;

use crate::ai::behavior::flat;
use crate::modules::{Module, ParentKind};

pub trait NavigationService: Send + Sync + 'static {
    /// Waypoints from `start` to `target` (start excluded).
    fn calculate_path(&self, start: Vec3, target: Vec3) -> Vec<Vec3>;
    /// Closest walkable point to `point`.
    fn closest_point(&self, point: Vec3) -> Vec3;
}

/// Obstacle-free plane, optionally bounded on XZ.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OpenGround {
    pub bounds: Option<(Vec2, Vec2)>,
}

impl OpenGround {
    pub fn bounded(min: Vec2, max: Vec2) -> Self {
        Self {
            bounds: Some((min.min(max), min.max(max))),
        }
    }
}

impl NavigationService for OpenGround {
    fn calculate_path(&self, _start: Vec3, target: Vec3) -> Vec<Vec3> {
        vec![self.closest_point(target)]
    }

    fn closest_point(&self, point: Vec3) -> Vec3 {
        match self.bounds {
            Some((min, max)) => Vec3::new(
                point.x.max(min.x).min(max.x),
                point.y,
                point.z.max(min.y).min(max.y),
            ),
            None => point,
        }
    }
}

/// Active navigation backend
#[derive(Resource)]
pub struct NavigationServer {
    service: Box<dyn NavigationService>,
}

impl NavigationServer {
    pub fn new(service: impl NavigationService) -> Self {
        Self {
            service: Box::new(service),
        }
    }

    pub fn service(&self) -> &dyn NavigationService {
        self.service.as_ref()
    }
}

impl Default for NavigationServer {
    fn default() -> Self {
        Self::new(OpenGround::default())
    }
}

/// Навигационный модуль агента. Храним только первый waypoint пути
/// (путь всё равно пересчитывается каждый тик).
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Navigation {
    destination: Option<Vec3>,
    next_waypoint: Option<Vec3>,
    /// Ближе этой дистанции цель считается достигнутой (m)
    pub arrive_distance: f32,
}

impl Default for Navigation {
    fn default() -> Self {
        Self {
            destination: None,
            next_waypoint: None,
            arrive_distance: 0.25,
        }
    }
}

impl Navigation {
    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    pub fn next_waypoint(&self) -> Option<Vec3> {
        self.next_waypoint
    }

    /// `MoveTo`. Returns the waypoint to steer at, `None` when already there.
    pub fn move_to(&mut self, service: &dyn NavigationService, from: Vec3, target: Vec3) -> Option<Vec3> {
        let target = service.closest_point(target);
        if !target.is_finite() || flat(target - from).length() <= self.arrive_distance {
            self.stop();
            return None;
        }

        self.destination = Some(target);
        self.next_waypoint = service
            .calculate_path(from, target)
            .into_iter()
            .find(|waypoint| flat(*waypoint - from).length() > self.arrive_distance);
        self.next_waypoint
    }

    pub fn stop(&mut self) {
        self.destination = None;
        self.next_waypoint = None;
    }

    pub fn closest_point(&self, service: &dyn NavigationService, point: Vec3) -> Vec3 {
        service.closest_point(point)
    }

    /// Horizontal wish-velocity toward the next waypoint.
    pub fn wish_velocity(&self, from: Vec3, speed: f32) -> Vec3 {
        self.next_waypoint
            .map(|waypoint| flat(waypoint - from).normalize_or_zero() * speed)
            .unwrap_or(Vec3::ZERO)
    }
}

/// Navigation bundle (binds to an agent).
pub fn navigation_module() -> impl Bundle {
    (Module::new(ParentKind::Agent), Navigation::default())
}
