//! Movement components: velocity, movement speed

use bevy::prelude::*;

/// Current linear velocity (m/s), written by the controller.
///
/// Cognition reads it for aiming (face the direction of travel).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Velocity(pub Vec3);

/// Скорость движения агента (m/s)
///
/// Behaviors масштабируют wish-velocity на неё.
#[derive(Component, Clone, Copy, Debug, Reflect)]
#[reflect(Component)]
pub struct MovementSpeed {
    pub speed: f32,
}

impl Default for MovementSpeed {
    fn default() -> Self {
        Self { speed: 4.0 } // run speed
    }
}
