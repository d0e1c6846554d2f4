//! Headless character controller.
//!
//! Настоящий физический движок внешний. Эта замена превращает
//! wish-velocity от behaviors в velocity и позицию, чтобы симуляция
//! замыкала цикл без него.

pub mod movement;

pub use movement::{
    apply_movement_input, integrate_velocity, KinematicController, KinematicControllerPlugin,
    MovementInput,
};
