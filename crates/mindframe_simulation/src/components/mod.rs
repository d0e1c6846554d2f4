//! ECS компоненты для simulation entities
//!
//! Capabilities = обычные компоненты вместо иерархий типов:
//! - actor: agents and vehicles, team membership
//! - transform: validated Transform mutation (TransformExt)
//! - movement: velocity, movement speed
//! - network: ownership, proxy replicas, simulate permission
//! - equipment: ideal engagement range of the held equipment

pub mod actor;
pub mod equipment;
pub mod movement;
pub mod network;
pub mod transform;

#[cfg(test)]
mod transform_tests;

pub use actor::*;
pub use equipment::*;
pub use movement::*;
pub use network::*;
pub use transform::*;
