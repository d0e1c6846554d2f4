//! Module composition: bindable behavior units and their per-entity registry.
//!
//! - registry: `Module`, `ModuleHost`, TryRegister/Remove protocol, hooks
//! - discovery: `Modules<T>` system param + world-level lookups
//! - systems: binding triggers (hierarchy / enablement) and cleanup

use bevy::prelude::*;

pub mod discovery;
pub mod registry;
pub mod systems;


pub use discovery::{get_module, get_modules, try_get_module, Modules};
pub use registry::{
    find_eligible_parent, remove, set_module_enabled, try_register, Module, ModuleError,
    ModuleHost, ModuleRegistered, ModuleRegistrationFailed, ModuleRemoved, ParentKind,
    RegisterOutcome,
};
pub use systems::{prune_module_registrations, rebind_modules, release_orphaned_modules};

use crate::SimulationSet;

/// Module Plugin
///
/// Order inside `SimulationSet::Modules`:
/// 1. prune_module_registrations — висячие записи хоста
/// 2. release_orphaned_modules — модули, чей хост исчез
/// 3. rebind_modules — триггеры иерархии/enablement
pub struct ModulePlugin;

impl Plugin for ModulePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ModuleRegistered>()
            .add_event::<ModuleRemoved>()
            .add_event::<ModuleRegistrationFailed>();

        app.add_systems(
            FixedUpdate,
            (
                prune_module_registrations,
                release_orphaned_modules,
                rebind_modules,
            )
                .chain()
                .in_set(SimulationSet::Modules),
        );
    }
}
