//! Typed module discovery: `GetModules<T>` / `GetModule<T>` / `TryGetModule<T>`.
//!
//! Видны только привязанные модули: поиск идёт через реестр хоста,
//! модуль без parent никогда не попадёт в выдачу.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::registry::{Module, ModuleError, ModuleHost};

/// System param for read-only discovery of `T` modules on a host.
#[derive(SystemParam)]
pub struct Modules<'w, 's, T: Component> {
    hosts: Query<'w, 's, &'static ModuleHost>,
    modules: Query<'w, 's, &'static T, With<Module>>,
}

impl<'w, 's, T: Component> Modules<'w, 's, T> {
    pub fn get_modules(&self, host: Entity) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.hosts
            .get(host)
            .ok()
            .into_iter()
            .flat_map(|registry| registry.modules().iter())
            .filter_map(|&module| self.modules.get(module).ok().map(|found| (module, found)))
    }

    pub fn get_module(&self, host: Entity) -> Option<(Entity, &T)> {
        self.get_modules(host).next()
    }

    pub fn try_get_module(&self, host: Entity) -> Result<(Entity, &T), ModuleError> {
        self.get_module(host)
            .ok_or(ModuleError::MissingModule { host })
    }
}

/// Snapshot of every bound `T` module on `host`, in registration order.
pub fn get_modules<T: Component>(world: &World, host: Entity) -> Vec<Entity> {
    let Some(registry) = world.get::<ModuleHost>(host) else {
        return Vec::new();
    };

    registry
        .modules()
        .iter()
        .copied()
        .filter(|&module| world.get::<T>(module).is_some() && world.get::<Module>(module).is_some())
        .collect()
}

pub fn get_module<T: Component>(world: &World, host: Entity) -> Option<Entity> {
    get_modules::<T>(world, host).into_iter().next()
}

pub fn try_get_module<T: Component>(world: &World, host: Entity) -> Result<Entity, ModuleError> {
    get_module::<T>(world, host).ok_or(ModuleError::MissingModule { host })
}
