//! Binding triggers.
//!
//! Граф сцены меняется когда угодно, привязка никогда не считается
//! вечной. `try_register` перезапускают два триггера:
//! - модуль или его предок получает/теряет/меняет `ChildOf`
//! - флаг `enabled` переключился (или модуль только заспавнен)

use bevy::prelude::*;

use super::registry::{forget_module, remove, try_register, Module, ModuleHost};

/// System: re-evaluate bindings after hierarchy or enablement changes.
///
/// Registration itself is queued as world commands (applied before the next
/// chained set), one per affected module, in entity order.
pub fn rebind_modules(
    mut commands: Commands,
    reparented: Query<Entity, Changed<ChildOf>>,
    mut detached: RemovedComponents<ChildOf>,
    toggled: Query<(Entity, &Module), Changed<Module>>,
    modules: Query<(), With<Module>>,
    children: Query<&Children>,
) {
    let mut pending: Vec<Entity> = Vec::new();

    // Структурные изменения: перемещённая entity + всё поддерево
    let roots: Vec<Entity> = reparented.iter().chain(detached.read()).collect();
    for root in roots {
        let mut stack = vec![root];
        while let Some(entity) = stack.pop() {
            if modules.contains(entity) {
                pending.push(entity);
            }
            if let Ok(kids) = children.get(entity) {
                stack.extend(kids.iter());
            }
        }
    }

    // Изменения enabled (покрывает и свежие модули)
    for (entity, module) in &toggled {
        if module.is_enabled() != module.parent().is_some() {
            pending.push(entity);
        }
    }

    pending.sort();
    pending.dedup();

    for module in pending {
        commands.queue(move |world: &mut World| sync_binding(world, module));
    }
}

/// System: drop host entries for modules that were despawned or are bound
/// elsewhere.
pub fn prune_module_registrations(
    mut commands: Commands,
    hosts: Query<(Entity, &ModuleHost)>,
    modules: Query<&Module>,
) {
    for (host, registry) in &hosts {
        for &module in registry.modules() {
            let bound_here = modules
                .get(module)
                .is_ok_and(|state| state.parent() == Some(host));

            if !bound_here {
                commands.queue(move |world: &mut World| forget_module(world, host, module));
            }
        }
    }
}

/// System: unbind modules whose parent lost its registry, then retry.
pub fn release_orphaned_modules(
    mut commands: Commands,
    hosts: Query<(), With<ModuleHost>>,
    modules: Query<(Entity, &Module)>,
) {
    for (entity, state) in &modules {
        let Some(parent) = state.parent() else {
            continue;
        };
        if hosts.contains(parent) {
            continue;
        }

        commands.queue(move |world: &mut World| {
            remove(world, entity);
            let _ = try_register(world, entity);
        });
    }
}

/// Bring one module's binding in line with its enabled flag and ancestry.
pub fn sync_binding(world: &mut World, module: Entity) {
    let Some(enabled) = world.get::<Module>(module).map(Module::is_enabled) else {
        return;
    };

    if enabled {
        // Ошибка не фатальна: лог + hook внутри try_register
        let _ = try_register(world, module);
    } else {
        remove(world, module);
    }
}
