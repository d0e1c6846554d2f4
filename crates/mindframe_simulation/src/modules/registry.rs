//! Module binding protocol.
//!
//! Модуль = entity с компонентом `Module`. Привязывается к ближайшему
//! `ChildOf` предку, чей `ModuleHost` он принимает. Привязка двусторонняя:
//! `Module.parent` и `ModuleHost.modules` пишутся только вместе и только
//! здесь, поэтому остаются биекцией.

use bevy::prelude::*;
use thiserror::Error;

use crate::components::NetworkOwner;

/// Виды хостов для привязки (capability tag вместо runtime type checks)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum ParentKind {
    #[default]
    Agent,
    Vehicle,
    Mind,
}

/// Per-entity module registry.
///
/// Порядок = порядок регистрации (детерминистичная итерация для discovery).
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct ModuleHost {
    kind: ParentKind,
    modules: Vec<Entity>,
}

impl ModuleHost {
    pub fn new(kind: ParentKind) -> Self {
        Self {
            kind,
            modules: Vec::new(),
        }
    }

    pub fn kind(&self) -> ParentKind {
        self.kind
    }

    pub fn modules(&self) -> &[Entity] {
        &self.modules
    }

    pub fn contains(&self, module: Entity) -> bool {
        self.modules.contains(&module)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub(crate) fn insert(&mut self, module: Entity) -> bool {
        if self.contains(module) {
            return false;
        }
        self.modules.push(module);
        true
    }

    pub(crate) fn remove(&mut self, module: Entity) -> bool {
        let before = self.modules.len();
        self.modules.retain(|&m| m != module);
        before != self.modules.len()
    }
}

/// A bindable unit of behavior.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Module {
    accepts: ParentKind,
    parent: Option<Entity>,
    enabled: bool,
}

impl Default for Module {
    fn default() -> Self {
        Self::new(ParentKind::Agent)
    }
}

impl Module {
    pub fn new(accepts: ParentKind) -> Self {
        Self {
            accepts,
            parent: None,
            enabled: true,
        }
    }

    /// Spawned disabled: will not bind until `set_module_enabled(.., true)`.
    pub fn disabled(accepts: ParentKind) -> Self {
        Self {
            enabled: false,
            ..Self::new(accepts)
        }
    }

    pub fn accepts(&self) -> ParentKind {
        self.accepts
    }

    pub fn parent(&self) -> Option<Entity> {
        self.parent
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_eligible_parent(&self, host: &ModuleHost) -> bool {
        host.kind() == self.accepts
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ModuleError {
    #[error("entity {0:?} is not a module")]
    NotAModule(Entity),
    #[error("module {0:?} is disabled")]
    Disabled(Entity),
    #[error("no {kind:?} ancestor found for module {module:?}")]
    NoEligibleParent { module: Entity, kind: ParentKind },
    #[error("host {host:?} has no such module")]
    MissingModule { host: Entity },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// Newly bound (possibly after leaving another parent)
    Registered { parent: Entity },
    /// Уже привязан к ближайшему подходящему parent, ничего не поменялось
    Unchanged { parent: Entity },
}

impl RegisterOutcome {
    pub fn parent(&self) -> Entity {
        match self {
            Self::Registered { parent } | Self::Unchanged { parent } => *parent,
        }
    }
}

/// Module-side `OnRegistered` hook
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleRegistered {
    pub module: Entity,
    pub parent: Entity,
}

/// Module-side `OnRemoved` hook
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleRemoved {
    pub module: Entity,
    pub parent: Entity,
}

/// Registration-failure hook (module left orphaned, ownership revoked)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleRegistrationFailed {
    pub module: Entity,
    pub accepts: ParentKind,
}

/// Ближайший строгий предок `module`, которого модуль принимает как parent.
pub fn find_eligible_parent(world: &World, module: Entity) -> Option<Entity> {
    let accepts = world.get::<Module>(module)?;
    let mut current = world.get::<ChildOf>(module).map(ChildOf::parent);

    while let Some(candidate) = current {
        if let Some(host) = world.get::<ModuleHost>(candidate) {
            if accepts.is_eligible_parent(host) {
                return Some(candidate);
            }
        }
        current = world.get::<ChildOf>(candidate).map(ChildOf::parent);
    }

    None
}

/// `TryRegister`: bind `module` to its nearest eligible ancestor.
pub fn try_register(world: &mut World, module: Entity) -> Result<RegisterOutcome, ModuleError> {
    let (accepts, enabled, current) = {
        let state = world
            .get::<Module>(module)
            .ok_or(ModuleError::NotAModule(module))?;
        (state.accepts, state.enabled, state.parent)
    };

    if !enabled {
        return Err(ModuleError::Disabled(module));
    }

    let Some(parent) = find_eligible_parent(world, module) else {
        remove(world, module);
        registration_failed(world, module, accepts);
        return Err(ModuleError::NoEligibleParent {
            module,
            kind: accepts,
        });
    };

    if current == Some(parent) && host_contains(world, parent, module) {
        return Ok(RegisterOutcome::Unchanged { parent });
    }

    // Rebind: сначала уходим от старого parent
    if current.is_some() {
        remove(world, module);
    }

    match world.get_mut::<ModuleHost>(parent) {
        Some(mut host) => {
            host.insert(module);
        }
        None => {
            return Err(ModuleError::NoEligibleParent {
                module,
                kind: accepts,
            })
        }
    }

    if let Some(mut state) = world.get_mut::<Module>(module) {
        state.parent = Some(parent);
    }

    inherit_owner(world, module, parent);

    world.send_event(ModuleRegistered { module, parent });
    crate::log(&format!(
        "🔗 Module {:?} bound to {:?} ({:?})",
        module, parent, accepts
    ));

    Ok(RegisterOutcome::Registered { parent })
}

/// `Remove`: unbind `module` from its parent. Returns the former parent.
pub fn remove(world: &mut World, module: Entity) -> Option<Entity> {
    let parent = world.get::<Module>(module)?.parent?;

    if let Some(mut host) = world.get_mut::<ModuleHost>(parent) {
        host.remove(module);
    }
    if let Some(mut state) = world.get_mut::<Module>(module) {
        state.parent = None;
    }

    world.send_event(ModuleRemoved { module, parent });
    crate::log(&format!("✂️ Module {:?} removed from {:?}", module, parent));

    Some(parent)
}

/// Enable → register, disable → remove.
pub fn set_module_enabled(
    world: &mut World,
    module: Entity,
    enabled: bool,
) -> Result<Option<RegisterOutcome>, ModuleError> {
    {
        let mut state = world
            .get_mut::<Module>(module)
            .ok_or(ModuleError::NotAModule(module))?;

        if state.enabled != enabled {
            state.enabled = enabled;
        }
    }

    if enabled {
        try_register(world, module).map(Some)
    } else {
        remove(world, module);
        Ok(None)
    }
}

/// Очистка со стороны хоста: убрать висячую запись (модуль деспавнен или
/// привязан в другом месте), не трогая entity модуля.
pub(crate) fn forget_module(world: &mut World, host: Entity, module: Entity) {
    let removed = world
        .get_mut::<ModuleHost>(host)
        .is_some_and(|mut registry| registry.remove(module));

    if removed {
        world.send_event(ModuleRemoved {
            module,
            parent: host,
        });
    }
}

fn host_contains(world: &World, host: Entity, module: Entity) -> bool {
    world
        .get::<ModuleHost>(host)
        .is_some_and(|registry| registry.contains(module))
}

fn inherit_owner(world: &mut World, module: Entity, parent: Entity) {
    let parent_owner = world.get::<NetworkOwner>(parent).and_then(NetworkOwner::connection);
    if parent_owner.is_none() {
        return;
    }

    match world.get_mut::<NetworkOwner>(module) {
        Some(mut owner) => {
            owner.inherit(parent_owner);
        }
        None => {
            let mut owner = NetworkOwner::default();
            owner.inherit(parent_owner);
            world.entity_mut(module).insert(owner);
        }
    }
}

fn registration_failed(world: &mut World, module: Entity, accepts: ParentKind) {
    // Сирота не должен сохранять authority, полученную от прошлого parent
    if let Some(mut owner) = world.get_mut::<NetworkOwner>(module) {
        if owner.connection().is_some() {
            owner.clear();
        }
    }

    world.send_event(ModuleRegistrationFailed { module, accepts });
    crate::log_warning(&format!(
        "Module {:?}: no {:?} ancestor, staying unbound",
        module, accepts
    ));
}
