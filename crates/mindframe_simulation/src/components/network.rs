//! Network ownership and simulate permission
//!
//! Транспорт внешний. Ядру нужно знать только:
//! - кто владеет entity/модулем (`NetworkOwner`)
//! - симулирует эта копия или зеркалит (`Proxy`)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Connection id (выдаёт транспорт)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub struct ConnectionId(pub u64);

/// Network owner of an entity or module.
///
/// `inherited == true` marks ownership copied from the module's parent on
/// bind. Inherited ownership is replaced on rebind; explicitly assigned
/// ownership never is.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct NetworkOwner {
    connection: Option<ConnectionId>,
    inherited: bool,
}

impl NetworkOwner {
    pub fn new(connection: ConnectionId) -> Self {
        Self {
            connection: Some(connection),
            inherited: false,
        }
    }

    pub fn connection(&self) -> Option<ConnectionId> {
        self.connection
    }

    pub fn is_inherited(&self) -> bool {
        self.inherited
    }

    /// Explicit assignment, wins over anything inherited later.
    pub fn assign(&mut self, connection: Option<ConnectionId>) {
        self.connection = connection;
        self.inherited = false;
    }

    /// Courtesy default from the parent; ignored when explicitly owned.
    pub fn inherit(&mut self, connection: Option<ConnectionId>) -> bool {
        if self.connection.is_some() && !self.inherited {
            return false;
        }
        if connection.is_none() {
            return false;
        }
        self.connection = connection;
        self.inherited = true;
        true
    }

    pub fn clear(&mut self) {
        self.connection = None;
        self.inherited = false;
    }
}

/// Non-authoritative replica marker.
///
/// Proxy получает состояние через репликацию и никогда не запускает
/// think/perform/navigation.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Proxy;

/// Simulate permission of the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {
    Authoritative,
    Proxy,
}

impl Authority {
    pub fn from_proxy(is_proxy: bool) -> Self {
        if is_proxy {
            Self::Proxy
        } else {
            Self::Authoritative
        }
    }

    pub fn can_simulate(&self) -> bool {
        matches!(self, Self::Authoritative)
    }
}

/// Authority of `entity`: a proxy anywhere up the hierarchy makes it a proxy.
pub fn authority_of(world: &World, entity: Entity) -> Authority {
    let mut current = Some(entity);
    while let Some(candidate) = current {
        if world.get::<Proxy>(candidate).is_some() {
            return Authority::Proxy;
        }
        current = world.get::<ChildOf>(candidate).map(ChildOf::parent);
    }
    Authority::Authoritative
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inherit_does_not_override_explicit_owner() {
        let mut owner = NetworkOwner::new(ConnectionId(7));

        assert!(!owner.inherit(Some(ConnectionId(1))));
        assert_eq!(owner.connection(), Some(ConnectionId(7)));
        assert!(!owner.is_inherited());
    }

    #[test]
    fn test_inherit_replaces_previous_inherited_owner() {
        let mut owner = NetworkOwner::default();

        assert!(owner.inherit(Some(ConnectionId(1))));
        assert!(owner.inherit(Some(ConnectionId(2))));
        assert_eq!(owner.connection(), Some(ConnectionId(2)));
        assert!(owner.is_inherited());

        owner.clear();
        assert_eq!(owner.connection(), None);
    }

    #[test]
    fn test_authority_can_simulate() {
        assert!(Authority::from_proxy(false).can_simulate());
        assert!(!Authority::from_proxy(true).can_simulate());
    }
}
