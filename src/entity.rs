//! Entities and reserved unknown references.
//!
//! An entity is an opaque, named reference that facts attach to. Three
//! reserved entities mirror the non-`Known` epistemic states at the
//! argument level: a rule invoked with an `unstated` entity argument
//! short-circuits to an unstated result without running its body.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::Knowledge;

const UNSTATED_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001);
const UNCERTAIN_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0002);
const STUB_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0003);

/// Stable entity identifier.
///
/// Once created, an `EntityId` never changes; it is the anchor that fact
/// arguments and set memberships reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Creates a new random entity ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an entity ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Returns true for one of the three reserved unknown IDs.
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        self.knowledge().is_some()
    }

    /// The epistemic state a reserved ID stands for, if any.
    #[must_use]
    pub fn knowledge(&self) -> Option<Knowledge> {
        match self.0 {
            UNSTATED_ID => Some(Knowledge::Unstated),
            UNCERTAIN_ID => Some(Knowledge::Uncertain),
            STUB_ID => Some(Knowledge::Stub),
            _ => None,
        }
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named reference that facts and sets attach to.
///
/// Equality and hashing are by ID only; the name is the human-readable
/// identifier the registry deduplicates on.
///
/// # Examples
///
/// ```
/// use themis::Entity;
///
/// let jane = Entity::new("Jane");
/// assert_eq!(jane.name, "Jane");
/// assert!(!jane.is_unknown());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identifier.
    pub id: EntityId,
    /// Human-readable identifier; unique within a session registry.
    pub name: String,
}

impl Entity {
    /// Creates a new entity with a fresh ID.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
        }
    }

    /// The reserved entity standing for an unstated argument.
    #[must_use]
    pub fn unstated() -> Self {
        Self {
            id: EntityId::from_uuid(UNSTATED_ID),
            name: "Unstated".to_string(),
        }
    }

    /// The reserved entity standing for an uncertain argument.
    #[must_use]
    pub fn uncertain() -> Self {
        Self {
            id: EntityId::from_uuid(UNCERTAIN_ID),
            name: "Uncertain".to_string(),
        }
    }

    /// The reserved entity standing for a stubbed argument.
    #[must_use]
    pub fn stub() -> Self {
        Self {
            id: EntityId::from_uuid(STUB_ID),
            name: "Stub".to_string(),
        }
    }

    /// Returns true if this is one of the three reserved entities.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.id.is_reserved()
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Entity {}

impl std::hash::Hash for Entity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ids_are_unique() {
        assert_ne!(EntityId::new(), EntityId::new());
    }

    #[test]
    fn test_reserved_entities_map_to_states() {
        assert_eq!(Entity::unstated().id.knowledge(), Some(Knowledge::Unstated));
        assert_eq!(Entity::uncertain().id.knowledge(), Some(Knowledge::Uncertain));
        assert_eq!(Entity::stub().id.knowledge(), Some(Knowledge::Stub));
        assert!(Entity::unstated().is_unknown());
    }

    #[test]
    fn test_ordinary_entity_is_not_reserved() {
        let e = Entity::new("Jane");
        assert!(!e.is_unknown());
        assert_eq!(e.id.knowledge(), None);
    }

    #[test]
    fn test_equality_is_by_id() {
        let a = Entity::new("same-name");
        let b = Entity::new("same-name");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_reserved_entities_are_stable() {
        assert_eq!(Entity::unstated(), Entity::unstated());
        assert_eq!(format!("{}", Entity::stub()), "Stub");
    }
}
