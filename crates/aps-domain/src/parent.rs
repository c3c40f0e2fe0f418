//! Parent scope: the zone, and optionally the region, an entity belongs to

use crate::error::{DomainError, Result};
use crate::id::{Entity, EntityId};
use std::fmt;

/// Owning scope of a zone/region dependent entity
///
/// Equality is structural: two scopes are equal iff their zone ids match
/// and their region ids match (both absent, or both equal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Parent {
    /// Owning zone
    pub zone: EntityId,
    /// Owning region within the zone, if any
    pub region: Option<EntityId>,
}

impl Parent {
    /// Scope covering a whole zone
    pub fn zone(zone: EntityId) -> Self {
        Self { zone, region: None }
    }

    /// Scope covering one region of a zone
    pub fn region(zone: EntityId, region: EntityId) -> Self {
        Self {
            zone,
            region: Some(region),
        }
    }

    /// Build a scope from optional parts, as found in configuration objects
    ///
    /// # Errors
    /// Returns a configuration error when the zone is missing
    pub fn from_parts(zone: Option<EntityId>, region: Option<EntityId>) -> Result<Self> {
        let zone = zone.ok_or_else(|| {
            DomainError::Configuration("a scoped entity requires a zone".to_string())
        })?;
        Ok(Self { zone, region })
    }

    /// Deterministic lookup key for this scope
    ///
    /// # Examples
    ///
    /// ```
    /// use aps_domain::{EntityId, Parent};
    ///
    /// let zone = EntityId::new();
    /// assert_eq!(Parent::zone(zone).key().as_str(), zone.to_string());
    /// ```
    pub fn key(&self) -> ParentKey {
        match self.region {
            None => ParentKey(self.zone.to_string()),
            Some(region) => ParentKey(format!("{}/{}", self.zone, region)),
        }
    }

    /// Whether this scope names a whole zone
    pub fn is_zone_scope(&self) -> bool {
        self.region.is_none()
    }

    /// Whether `other` lies within this scope (same scope, or a region of this zone)
    pub fn contains(&self, other: &Parent) -> bool {
        match self.region {
            None => self.zone == other.zone,
            Some(_) => self == other,
        }
    }
}

impl fmt::Display for Parent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Map key derived from a [`Parent`]
///
/// Only a key, never an identity: clones with fresh ids but the same scope
/// resolve to the same key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParentKey(String);

impl ParentKey {
    /// Get the key as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An entity bound to a zone/region scope
pub trait Scoped: Entity {
    /// The entity's owning scope
    fn parent(&self) -> &Parent;

    /// Whether the entity's scope structurally matches `scope`
    fn is_child_of(&self, scope: &Parent) -> bool {
        self.parent() == scope
    }

    /// Lookup key of the owning scope
    fn parent_key(&self) -> ParentKey {
        self.parent().key()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    struct Sample {
        id: EntityId,
        parent: Parent,
    }

    impl Entity for Sample {
        fn id(&self) -> EntityId {
            self.id
        }
    }

    impl Scoped for Sample {
        fn parent(&self) -> &Parent {
            &self.parent
        }
    }

    fn scope(zone: u128, region: Option<u128>) -> Parent {
        Parent {
            zone: EntityId::from_value(zone),
            region: region.map(EntityId::from_value),
        }
    }

    proptest! {
        /// Property: an entity is a child of its own scope and of no scope in another zone
        #[test]
        fn test_is_child_of_own_scope(zone: u128, other: u128, region: Option<u128>) {
            prop_assume!(zone != other);
            let sample = Sample { id: EntityId::new(), parent: scope(zone, region) };

            prop_assert!(sample.is_child_of(&scope(zone, region)));
            prop_assert!(!sample.is_child_of(&scope(other, region)));
        }

        /// Property: the key depends only on the scope, not on the entity
        #[test]
        fn test_key_is_pure(zone: u128, region: Option<u128>) {
            let a = Sample { id: EntityId::new(), parent: scope(zone, region) };
            let b = Sample { id: EntityId::new(), parent: scope(zone, region) };

            prop_assert_eq!(a.parent_key(), b.parent_key());
        }
    }
}
