//! Entity identity

use crate::error::{DomainError, Result};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier carried by every entity in the model
///
/// New identifiers are UUIDv7, so ids minted in sequence sort by creation
/// time. Any RFC 9562 UUID is accepted when parsing persisted data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Generate a fresh identifier
    ///
    /// # Examples
    ///
    /// ```
    /// use aps_domain::EntityId;
    ///
    /// let a = EntityId::new();
    /// let b = EntityId::new();
    /// assert_ne!(a, b);
    /// ```
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wrap a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// Parse an identifier from its string form
    ///
    /// # Examples
    ///
    /// ```
    /// use aps_domain::EntityId;
    ///
    /// let id = EntityId::new();
    /// let parsed = EntityId::parse(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// assert!(EntityId::parse("zone-1").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| DomainError::Identity(format!("'{}' is not a valid UUID: {}", s, e)))
    }

    /// Parse the given id, or mint a new one when absent
    pub fn parse_or_new(s: Option<&str>) -> Result<Self> {
        match s {
            Some(s) => Self::parse(s),
            None => Ok(Self::new()),
        }
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0.as_u128()
    }

    /// Borrow the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for EntityId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Anything with a stable identity
pub trait Entity {
    /// The entity's identifier
    fn id(&self) -> EntityId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_ordering() {
        let id1 = EntityId::from_value(1000);
        let id2 = EntityId::from_value(2000);

        assert!(id1 < id2);
    }

    #[test]
    fn test_id_chronological() {
        let id1 = EntityId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = EntityId::new();

        assert!(id1 < id2, "Earlier UUIDv7 should sort before later UUIDv7");
    }

    #[test]
    fn test_id_display_and_parse() {
        let id = EntityId::new();
        let id_str = id.to_string();

        assert_eq!(id_str.len(), 36);
        assert_eq!(EntityId::parse(&id_str).unwrap(), id);
        assert_eq!(id_str.parse::<EntityId>().unwrap(), id);
    }

    #[test]
    fn test_invalid_id_is_identity_error() {
        match EntityId::parse("not-a-uuid") {
            Err(DomainError::Identity(msg)) => assert!(msg.contains("not-a-uuid")),
            other => panic!("Expected Identity error, got {:?}", other),
        }
        assert!(EntityId::parse("").is_err());
    }

    #[test]
    fn test_parse_or_new() {
        let id = EntityId::new();
        assert_eq!(EntityId::parse_or_new(Some(&id.to_string())).unwrap(), id);
        assert!(EntityId::parse_or_new(None).is_ok());
        assert!(EntityId::parse_or_new(Some("bogus")).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: id ordering matches u128 ordering
        #[test]
        fn test_id_ordering_property(a: u128, b: u128) {
            let id_a = EntityId::from_value(a);
            let id_b = EntityId::from_value(b);

            prop_assert_eq!(id_a < id_b, a < b);
            prop_assert_eq!(id_a == id_b, a == b);
        }

        /// Property: string form round-trips
        #[test]
        fn test_id_string_roundtrip(value: u128) {
            let id = EntityId::from_value(value);
            let parsed = EntityId::parse(&id.to_string());
            prop_assert_eq!(parsed, Ok(id));
        }
    }
}
