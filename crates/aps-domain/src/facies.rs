//! Facies: project-wide definitions, their scoped usages, and facies groups

use crate::error::{DomainError, Result};
use crate::id::{Entity, EntityId};
use crate::parent::{Parent, Scoped};

/// Validated facies code (a non-negative integer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FaciesCode(u32);

impl FaciesCode {
    /// Wrap a code known to be valid
    pub fn new(code: u32) -> Self {
        Self(code)
    }

    /// Validate a numeric code as found in host or persisted data
    ///
    /// # Examples
    ///
    /// ```
    /// use aps_domain::FaciesCode;
    ///
    /// assert_eq!(FaciesCode::from_number(3.0).unwrap().value(), 3);
    /// assert!(FaciesCode::from_number(-1.0).is_err());
    /// assert!(FaciesCode::from_number(1.5).is_err());
    /// ```
    pub fn from_number(code: f64) -> Result<Self> {
        if !code.is_finite() || code < 0.0 || code.fract() != 0.0 || code > u32::MAX as f64 {
            return Err(DomainError::Configuration(format!(
                "facies code must be a non-negative integer, got {}",
                code
            )));
        }
        Ok(Self(code as u32))
    }

    /// Get the raw code
    pub fn value(&self) -> u32 {
        self.0
    }
}

/// A zone/region pair (by code) in which a facies is observed in well data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Observation {
    /// Zone code
    pub zone: i32,
    /// Region code, when the zone is subdivided
    pub region: Option<i32>,
}

/// A project-wide facies definition
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalFacies {
    /// Unique identifier
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// Facies code
    pub code: FaciesCode,
    /// Display color
    pub color: String,
    /// Where the facies occurs naturally, when known
    pub observed: Option<Vec<Observation>>,
    alias: String,
}

impl GlobalFacies {
    /// Create a global facies
    ///
    /// # Errors
    /// Configuration error when `code` is not a non-negative integer or the
    /// name is empty
    pub fn new(name: impl Into<String>, code: f64, color: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::Configuration("facies name cannot be empty".to_string()));
        }
        Ok(Self {
            id: EntityId::new(),
            name,
            code: FaciesCode::from_number(code)?,
            color: color.into(),
            observed: None,
            alias: String::new(),
        })
    }

    /// Use a specific identifier
    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = id;
        self
    }

    /// Set an alias
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    /// Set the observation record
    pub fn with_observed(mut self, observed: Vec<Observation>) -> Self {
        self.observed = Some(observed);
        self
    }

    /// Alias, falling back to the name when unset
    pub fn alias(&self) -> &str {
        if self.alias.is_empty() {
            &self.name
        } else {
            &self.alias
        }
    }

    /// Alias as set, without the name fallback
    pub fn explicit_alias(&self) -> Option<&str> {
        (!self.alias.is_empty()).then_some(self.alias.as_str())
    }

    /// Whether well data reports this facies in the given zone/region
    pub fn is_observed_in(&self, zone: i32, region: Option<i32>) -> bool {
        self.observed.as_ref().is_some_and(|observed| {
            observed
                .iter()
                .any(|o| o.zone == zone && (region.is_none() || o.region == region))
        })
    }
}

impl Entity for GlobalFacies {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// A scoped usage of a global facies
#[derive(Debug, Clone, PartialEq)]
pub struct Facies {
    /// Unique identifier
    pub id: EntityId,
    /// Owning scope
    pub parent: Parent,
    /// The global facies this usage refers to
    pub global: EntityId,
    /// Name of the probability cube parameter in the host project
    pub probability_cube: Option<String>,
    preview_probability: Option<f64>,
}

impl Facies {
    /// Create a facies usage in `parent`
    pub fn new(parent: Parent, global: EntityId) -> Self {
        Self {
            id: EntityId::new(),
            parent,
            global,
            probability_cube: None,
            preview_probability: None,
        }
    }

    /// Use a specific identifier
    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = id;
        self
    }

    /// Set the probability cube
    pub fn with_probability_cube(mut self, cube: impl Into<String>) -> Self {
        self.probability_cube = Some(cube.into());
        self
    }

    /// Preview probability, if set
    pub fn preview_probability(&self) -> Option<f64> {
        self.preview_probability
    }

    /// Set or clear the preview probability
    ///
    /// # Errors
    /// Configuration error when outside `[0, 1]`
    pub fn set_preview_probability(&mut self, probability: Option<f64>) -> Result<()> {
        if let Some(p) = probability {
            if !(0.0..=1.0).contains(&p) {
                return Err(DomainError::Configuration(format!(
                    "preview probability must be in [0, 1], got {}",
                    p
                )));
            }
        }
        self.preview_probability = probability;
        Ok(())
    }
}

impl Entity for Facies {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Scoped for Facies {
    fn parent(&self) -> &Parent {
        &self.parent
    }
}

/// An unordered set of facies, used as the target of overlay polygons
///
/// A facies must not sit in two groups of the same scope; `aps-store`'s
/// project enforces that, not the group.
#[derive(Debug, Clone, PartialEq)]
pub struct FaciesGroup {
    /// Unique identifier
    pub id: EntityId,
    /// Owning scope
    pub parent: Parent,
    facies: Vec<EntityId>,
}

impl FaciesGroup {
    /// Create a group from the given facies (duplicates are dropped)
    pub fn new(parent: Parent, facies: impl IntoIterator<Item = EntityId>) -> Self {
        let mut group = Self {
            id: EntityId::new(),
            parent,
            facies: Vec::new(),
        };
        for id in facies {
            group.add(id);
        }
        group
    }

    /// Use a specific identifier
    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = id;
        self
    }

    /// Add a facies; returns false when already a member
    pub fn add(&mut self, facies: EntityId) -> bool {
        if self.contains(facies) {
            return false;
        }
        self.facies.push(facies);
        true
    }

    /// Remove a facies; returns false when not a member
    pub fn remove(&mut self, facies: EntityId) -> bool {
        let before = self.facies.len();
        self.facies.retain(|f| *f != facies);
        before != self.facies.len()
    }

    /// Membership test
    pub fn contains(&self, facies: EntityId) -> bool {
        self.facies.contains(&facies)
    }

    /// Members, in insertion order
    pub fn facies(&self) -> &[EntityId] {
        &self.facies
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.facies.len()
    }

    /// Whether the group has no members
    pub fn is_empty(&self) -> bool {
        self.facies.is_empty()
    }

    /// Whether the two groups share a facies
    pub fn overlaps(&self, other: &FaciesGroup) -> bool {
        self.facies.iter().any(|f| other.contains(*f))
    }
}

impl Entity for FaciesGroup {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Scoped for FaciesGroup {
    fn parent(&self) -> &Parent {
        &self.parent
    }
}
