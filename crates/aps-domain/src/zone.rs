//! Zones and regions, the spatial scopes of the model

use crate::error::{DomainError, Result};
use crate::id::{Entity, EntityId};
use crate::parent::Parent;

/// How a zone's grid layers relate to its bounding surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Conformity {
    /// Layers proportional between top and base
    #[default]
    Proportional,
    /// Layers follow the top surface
    TopConform,
    /// Layers follow the base surface
    BaseConform,
}

impl Conformity {
    /// Get the conformity name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Conformity::Proportional => "Proportional",
            Conformity::TopConform => "TopConform",
            Conformity::BaseConform => "BaseConform",
        }
    }

    /// Parse a conformity from its name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Proportional" => Some(Conformity::Proportional),
            "TopConform" => Some(Conformity::TopConform),
            "BaseConform" => Some(Conformity::BaseConform),
            _ => None,
        }
    }
}

impl std::str::FromStr for Conformity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
            .ok_or_else(|| DomainError::Configuration(format!("Invalid conformity: {}", s)))
    }
}

/// Selection state of a zone or region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection {
    /// Not selected
    Unselected,
    /// Some, but not all, regions selected
    Intermediate,
    /// Selected
    Selected,
}

impl From<bool> for Selection {
    fn from(selected: bool) -> Self {
        if selected {
            Selection::Selected
        } else {
            Selection::Unselected
        }
    }
}

fn validate_code(kind: &str, code: i32) -> Result<()> {
    if code < 0 {
        return Err(DomainError::Configuration(format!(
            "{} code must be non-negative, got {}",
            kind, code
        )));
    }
    Ok(())
}

/// A region nested within a zone
///
/// The zone owns its regions; `zone` is a back-reference only.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Unique identifier
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// Region code in the host grid
    pub code: i32,
    /// Whether the region is selected
    pub selected: bool,
    zone: EntityId,
}

impl Region {
    /// Create a region of the given zone
    pub fn new(zone: EntityId, name: impl Into<String>, code: i32) -> Result<Self> {
        validate_code("Region", code)?;
        Ok(Self {
            id: EntityId::new(),
            name: name.into(),
            code,
            selected: false,
            zone,
        })
    }

    /// Use a specific identifier
    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = id;
        self
    }

    /// Owning zone's id
    pub fn zone(&self) -> EntityId {
        self.zone
    }

    /// Scope for entities bound to this region
    pub fn scope(&self) -> Parent {
        Parent::region(self.zone, self.id)
    }
}

impl Entity for Region {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// A zone: a coded vertical interval, optionally subdivided into regions
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    /// Unique identifier
    pub id: EntityId,
    /// Display name
    pub name: String,
    /// Zone code in the host grid
    pub code: i32,
    /// Zone thickness
    pub thickness: f64,
    /// Layer conformity
    pub conformity: Conformity,
    selected: bool,
    regions: Vec<Region>,
}

impl Zone {
    /// Create a zone without regions
    pub fn new(name: impl Into<String>, code: i32, thickness: f64, conformity: Conformity) -> Result<Self> {
        validate_code("Zone", code)?;
        Ok(Self {
            id: EntityId::new(),
            name: name.into(),
            code,
            thickness,
            conformity,
            selected: false,
            regions: Vec::new(),
        })
    }

    /// Use a specific identifier
    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = id;
        for region in &mut self.regions {
            region.zone = id;
        }
        self
    }

    /// Create a region in this zone and return its id
    pub fn add_region(&mut self, name: impl Into<String>, code: i32) -> Result<EntityId> {
        let region = Region::new(self.id, name, code)?;
        let id = region.id;
        self.push_region(region)?;
        Ok(id)
    }

    /// Adopt an existing region
    ///
    /// # Errors
    /// Conflict when the region belongs to another zone or its id/code is taken
    pub fn push_region(&mut self, region: Region) -> Result<()> {
        if region.zone != self.id {
            return Err(DomainError::Conflict(format!(
                "region {} belongs to zone {}, not {}",
                region.id, region.zone, self.id
            )));
        }
        if self.regions.iter().any(|r| r.id == region.id || r.code == region.code) {
            return Err(DomainError::Conflict(format!(
                "zone {} already has a region with id {} or code {}",
                self.code, region.id, region.code
            )));
        }
        self.regions.push(region);
        Ok(())
    }

    /// Remove a region, returning it
    pub fn remove_region(&mut self, id: EntityId) -> Option<Region> {
        let index = self.regions.iter().position(|r| r.id == id)?;
        Some(self.regions.remove(index))
    }

    /// All regions, in insertion order
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Whether the zone is subdivided
    pub fn has_regions(&self) -> bool {
        !self.regions.is_empty()
    }

    /// Look up a region by id
    pub fn region(&self, id: EntityId) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    /// Look up a region by id, mutably
    pub fn region_mut(&mut self, id: EntityId) -> Option<&mut Region> {
        self.regions.iter_mut().find(|r| r.id == id)
    }

    /// Look up a region by code
    pub fn region_by_code(&self, code: i32) -> Option<&Region> {
        self.regions.iter().find(|r| r.code == code)
    }

    /// Selection state, synthesized from the regions when there are any
    pub fn selection(&self) -> Selection {
        if self.regions.is_empty() {
            return self.selected.into();
        }
        let selected = self.regions.iter().filter(|r| r.selected).count();
        if selected == self.regions.len() {
            Selection::Selected
        } else if selected > 0 {
            Selection::Intermediate
        } else {
            Selection::Unselected
        }
    }

    /// Select or deselect the zone, and all of its regions
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
        for region in &mut self.regions {
            region.selected = selected;
        }
    }

    /// Scope covering the whole zone
    pub fn scope(&self) -> Parent {
        Parent::zone(self.id)
    }

    /// Scopes that entities of this zone live in: the zone itself when it
    /// has no regions, otherwise one per region
    pub fn scopes(&self) -> Vec<Parent> {
        if self.regions.is_empty() {
            vec![self.scope()]
        } else {
            self.regions.iter().map(Region::scope).collect()
        }
    }

    /// Whether `scope` names this zone or one of its regions
    pub fn owns_scope(&self, scope: &Parent) -> bool {
        scope.zone == self.id
            && scope.region.map_or(true, |region| self.region(region).is_some())
    }
}

impl Entity for Zone {
    fn id(&self) -> EntityId {
        self.id
    }
}
