//! Bayfill truncation rule: five fixed facies roles over three fields

use std::collections::HashSet;

use crate::error::{DomainError, Result};
use crate::fmu::FmuUpdatable;
use crate::id::EntityId;
use crate::parent::Parent;
use crate::polygon::{BayfillPolygon, BayfillRole, Polygon};
use crate::rule::constraint::{Constraint, RuleStatus};
use crate::rule::RuleBase;

/// Number of polygons in a complete bayfill rule
pub const POLYGONS: usize = 5;

/// Number of background fields
pub const BACKGROUND_FIELDS: usize = 3;

/// Roles whose slant factors make up the exported specification
const SPECIFICATION_ROLES: [BayfillRole; 3] = [
    BayfillRole::Floodplain,
    BayfillRole::Subbay,
    BayfillRole::BayheadDelta,
];

const CONSTRAINTS: &[Constraint<BayfillRule>] = &[
    Constraint::new("has exactly 5 bayfill polygons", BayfillRule::has_all_polygons),
    Constraint::new("every bayfill role appears exactly once", BayfillRule::has_distinct_roles),
    Constraint::new("all 5 polygons reference distinct facies", BayfillRule::has_distinct_facies),
    Constraint::new(
        "exactly 3 distinct background fields are assigned",
        BayfillRule::has_background_fields,
    ),
    Constraint::new("slant roles carry a slant factor", BayfillRule::has_slant_factors),
];

/// One entry of the exported bayfill specification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlantFactor {
    /// Exported name (`SF`, `YSF` or `SBHD`)
    pub name: &'static str,
    /// The factor
    pub factor: FmuUpdatable,
}

/// Bayfill rule
#[derive(Debug, Clone, PartialEq)]
pub struct BayfillRule {
    /// Shared state
    pub base: RuleBase,
}

impl BayfillRule {
    /// Create an empty bayfill rule
    pub fn new(parent: Parent, name: impl Into<String>) -> Self {
        Self {
            base: RuleBase::new(parent, name, BACKGROUND_FIELDS),
        }
    }

    /// Use a specific identifier
    pub fn with_id(mut self, id: EntityId) -> Self {
        self.base.id = id;
        self
    }

    /// Add a polygon for a role not yet present
    ///
    /// # Errors
    /// Conflict when the role is already taken
    pub fn add_polygon(&mut self, polygon: BayfillPolygon) -> Result<EntityId> {
        if self.polygon_for(polygon.role).is_some() {
            return Err(DomainError::Conflict(format!(
                "bayfill rule '{}' already has a '{}' polygon",
                self.base.name,
                polygon.role.as_str()
            )));
        }
        Ok(self.base.insert_polygon(polygon))
    }

    /// Bayfill polygons, in polygon order
    pub fn bayfill_polygons(&self) -> impl Iterator<Item = &BayfillPolygon> {
        self.base
            .ordered_polygons()
            .into_iter()
            .filter_map(Polygon::as_bayfill)
    }

    /// The polygon playing `role`
    pub fn polygon_for(&self, role: BayfillRole) -> Option<&BayfillPolygon> {
        self.bayfill_polygons().find(|p| p.role == role)
    }

    /// Slant factors of the three slant roles, in role order
    ///
    /// # Errors
    /// Configuration error when a slant role has no polygon or no factor
    pub fn specification(&self) -> Result<Vec<SlantFactor>> {
        SPECIFICATION_ROLES
            .iter()
            .map(|role| {
                let factor = self
                    .polygon_for(*role)
                    .and_then(|p| p.slant_factor)
                    .ok_or_else(|| {
                        DomainError::Configuration(format!(
                            "bayfill rule '{}' has no slant factor for '{}'",
                            self.base.name,
                            role.as_str()
                        ))
                    })?;
                Ok(SlantFactor {
                    name: role.slant_factor_name().unwrap_or_default(),
                    factor,
                })
            })
            .collect()
    }

    /// The constraint table
    pub fn constraints() -> &'static [Constraint<BayfillRule>] {
        CONSTRAINTS
    }

    /// Evaluate the constraint table
    pub fn status(&self) -> RuleStatus {
        RuleStatus::evaluate(self, CONSTRAINTS)
    }

    fn has_all_polygons(&self) -> bool {
        self.base.polygons.len() == POLYGONS
            && self.base.polygons.values().all(|p| p.as_bayfill().is_some())
    }

    fn has_distinct_roles(&self) -> bool {
        let roles: HashSet<BayfillRole> = self.bayfill_polygons().map(|p| p.role).collect();
        roles.len() == POLYGONS
    }

    fn has_distinct_facies(&self) -> bool {
        let facies: Option<HashSet<EntityId>> =
            self.base.polygons.values().map(Polygon::facies).collect();
        facies.is_some_and(|f| f.len() == POLYGONS && self.base.polygons.len() == POLYGONS)
    }

    fn has_background_fields(&self) -> bool {
        self.base.has_distinct_background_fields(BACKGROUND_FIELDS)
    }

    fn has_slant_factors(&self) -> bool {
        self.bayfill_polygons()
            .all(|p| !p.role.requires_slant_factor() || p.slant_factor.is_some())
    }
}
