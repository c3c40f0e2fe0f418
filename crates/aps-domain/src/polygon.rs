//! Polygons: the labeled cells of a truncation rule's partition
//!
//! The variant set is closed: bayfill, non-cubic, cubic, and overlay.

use crate::error::{DomainError, Result};
use crate::fmu::FmuUpdatable;
use crate::id::{Entity, EntityId};

/// Fields shared by every polygon
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonCommon {
    /// Unique identifier
    pub id: EntityId,
    /// Rank within the rule (or among siblings, for cubic polygons)
    pub order: i32,
    /// Probability weight among polygons sharing a facies
    pub fraction: f64,
    /// Facies this polygon maps to, once assigned
    pub facies: Option<EntityId>,
}

impl PolygonCommon {
    /// Common fields with a fresh id, fraction 1 and no facies
    pub fn new(order: i32) -> Self {
        Self {
            id: EntityId::new(),
            order,
            fraction: 1.0,
            facies: None,
        }
    }

    /// Use a specific identifier
    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = id;
        self
    }

    /// Assign a facies
    pub fn with_facies(mut self, facies: EntityId) -> Self {
        self.facies = Some(facies);
        self
    }

    /// Set the fraction
    pub fn with_fraction(mut self, fraction: f64) -> Self {
        self.fraction = fraction;
        self
    }
}

/// Fixed facies roles of a bayfill rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BayfillRole {
    /// Floodplain (slant factor SF)
    Floodplain,
    /// Subbay (slant factor YSF)
    Subbay,
    /// Wave influenced bayfill
    WaveInfluencedBayfill,
    /// Bayhead delta (slant factor SBHD)
    BayheadDelta,
    /// Lagoon
    Lagoon,
}

impl BayfillRole {
    /// Every role, in canonical order
    pub const ALL: [BayfillRole; 5] = [
        BayfillRole::Floodplain,
        BayfillRole::Subbay,
        BayfillRole::WaveInfluencedBayfill,
        BayfillRole::BayheadDelta,
        BayfillRole::Lagoon,
    ];

    /// Get the role name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            BayfillRole::Floodplain => "Floodplain",
            BayfillRole::Subbay => "Subbay",
            BayfillRole::WaveInfluencedBayfill => "Wave influenced Bayfill",
            BayfillRole::BayheadDelta => "Bayhead Delta",
            BayfillRole::Lagoon => "Lagoon",
        }
    }

    /// Parse a role from its name
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == s)
    }

    /// Name of the slant factor in the exported specification, for the
    /// three roles that carry one
    pub fn slant_factor_name(&self) -> Option<&'static str> {
        match self {
            BayfillRole::Floodplain => Some("SF"),
            BayfillRole::Subbay => Some("YSF"),
            BayfillRole::BayheadDelta => Some("SBHD"),
            BayfillRole::WaveInfluencedBayfill | BayfillRole::Lagoon => None,
        }
    }

    /// Whether the role requires a slant factor
    pub fn requires_slant_factor(&self) -> bool {
        self.slant_factor_name().is_some()
    }
}

/// Bayfill polygon: one of five fixed roles
#[derive(Debug, Clone, PartialEq)]
pub struct BayfillPolygon {
    /// Shared fields
    pub common: PolygonCommon,
    /// Facies role
    pub role: BayfillRole,
    /// Slant factor, required for slant roles
    pub slant_factor: Option<FmuUpdatable>,
}

impl BayfillPolygon {
    /// Create a bayfill polygon
    ///
    /// # Errors
    /// Configuration error when a slant role has no slant factor
    pub fn new(common: PolygonCommon, role: BayfillRole, slant_factor: Option<FmuUpdatable>) -> Result<Self> {
        if role.requires_slant_factor() && slant_factor.is_none() {
            return Err(DomainError::Configuration(format!(
                "bayfill polygon '{}' requires a slant factor",
                role.as_str()
            )));
        }
        Ok(Self {
            common,
            role,
            slant_factor,
        })
    }
}

/// Non-cubic polygon: an angular sector
#[derive(Debug, Clone, PartialEq)]
pub struct NonCubicPolygon {
    /// Shared fields
    pub common: PolygonCommon,
    /// Sector angle in degrees
    pub angle: FmuUpdatable,
}

impl NonCubicPolygon {
    /// Create a non-cubic polygon
    pub fn new(common: PolygonCommon, angle: FmuUpdatable) -> Self {
        Self { common, angle }
    }
}

/// Cubic polygon: a node in a slicing tree
///
/// Edges are ids resolved through the owning rule's polygon map.
#[derive(Debug, Clone, PartialEq)]
pub struct CubicPolygon {
    /// Shared fields
    pub common: PolygonCommon,
    /// Parent node
    pub parent: Option<EntityId>,
    /// Child nodes
    pub children: Vec<EntityId>,
}

impl CubicPolygon {
    /// Create a detached cubic polygon
    pub fn new(common: PolygonCommon) -> Self {
        Self {
            common,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Whether the node has no children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether the node has no parent
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Overlay polygon: overrides background facies within a facies group
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPolygon {
    /// Shared fields
    pub common: PolygonCommon,
    /// Facies group the overlay applies over
    pub group: EntityId,
    /// Center of the truncation interval
    pub center: FmuUpdatable,
    /// Auxiliary field driving the overlay
    pub field: Option<EntityId>,
}

impl OverlayPolygon {
    /// Create an overlay polygon without a field
    pub fn new(common: PolygonCommon, group: EntityId, center: FmuUpdatable) -> Self {
        Self {
            common,
            group,
            center,
            field: None,
        }
    }

    /// Assign the driving field
    pub fn with_field(mut self, field: EntityId) -> Self {
        self.field = Some(field);
        self
    }
}

/// Polygon variant tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolygonKind {
    /// Bayfill
    Bayfill,
    /// Non-cubic
    NonCubic,
    /// Cubic
    Cubic,
    /// Overlay
    Overlay,
}

impl PolygonKind {
    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            PolygonKind::Bayfill => "bayfill",
            PolygonKind::NonCubic => "non-cubic",
            PolygonKind::Cubic => "cubic",
            PolygonKind::Overlay => "overlay",
        }
    }

    /// Parse a kind from its name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bayfill" => Some(PolygonKind::Bayfill),
            "non-cubic" => Some(PolygonKind::NonCubic),
            "cubic" => Some(PolygonKind::Cubic),
            "overlay" => Some(PolygonKind::Overlay),
            _ => None,
        }
    }
}

/// Any polygon
#[derive(Debug, Clone, PartialEq)]
pub enum Polygon {
    /// Bayfill polygon
    Bayfill(BayfillPolygon),
    /// Non-cubic polygon
    NonCubic(NonCubicPolygon),
    /// Cubic polygon
    Cubic(CubicPolygon),
    /// Overlay polygon
    Overlay(OverlayPolygon),
}

impl Polygon {
    /// Shared fields
    pub fn common(&self) -> &PolygonCommon {
        match self {
            Polygon::Bayfill(p) => &p.common,
            Polygon::NonCubic(p) => &p.common,
            Polygon::Cubic(p) => &p.common,
            Polygon::Overlay(p) => &p.common,
        }
    }

    /// Shared fields, mutably
    pub fn common_mut(&mut self) -> &mut PolygonCommon {
        match self {
            Polygon::Bayfill(p) => &mut p.common,
            Polygon::NonCubic(p) => &mut p.common,
            Polygon::Cubic(p) => &mut p.common,
            Polygon::Overlay(p) => &mut p.common,
        }
    }

    /// Variant tag
    pub fn kind(&self) -> PolygonKind {
        match self {
            Polygon::Bayfill(_) => PolygonKind::Bayfill,
            Polygon::NonCubic(_) => PolygonKind::NonCubic,
            Polygon::Cubic(_) => PolygonKind::Cubic,
            Polygon::Overlay(_) => PolygonKind::Overlay,
        }
    }

    /// Rank
    pub fn order(&self) -> i32 {
        self.common().order
    }

    /// Fraction
    pub fn fraction(&self) -> f64 {
        self.common().fraction
    }

    /// Assigned facies
    pub fn facies(&self) -> Option<EntityId> {
        self.common().facies
    }

    /// Whether this is an overlay polygon
    pub fn is_overlay(&self) -> bool {
        matches!(self, Polygon::Overlay(_))
    }

    /// Whether any of the polygon's scalars may be overridden by FMU
    pub fn is_fmu_updatable(&self) -> bool {
        match self {
            Polygon::Bayfill(p) => p.slant_factor.is_some_and(|s| s.updatable),
            Polygon::NonCubic(p) => p.angle.updatable,
            Polygon::Cubic(_) => false,
            Polygon::Overlay(p) => p.center.updatable,
        }
    }

    /// As a bayfill polygon
    pub fn as_bayfill(&self) -> Option<&BayfillPolygon> {
        match self {
            Polygon::Bayfill(p) => Some(p),
            _ => None,
        }
    }

    /// As a non-cubic polygon
    pub fn as_non_cubic(&self) -> Option<&NonCubicPolygon> {
        match self {
            Polygon::NonCubic(p) => Some(p),
            _ => None,
        }
    }

    /// As a cubic polygon
    pub fn as_cubic(&self) -> Option<&CubicPolygon> {
        match self {
            Polygon::Cubic(p) => Some(p),
            _ => None,
        }
    }

    /// As a cubic polygon, mutably
    pub fn as_cubic_mut(&mut self) -> Option<&mut CubicPolygon> {
        match self {
            Polygon::Cubic(p) => Some(p),
            _ => None,
        }
    }

    /// As an overlay polygon
    pub fn as_overlay(&self) -> Option<&OverlayPolygon> {
        match self {
            Polygon::Overlay(p) => Some(p),
            _ => None,
        }
    }

    /// As an overlay polygon, mutably
    pub fn as_overlay_mut(&mut self) -> Option<&mut OverlayPolygon> {
        match self {
            Polygon::Overlay(p) => Some(p),
            _ => None,
        }
    }
}

impl Entity for Polygon {
    fn id(&self) -> EntityId {
        self.common().id
    }
}

impl From<BayfillPolygon> for Polygon {
    fn from(p: BayfillPolygon) -> Self {
        Polygon::Bayfill(p)
    }
}

impl From<NonCubicPolygon> for Polygon {
    fn from(p: NonCubicPolygon) -> Self {
        Polygon::NonCubic(p)
    }
}

impl From<CubicPolygon> for Polygon {
    fn from(p: CubicPolygon) -> Self {
        Polygon::Cubic(p)
    }
}

impl From<OverlayPolygon> for Polygon {
    fn from(p: OverlayPolygon) -> Self {
        Polygon::Overlay(p)
    }
}
