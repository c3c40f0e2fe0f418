//! Truncation rules
//!
//! A rule partitions the value space of its background fields into labeled
//! polygons. Three closed variants exist; NonCubic and Cubic also accept
//! overlay polygons (see [`overlay`]).

pub mod bayfill;
pub mod constraint;
pub mod cubic;
pub mod non_cubic;
pub mod overlay;

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{DomainError, Result};
use crate::id::{Entity, EntityId};
use crate::parent::{Parent, Scoped};
use crate::polygon::{OverlayPolygon, Polygon};

pub use bayfill::{BayfillRule, SlantFactor};
pub use constraint::{Constraint, RuleStatus};
pub use cubic::{CubicRule, SlicingDirection};
pub use non_cubic::NonCubicRule;
pub use overlay::OverlayCapable;

/// Tolerance used when checking that fractions per facies sum to 1
pub const FRACTION_TOLERANCE: f64 = 1e-6;

/// State shared by every rule variant
#[derive(Debug, Clone, PartialEq)]
pub struct RuleBase {
    /// Unique identifier
    pub id: EntityId,
    /// Owning scope
    pub parent: Parent,
    /// Rule name
    pub name: String,
    /// Polygons, keyed by id
    pub polygons: BTreeMap<EntityId, Polygon>,
    /// Background field slots; `None` is an unassigned slot
    pub background_fields: Vec<Option<EntityId>>,
}

impl RuleBase {
    /// Create an empty base with `slots` unassigned background fields
    pub fn new(parent: Parent, name: impl Into<String>, slots: usize) -> Self {
        Self {
            id: EntityId::new(),
            parent,
            name: name.into(),
            polygons: BTreeMap::new(),
            background_fields: vec![None; slots],
        }
    }

    /// Look up a polygon
    pub fn polygon(&self, id: EntityId) -> Option<&Polygon> {
        self.polygons.get(&id)
    }

    /// Look up a polygon, mutably
    pub fn polygon_mut(&mut self, id: EntityId) -> Option<&mut Polygon> {
        self.polygons.get_mut(&id)
    }

    /// Insert a polygon, returning its id
    pub fn insert_polygon(&mut self, polygon: impl Into<Polygon>) -> EntityId {
        let polygon = polygon.into();
        let id = polygon.id();
        self.polygons.insert(id, polygon);
        id
    }

    /// Polygons sorted by order, ties broken by id
    pub fn ordered_polygons(&self) -> Vec<&Polygon> {
        let mut polygons: Vec<&Polygon> = self.polygons.values().collect();
        polygons.sort_by_key(|p| (p.order(), p.id()));
        polygons
    }

    /// Overlay polygons in polygon order, regardless of the overlay flag
    pub fn overlay_polygons(&self) -> Vec<&OverlayPolygon> {
        self.ordered_polygons()
            .into_iter()
            .filter_map(Polygon::as_overlay)
            .collect()
    }

    /// Assign a background field slot
    ///
    /// # Errors
    /// Configuration error when `slot` is out of range
    pub fn set_background_field(&mut self, slot: usize, field: Option<EntityId>) -> Result<()> {
        let slots = self.background_fields.len();
        let target = self.background_fields.get_mut(slot).ok_or_else(|| {
            DomainError::Configuration(format!(
                "rule '{}' has {} background field slots, not {}",
                self.name,
                slots,
                slot + 1
            ))
        })?;
        *target = field;
        Ok(())
    }

    /// Assigned background fields, in slot order
    pub fn assigned_background_fields(&self) -> Vec<EntityId> {
        self.background_fields.iter().flatten().copied().collect()
    }

    /// Whether exactly the slot count is assigned, with distinct fields
    pub fn has_distinct_background_fields(&self, expected: usize) -> bool {
        let assigned = self.assigned_background_fields();
        let distinct: HashSet<EntityId> = assigned.iter().copied().collect();
        self.background_fields.len() == expected && assigned.len() == expected && distinct.len() == expected
    }

    /// Whether the field appears in a background slot or an overlay polygon
    pub fn references_field(&self, field: EntityId) -> bool {
        self.background_fields.contains(&Some(field))
            || self
                .polygons
                .values()
                .filter_map(Polygon::as_overlay)
                .any(|p| p.field == Some(field))
    }

    /// Whether any polygon maps to the facies
    pub fn references_facies(&self, facies: EntityId) -> bool {
        self.polygons.values().any(|p| p.facies() == Some(facies))
    }

    /// Whether any overlay polygon targets the group
    pub fn references_group(&self, group: EntityId) -> bool {
        self.polygons
            .values()
            .filter_map(Polygon::as_overlay)
            .any(|p| p.group == group)
    }

    /// Unassign the field everywhere; returns whether anything changed
    pub fn strip_field(&mut self, field: EntityId) -> bool {
        let mut changed = false;
        for slot in self.background_fields.iter_mut() {
            if *slot == Some(field) {
                *slot = None;
                changed = true;
            }
        }
        for polygon in self.polygons.values_mut() {
            if let Some(overlay) = polygon.as_overlay_mut() {
                if overlay.field == Some(field) {
                    overlay.field = None;
                    changed = true;
                }
            }
        }
        changed
    }

    /// Clear the facies from every polygon mapping to it
    pub fn strip_facies(&mut self, facies: EntityId) -> bool {
        let mut changed = false;
        for polygon in self.polygons.values_mut() {
            let common = polygon.common_mut();
            if common.facies == Some(facies) {
                common.facies = None;
                changed = true;
            }
        }
        changed
    }

    /// Delete every overlay polygon targeting the group; returns the count
    pub fn remove_overlays_for_group(&mut self, group: EntityId) -> usize {
        let before = self.polygons.len();
        self.polygons
            .retain(|_, p| p.as_overlay().map_or(true, |o| o.group != group));
        before - self.polygons.len()
    }
}

/// Whether the fractions of the given polygons sum to 1 for every facies
pub(crate) fn fractions_sum_to_one<'a>(polygons: impl IntoIterator<Item = &'a Polygon>) -> bool {
    let mut sums: HashMap<EntityId, f64> = HashMap::new();
    for polygon in polygons {
        if let Some(facies) = polygon.facies() {
            *sums.entry(facies).or_default() += polygon.fraction();
        }
    }
    sums.values().all(|sum| (sum - 1.0).abs() <= FRACTION_TOLERANCE)
}

/// Rule variant tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Bayfill
    Bayfill,
    /// Non-cubic
    NonCubic,
    /// Cubic
    Cubic,
}

impl RuleKind {
    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Bayfill => "bayfill",
            RuleKind::NonCubic => "non-cubic",
            RuleKind::Cubic => "cubic",
        }
    }

    /// Parse a kind from its name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bayfill" => Some(RuleKind::Bayfill),
            "non-cubic" => Some(RuleKind::NonCubic),
            "cubic" => Some(RuleKind::Cubic),
            _ => None,
        }
    }

    /// Number of background field slots
    pub fn background_field_count(&self) -> usize {
        match self {
            RuleKind::Bayfill => bayfill::BACKGROUND_FIELDS,
            RuleKind::NonCubic => non_cubic::BACKGROUND_FIELDS,
            RuleKind::Cubic => cubic::BACKGROUND_FIELDS,
        }
    }
}

impl std::str::FromStr for RuleKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
            .ok_or_else(|| DomainError::Configuration(format!("Invalid truncation rule type: {}", s)))
    }
}

/// Any truncation rule
#[derive(Debug, Clone, PartialEq)]
pub enum TruncationRule {
    /// Bayfill rule
    Bayfill(BayfillRule),
    /// Non-cubic rule
    NonCubic(NonCubicRule),
    /// Cubic rule
    Cubic(CubicRule),
}

impl TruncationRule {
    /// Shared state
    pub fn base(&self) -> &RuleBase {
        match self {
            TruncationRule::Bayfill(r) => &r.base,
            TruncationRule::NonCubic(r) => &r.base,
            TruncationRule::Cubic(r) => &r.base,
        }
    }

    /// Shared state, mutably
    pub fn base_mut(&mut self) -> &mut RuleBase {
        match self {
            TruncationRule::Bayfill(r) => &mut r.base,
            TruncationRule::NonCubic(r) => &mut r.base,
            TruncationRule::Cubic(r) => &mut r.base,
        }
    }

    /// Variant tag
    pub fn kind(&self) -> RuleKind {
        match self {
            TruncationRule::Bayfill(_) => RuleKind::Bayfill,
            TruncationRule::NonCubic(_) => RuleKind::NonCubic,
            TruncationRule::Cubic(_) => RuleKind::Cubic,
        }
    }

    /// Rule name
    pub fn name(&self) -> &str {
        &self.base().name
    }

    /// Every polygon, in polygon order
    pub fn polygons(&self) -> Vec<&Polygon> {
        self.base().ordered_polygons()
    }

    /// Polygons that partition the background fields
    ///
    /// For cubic rules these are the leaves of the slicing tree; for the
    /// others every non-overlay polygon.
    pub fn background_polygons(&self) -> Vec<&Polygon> {
        match self {
            TruncationRule::Cubic(r) => r.leaf_polygons(),
            _ => self
                .polygons()
                .into_iter()
                .filter(|p| !p.is_overlay())
                .collect(),
        }
    }

    /// Overlay polygons; empty unless the rule has overlay enabled
    pub fn overlay_polygons(&self) -> Vec<&OverlayPolygon> {
        match self {
            TruncationRule::Bayfill(_) => Vec::new(),
            TruncationRule::NonCubic(r) => r.overlay_polygons(),
            TruncationRule::Cubic(r) => r.overlay_polygons(),
        }
    }

    /// Whether overlay polygons take part in the rule
    pub fn overlay_enabled(&self) -> bool {
        match self {
            TruncationRule::Bayfill(_) => false,
            TruncationRule::NonCubic(r) => r.overlay_enabled(),
            TruncationRule::Cubic(r) => r.overlay_enabled(),
        }
    }

    /// Input fields: background slots in stored order, then every distinct
    /// overlay field in polygon order
    ///
    /// Position in this list is the field's channel index.
    pub fn fields(&self) -> Vec<Option<EntityId>> {
        let mut fields = self.base().background_fields.clone();
        for overlay in self.overlay_polygons() {
            if let Some(field) = overlay.field {
                if !fields.contains(&Some(field)) {
                    fields.push(Some(field));
                }
            }
        }
        fields
    }

    /// Whether an overlay polygon over `group` already uses `field`
    pub fn is_used_in_different_overlay_polygon(&self, group: EntityId, field: EntityId) -> bool {
        match self {
            TruncationRule::Bayfill(_) => false,
            TruncationRule::NonCubic(r) => r.is_used_in_different_overlay_polygon(group, field),
            TruncationRule::Cubic(r) => r.is_used_in_different_overlay_polygon(group, field),
        }
    }

    /// Evaluate the rule's constraint table
    pub fn status(&self) -> RuleStatus {
        match self {
            TruncationRule::Bayfill(r) => r.status(),
            TruncationRule::NonCubic(r) => r.status(),
            TruncationRule::Cubic(r) => r.status(),
        }
    }

    /// Whether every structural constraint holds
    pub fn ready(&self) -> bool {
        self.status().ready
    }

    /// Whether any participating polygon has an FMU-updatable scalar
    pub fn is_fmu_updatable(&self) -> bool {
        self.background_polygons().iter().any(|p| p.is_fmu_updatable())
            || self.overlay_polygons().iter().any(|p| p.center.updatable)
    }

    /// As a bayfill rule
    pub fn as_bayfill(&self) -> Option<&BayfillRule> {
        match self {
            TruncationRule::Bayfill(r) => Some(r),
            _ => None,
        }
    }

    /// As a cubic rule
    pub fn as_cubic(&self) -> Option<&CubicRule> {
        match self {
            TruncationRule::Cubic(r) => Some(r),
            _ => None,
        }
    }
}

impl Entity for TruncationRule {
    fn id(&self) -> EntityId {
        self.base().id
    }
}

impl Scoped for TruncationRule {
    fn parent(&self) -> &Parent {
        &self.base().parent
    }
}

impl From<BayfillRule> for TruncationRule {
    fn from(rule: BayfillRule) -> Self {
        TruncationRule::Bayfill(rule)
    }
}

impl From<NonCubicRule> for TruncationRule {
    fn from(rule: NonCubicRule) -> Self {
        TruncationRule::NonCubic(rule)
    }
}

impl From<CubicRule> for TruncationRule {
    fn from(rule: CubicRule) -> Self {
        TruncationRule::Cubic(rule)
    }
}
