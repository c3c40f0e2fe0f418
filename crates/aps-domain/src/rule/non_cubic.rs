//! Non-cubic truncation rule: angular sectors over two fields

use crate::id::EntityId;
use crate::parent::Parent;
use crate::polygon::{NonCubicPolygon, Polygon};
use crate::rule::constraint::{Constraint, RuleStatus};
use crate::rule::overlay::{self, OverlayCapable};
use crate::rule::{fractions_sum_to_one, RuleBase};

/// Number of background fields
pub const BACKGROUND_FIELDS: usize = 2;

const CONSTRAINTS: &[Constraint<NonCubicRule>] = &[
    Constraint::new("has at least one polygon", |r| !r.non_overlay_polygons().is_empty()),
    Constraint::new("background polygons are non-cubic", |r| {
        r.non_overlay_polygons().iter().all(|p| p.as_non_cubic().is_some())
    }),
    Constraint::new("every polygon references a facies", |r| {
        r.non_overlay_polygons().iter().all(|p| p.facies().is_some())
    }),
    Constraint::new("angles lie within [-180, 180]", |r| {
        r.non_overlay_polygons()
            .iter()
            .filter_map(|p| p.as_non_cubic())
            .all(|p| (-180.0..=180.0).contains(&p.angle.value))
    }),
    Constraint::new("fractions per facies sum to 1", |r| {
        fractions_sum_to_one(r.non_overlay_polygons())
    }),
    Constraint::new("exactly 2 distinct background fields are assigned", |r| {
        r.base.has_distinct_background_fields(BACKGROUND_FIELDS)
    }),
];

static OVERLAY_CONSTRAINTS: [Constraint<NonCubicRule>; 4] = overlay::constraints::<NonCubicRule>();

/// Non-cubic rule
#[derive(Debug, Clone, PartialEq)]
pub struct NonCubicRule {
    /// Shared state
    pub base: RuleBase,
    /// Whether overlay polygons take part
    pub overlay: bool,
}

impl NonCubicRule {
    /// Create an empty rule
    pub fn new(parent: Parent, name: impl Into<String>) -> Self {
        Self {
            base: RuleBase::new(parent, name, BACKGROUND_FIELDS),
            overlay: false,
        }
    }

    /// Use a specific identifier
    pub fn with_id(mut self, id: EntityId) -> Self {
        self.base.id = id;
        self
    }

    /// Add an angular polygon
    pub fn add_polygon(&mut self, polygon: NonCubicPolygon) -> EntityId {
        self.base.insert_polygon(polygon)
    }

    /// Angular polygons, in polygon order
    pub fn sectors(&self) -> Vec<&NonCubicPolygon> {
        self.non_overlay_polygons()
            .into_iter()
            .filter_map(Polygon::as_non_cubic)
            .collect()
    }

    /// Evaluate the rule's constraints, overlay constraints included
    pub fn status(&self) -> RuleStatus {
        RuleStatus::evaluate(self, CONSTRAINTS).merge(RuleStatus::evaluate(self, &OVERLAY_CONSTRAINTS))
    }
}

impl OverlayCapable for NonCubicRule {
    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RuleBase {
        &mut self.base
    }

    fn overlay_enabled(&self) -> bool {
        self.overlay
    }

    fn set_overlay(&mut self, enabled: bool) {
        self.overlay = enabled;
    }
}
