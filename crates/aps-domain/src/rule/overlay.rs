//! Overlay extension shared by non-cubic and cubic rules
//!
//! Overlay polygons override the background facies for one facies group,
//! driven by an auxiliary field. They participate only while the rule's
//! overlay flag is set.

use std::collections::HashSet;

use crate::id::EntityId;
use crate::polygon::{OverlayPolygon, Polygon};
use crate::rule::constraint::Constraint;
use crate::rule::RuleBase;

/// A rule that accepts overlay polygons
pub trait OverlayCapable {
    /// Shared state
    fn base(&self) -> &RuleBase;

    /// Shared state, mutably
    fn base_mut(&mut self) -> &mut RuleBase;

    /// Whether overlay polygons take part in the rule
    fn overlay_enabled(&self) -> bool;

    /// Turn the overlay extension on or off
    fn set_overlay(&mut self, enabled: bool);

    /// Participating overlay polygons, in polygon order
    fn overlay_polygons(&self) -> Vec<&OverlayPolygon> {
        if !self.overlay_enabled() {
            return Vec::new();
        }
        self.base().overlay_polygons()
    }

    /// Add an overlay polygon, enabling the extension
    fn add_overlay_polygon(&mut self, polygon: OverlayPolygon) -> EntityId {
        self.set_overlay(true);
        self.base_mut().insert_polygon(polygon)
    }

    /// Distinct overlay fields, in polygon order
    fn overlay_fields(&self) -> Vec<EntityId> {
        let mut fields = Vec::new();
        for field in self.overlay_polygons().iter().filter_map(|p| p.field) {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        fields
    }

    /// Whether an overlay polygon over `group` already uses `field`
    ///
    /// Polygons over other groups are not considered.
    fn is_used_in_different_overlay_polygon(&self, group: EntityId, field: EntityId) -> bool {
        self.overlay_polygons()
            .iter()
            .any(|p| p.group == group && p.field == Some(field))
    }

    /// Every non-overlay polygon of the rule
    fn non_overlay_polygons(&self) -> Vec<&Polygon> {
        self.base()
            .ordered_polygons()
            .into_iter()
            .filter(|p| !p.is_overlay())
            .collect()
    }
}

/// Every overlay polygon has a field
pub fn every_overlay_has_field<R: OverlayCapable>(rule: &R) -> bool {
    rule.overlay_polygons().iter().all(|p| p.field.is_some())
}

/// Every overlay polygon maps to a facies
pub fn every_overlay_has_facies<R: OverlayCapable>(rule: &R) -> bool {
    rule.overlay_polygons().iter().all(|p| p.common.facies.is_some())
}

/// No field drives two overlay polygons over the same group
pub fn no_field_double_booked<R: OverlayCapable>(rule: &R) -> bool {
    let mut seen: HashSet<(EntityId, EntityId)> = HashSet::new();
    rule.overlay_polygons()
        .iter()
        .filter_map(|p| p.field.map(|field| (p.group, field)))
        .all(|pair| seen.insert(pair))
}

/// Overlay fields are not also background fields
pub fn overlay_fields_disjoint_from_background<R: OverlayCapable>(rule: &R) -> bool {
    let background = rule.base().assigned_background_fields();
    rule.overlay_fields().iter().all(|f| !background.contains(f))
}

/// Overlay constraint table for `R`
pub const fn constraints<R: OverlayCapable>() -> [Constraint<R>; 4] {
    [
        Constraint::new("every overlay polygon has a field", every_overlay_has_field::<R>),
        Constraint::new("every overlay polygon references a facies", every_overlay_has_facies::<R>),
        Constraint::new(
            "no field is used by two overlay polygons of one group",
            no_field_double_booked::<R>,
        ),
        Constraint::new(
            "overlay fields differ from background fields",
            overlay_fields_disjoint_from_background::<R>,
        ),
    ]
}
