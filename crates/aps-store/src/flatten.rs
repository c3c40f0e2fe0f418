//! Domain to document conversion
//!
//! Every entity flattens to its own fields plus its owned children, with
//! cross-references written as bare ids.

use aps_domain::{
    CrossSection, CubicRule, EntityId, Facies, FaciesGroup, GaussianRandomField, GlobalFacies,
    Parent, Polygon, Region, Selection, Trend, TruncationRule, Variogram, Zone,
};

use crate::document::{
    CrossSectionDoc, FaciesDoc, FaciesGroupDoc, FieldDoc, GlobalFaciesDoc, ObservationDoc,
    OriginDoc, ParentDoc, PolygonDoc, RegionDoc, RuleDoc, SelectedDoc, TrendDoc, VariogramDoc,
    ZoneDoc,
};

/// Selection state written for zones with regions and some selected
pub const INTERMEDIATE: &str = "intermediate";

fn id(id: EntityId) -> String {
    id.to_string()
}

/// Flatten a scope
pub fn parent(parent: &Parent) -> ParentDoc {
    ParentDoc {
        zone: Some(id(parent.zone)),
        region: parent.region.map(id),
    }
}

/// Flatten a region
pub fn region(region: &Region) -> RegionDoc {
    RegionDoc {
        id: Some(id(region.id)),
        name: region.name.clone(),
        code: region.code,
        selected: region.selected,
        zone: Some(id(region.zone())),
    }
}

/// Flatten a zone and its regions
pub fn zone(zone: &Zone) -> ZoneDoc {
    let selected = match zone.selection() {
        Selection::Selected => SelectedDoc::Flag(true),
        Selection::Unselected => SelectedDoc::Flag(false),
        Selection::Intermediate => SelectedDoc::State(INTERMEDIATE.to_string()),
    };
    ZoneDoc {
        id: Some(id(zone.id)),
        name: zone.name.clone(),
        code: zone.code,
        thickness: zone.thickness,
        conformity: Some(zone.conformity.as_str().to_string()),
        selected,
        regions: zone.regions().iter().map(region).collect(),
    }
}

/// Flatten a cross-section
pub fn cross_section(section: &CrossSection) -> CrossSectionDoc {
    CrossSectionDoc {
        id: id(section.id),
        parent: parent(&section.parent),
        kind: section.kind.as_str().to_string(),
        relative_position: section.relative_position(),
    }
}

/// Flatten a global facies
pub fn global_facies(facies: &GlobalFacies) -> GlobalFaciesDoc {
    GlobalFaciesDoc {
        id: id(facies.id),
        name: facies.name.clone(),
        code: f64::from(facies.code.value()),
        color: facies.color.clone(),
        alias: facies.explicit_alias().unwrap_or_default().to_string(),
        observed: facies.observed.as_ref().map(|observed| {
            observed
                .iter()
                .map(|o| ObservationDoc {
                    zone: o.zone,
                    region: o.region,
                })
                .collect()
        }),
    }
}

/// Flatten a scoped facies
pub fn facies(facies: &Facies) -> FaciesDoc {
    FaciesDoc {
        id: id(facies.id),
        parent: parent(&facies.parent),
        facies: id(facies.global),
        probability_cube: facies.probability_cube.clone(),
        preview_probability: facies.preview_probability(),
    }
}

/// Flatten a facies group
pub fn facies_group(group: &FaciesGroup) -> FaciesGroupDoc {
    FaciesGroupDoc {
        id: id(group.id),
        parent: parent(&group.parent),
        facies: group.facies().iter().copied().map(id).collect(),
    }
}

fn variogram(variogram: &Variogram) -> VariogramDoc {
    VariogramDoc {
        kind: variogram.kind.as_str().to_string(),
        azimuth: variogram.azimuth.into(),
        dip: variogram.dip.into(),
        main_range: variogram.main_range.into(),
        perpendicular_range: variogram.perpendicular_range.into(),
        vertical_range: variogram.vertical_range.into(),
        power: variogram.power.into(),
    }
}

fn trend(trend: &Trend) -> TrendDoc {
    TrendDoc {
        kind: trend.kind.as_str().to_string(),
        azimuth: trend.azimuth.into(),
        stacking_angle: trend.stacking_angle.into(),
        direction: trend.direction.as_str().to_string(),
        curvature: trend.curvature.into(),
        migration_angle: trend.migration_angle.into(),
        origin: OriginDoc {
            x: trend.origin_x.into(),
            y: trend.origin_y.into(),
            z: trend.origin_z.into(),
            kind: trend.origin_kind.as_str().to_string(),
        },
        relative_size: trend.relative_size.into(),
        relative_std_dev: trend.relative_std_dev.into(),
        parameter: trend.parameter.clone(),
    }
}

/// Flatten a Gaussian random field
pub fn field(field: &GaussianRandomField) -> FieldDoc {
    FieldDoc {
        id: id(field.id),
        parent: parent(&field.parent),
        name: field.name.clone(),
        variogram: Some(variogram(&field.variogram)),
        trend: Some(trend(&field.trend)),
        cross_section: id(field.cross_section),
    }
}

/// Flatten a polygon; cubic polygons need their rule to derive the level
pub fn polygon(polygon: &Polygon, cubic: Option<&CubicRule>) -> PolygonDoc {
    let common = polygon.common();
    let mut doc = PolygonDoc {
        kind: Some(polygon.kind().as_str().to_string()),
        id: Some(id(common.id)),
        order: common.order,
        fraction: common.fraction,
        facies: common.facies.map(id),
        ..PolygonDoc::default()
    };
    match polygon {
        Polygon::Bayfill(p) => {
            doc.name = Some(p.role.as_str().to_string());
            doc.slant_factor = p.slant_factor.map(Into::into);
        }
        Polygon::NonCubic(p) => {
            doc.angle = Some(p.angle.into());
        }
        Polygon::Cubic(p) => {
            doc.parent = Some(p.parent.map(id));
            doc.children = Some(p.children.iter().copied().map(id).collect());
            doc.level = cubic.and_then(|rule| rule.level(common.id));
        }
        Polygon::Overlay(p) => {
            doc.group = Some(id(p.group));
            doc.field = Some(p.field.map(id));
            doc.center = Some(p.center.into());
        }
    }
    doc
}

/// Flatten a truncation rule with its polygons
pub fn rule(rule: &TruncationRule) -> RuleDoc {
    let base = rule.base();
    let cubic = rule.as_cubic();
    let (overlay, direction, level_depth) = match rule {
        TruncationRule::Bayfill(_) => (None, None, None),
        TruncationRule::NonCubic(r) => (Some(r.overlay), None, None),
        TruncationRule::Cubic(r) => (
            Some(r.overlay),
            Some(r.direction.as_str().to_string()),
            Some(r.level_depth),
        ),
    };
    RuleDoc {
        id: id(base.id),
        parent: parent(&base.parent),
        name: base.name.clone(),
        kind: rule.kind().as_str().to_string(),
        background_fields: base
            .background_fields
            .iter()
            .map(|slot| slot.map(id))
            .collect(),
        polygons: base.polygons.values().map(|p| polygon(p, cubic)).collect(),
        overlay,
        direction,
        level_depth,
    }
}
