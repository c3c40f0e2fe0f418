//! Typed reconstruction from the flat document
//!
//! Cross-references are checked against a [`ReferenceContext`]: the ids known
//! per collection. A reference that does not resolve is a reconstruction
//! error. Scope existence and cross-entity invariants are checked later, by
//! the [`Project`](crate::Project) on insertion.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use aps_domain::{
    BayfillPolygon, BayfillRole, BayfillRule, Conformity, CrossSection, CrossSectionType,
    CubicPolygon, CubicRule, DomainError, EntityId, Facies, FaciesGroup, FmuUpdatable,
    GaussianRandomField, GlobalFacies, NonCubicPolygon, NonCubicRule, Observation, OriginType,
    OverlayPolygon, Parent, Polygon, PolygonCommon, PolygonKind, Region, Result, RuleBase,
    RuleKind, SlicingDirection, StackingDirection, Trend, TrendType, TruncationRule, Variogram,
    VariogramType, Zone,
};
use tracing::debug;

use crate::document::{
    CrossSectionDoc, Document, FaciesDoc, FaciesGroupDoc, FieldDoc, FmuDoc, GlobalFaciesDoc,
    ParentDoc, PolygonDoc, RegionDoc, RuleDoc, SelectedDoc, TrendDoc, VariogramDoc, ZoneDoc,
};
use crate::flatten::INTERMEDIATE;

/// Collections a reference may point into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reference {
    /// Global facies
    GlobalFacies,
    /// Scoped facies
    Facies,
    /// Facies groups
    Group,
    /// Gaussian random fields
    Field,
    /// Cross-sections
    CrossSection,
}

impl Reference {
    /// Get the collection name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Reference::GlobalFacies => "global facies",
            Reference::Facies => "facies",
            Reference::Group => "facies group",
            Reference::Field => "gaussian random field",
            Reference::CrossSection => "cross-section",
        }
    }
}

/// Ids known per collection, for resolving references
#[derive(Debug, Clone, Default)]
pub struct ReferenceContext {
    known: HashMap<Reference, HashSet<EntityId>>,
}

impl ReferenceContext {
    /// An empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Every well-formed id declared by `document`
    pub fn from_document(document: &Document) -> Self {
        let mut context = Self::new();
        context.extend_from_document(document);
        context
    }

    /// Add every well-formed id declared by `document`
    pub fn extend_from_document(&mut self, document: &Document) {
        let declared = [
            (Reference::CrossSection, document.cross_sections.iter().map(|d| d.id.as_str()).collect::<Vec<_>>()),
            (Reference::GlobalFacies, document.global_facies.iter().map(|d| d.id.as_str()).collect()),
            (Reference::Facies, document.facies.iter().map(|d| d.id.as_str()).collect()),
            (Reference::Group, document.facies_groups.iter().map(|d| d.id.as_str()).collect()),
            (Reference::Field, document.fields.iter().map(|d| d.id.as_str()).collect()),
        ];
        for (kind, ids) in declared {
            for id in ids.into_iter().filter_map(|s| EntityId::parse(s).ok()) {
                self.insert(kind, id);
            }
        }
    }

    /// Make an id known
    pub fn insert(&mut self, kind: Reference, id: EntityId) {
        self.known.entry(kind).or_default().insert(id);
    }

    /// Whether an id is known
    pub fn contains(&self, kind: Reference, id: EntityId) -> bool {
        self.known.get(&kind).is_some_and(|ids| ids.contains(&id))
    }

    /// Parse `raw` and check that it resolves
    ///
    /// # Errors
    /// Identity error for a malformed id, reconstruction error for a
    /// dangling one
    pub fn resolve(&self, kind: Reference, raw: &str, owner: impl fmt::Display) -> Result<EntityId> {
        let id = EntityId::parse(raw)?;
        if !self.contains(kind, id) {
            return Err(DomainError::Reconstruction(format!(
                "{} references unknown {} {}",
                owner,
                kind.as_str(),
                id
            )));
        }
        Ok(id)
    }
}

fn unknown_name(what: &str, name: &str) -> DomainError {
    DomainError::Reconstruction(format!("unknown {} '{}'", what, name))
}

fn scalar(doc: &FmuDoc) -> Result<FmuUpdatable> {
    FmuUpdatable::from_input(doc.input(), false)
}

/// Reconstruct a scope
pub fn parent(doc: &ParentDoc) -> Result<Parent> {
    let zone = doc.zone.as_deref().map(EntityId::parse).transpose()?;
    let region = doc.region.as_deref().map(EntityId::parse).transpose()?;
    Parent::from_parts(zone, region)
}

fn region(doc: &RegionDoc, zone: EntityId) -> Result<Region> {
    if let Some(owner) = doc.zone.as_deref() {
        if EntityId::parse(owner)? != zone {
            return Err(DomainError::Reconstruction(format!(
                "region '{}' claims zone {} but is listed under {}",
                doc.name, owner, zone
            )));
        }
    }
    let mut region = Region::new(zone, doc.name.clone(), doc.code)?
        .with_id(EntityId::parse_or_new(doc.id.as_deref())?);
    region.selected = doc.selected;
    Ok(region)
}

/// Reconstruct a zone with its regions
pub fn zone(doc: &ZoneDoc) -> Result<Zone> {
    let conformity = match doc.conformity.as_deref() {
        Some(name) => Conformity::parse(name).ok_or_else(|| unknown_name("conformity", name))?,
        None => Conformity::default(),
    };
    let mut zone = Zone::new(doc.name.clone(), doc.code, doc.thickness, conformity)?
        .with_id(EntityId::parse_or_new(doc.id.as_deref())?);
    let selected = match &doc.selected {
        SelectedDoc::Flag(flag) => *flag,
        SelectedDoc::State(state) if state == INTERMEDIATE => false,
        SelectedDoc::State(state) => return Err(unknown_name("selection state", state)),
    };
    // Stored flag first; region flags then take over the synthesized state
    zone.set_selected(selected);
    for region_doc in &doc.regions {
        zone.push_region(region(region_doc, zone.id)?)?;
    }
    Ok(zone)
}

/// Reconstruct a cross-section
pub fn cross_section(doc: &CrossSectionDoc) -> Result<CrossSection> {
    let kind = CrossSectionType::parse(&doc.kind).ok_or_else(|| unknown_name("cross-section type", &doc.kind))?;
    Ok(CrossSection::new(parent(&doc.parent)?, kind, doc.relative_position)?.with_id(EntityId::parse(&doc.id)?))
}

/// Reconstruct a global facies
pub fn global_facies(doc: &GlobalFaciesDoc) -> Result<GlobalFacies> {
    let mut facies = GlobalFacies::new(doc.name.clone(), doc.code, doc.color.clone())?
        .with_id(EntityId::parse(&doc.id)?)
        .with_alias(doc.alias.clone());
    if let Some(observed) = &doc.observed {
        facies = facies.with_observed(
            observed
                .iter()
                .map(|o| Observation {
                    zone: o.zone,
                    region: o.region,
                })
                .collect(),
        );
    }
    Ok(facies)
}

/// Reconstruct a scoped facies
pub fn facies(doc: &FaciesDoc, context: &ReferenceContext) -> Result<Facies> {
    let owner = format!("facies {}", doc.id);
    let global = context.resolve(Reference::GlobalFacies, &doc.facies, &owner)?;
    let mut facies = Facies::new(parent(&doc.parent)?, global).with_id(EntityId::parse(&doc.id)?);
    facies.probability_cube = doc.probability_cube.clone();
    facies.set_preview_probability(doc.preview_probability)?;
    Ok(facies)
}

/// Reconstruct a facies group
pub fn facies_group(doc: &FaciesGroupDoc, context: &ReferenceContext) -> Result<FaciesGroup> {
    let owner = format!("facies group {}", doc.id);
    let members = doc
        .facies
        .iter()
        .map(|raw| context.resolve(Reference::Facies, raw, &owner))
        .collect::<Result<Vec<_>>>()?;
    Ok(FaciesGroup::new(parent(&doc.parent)?, members).with_id(EntityId::parse(&doc.id)?))
}

fn variogram(doc: &VariogramDoc) -> Result<Variogram> {
    Ok(Variogram {
        kind: VariogramType::parse(&doc.kind).ok_or_else(|| unknown_name("variogram type", &doc.kind))?,
        azimuth: scalar(&doc.azimuth)?,
        dip: scalar(&doc.dip)?,
        main_range: scalar(&doc.main_range)?,
        perpendicular_range: scalar(&doc.perpendicular_range)?,
        vertical_range: scalar(&doc.vertical_range)?,
        power: scalar(&doc.power)?,
    })
}

fn trend(doc: &TrendDoc) -> Result<Trend> {
    Ok(Trend {
        kind: TrendType::parse(&doc.kind).ok_or_else(|| unknown_name("trend type", &doc.kind))?,
        azimuth: scalar(&doc.azimuth)?,
        stacking_angle: scalar(&doc.stacking_angle)?,
        direction: StackingDirection::parse(&doc.direction)
            .ok_or_else(|| unknown_name("stacking direction", &doc.direction))?,
        curvature: scalar(&doc.curvature)?,
        migration_angle: scalar(&doc.migration_angle)?,
        origin_x: scalar(&doc.origin.x)?,
        origin_y: scalar(&doc.origin.y)?,
        origin_z: scalar(&doc.origin.z)?,
        origin_kind: OriginType::parse(&doc.origin.kind)
            .ok_or_else(|| unknown_name("origin type", &doc.origin.kind))?,
        relative_size: scalar(&doc.relative_size)?,
        relative_std_dev: scalar(&doc.relative_std_dev)?,
        parameter: doc.parameter.clone(),
    })
}

/// Reconstruct a Gaussian random field
pub fn field(doc: &FieldDoc, context: &ReferenceContext) -> Result<GaussianRandomField> {
    let owner = format!("field '{}'", doc.name);
    let section = context.resolve(Reference::CrossSection, &doc.cross_section, &owner)?;
    let mut field = GaussianRandomField::new(parent(&doc.parent)?, doc.name.clone(), section)?
        .with_id(EntityId::parse(&doc.id)?);
    if let Some(v) = &doc.variogram {
        field.variogram = variogram(v)?;
    }
    if let Some(t) = &doc.trend {
        field.trend = trend(t)?;
    }
    Ok(field)
}

/// Infer a polygon's variant
///
/// An explicit `kind` wins. Otherwise, in order: `angle` means non-cubic;
/// `children` with `parent`, or `level`, means cubic; `group` with `field`,
/// or `overlay: true`, means overlay; `name` or `slantFactor` means bayfill.
///
/// # Errors
/// Reconstruction error for an unknown kind or an unrecognized shape
pub fn infer_kind(doc: &PolygonDoc) -> Result<PolygonKind> {
    if let Some(kind) = doc.kind.as_deref() {
        return PolygonKind::parse(kind).ok_or_else(|| unknown_name("polygon kind", kind));
    }
    if doc.angle.is_some() {
        Ok(PolygonKind::NonCubic)
    } else if (doc.children.is_some() && doc.parent.is_some()) || doc.level.is_some() {
        Ok(PolygonKind::Cubic)
    } else if (doc.group.is_some() && doc.field.is_some()) || doc.overlay == Some(true) {
        Ok(PolygonKind::Overlay)
    } else if doc.name.is_some() || doc.slant_factor.is_some() {
        Ok(PolygonKind::Bayfill)
    } else {
        Err(DomainError::Reconstruction(format!(
            "unrecognized polygon shape{}",
            doc.id.as_deref().map(|id| format!(" for {}", id)).unwrap_or_default()
        )))
    }
}

fn missing(what: &str, polygon: EntityId) -> DomainError {
    DomainError::Configuration(format!("polygon {} has no {}", polygon, what))
}

/// Cubic edges as read, before the second pass
#[derive(Debug, Default)]
struct CubicEdges {
    parent: Option<Option<String>>,
    children: Option<Vec<String>>,
    level: Option<Vec<i32>>,
}

/// Reconstruct a single polygon; cubic edges are returned unresolved
fn polygon(doc: &PolygonDoc, context: &ReferenceContext) -> Result<(Polygon, Option<CubicEdges>)> {
    let kind = infer_kind(doc)?;
    let id = EntityId::parse_or_new(doc.id.as_deref())?;
    let owner = format!("polygon {}", id);
    let mut common = PolygonCommon::new(doc.order).with_id(id).with_fraction(doc.fraction);
    if let Some(raw) = doc.facies.as_deref() {
        common.facies = Some(context.resolve(Reference::Facies, raw, &owner)?);
    }

    let polygon = match kind {
        PolygonKind::Bayfill => {
            let name = doc.name.as_deref().ok_or_else(|| missing("role name", id))?;
            let role = BayfillRole::parse(name).ok_or_else(|| unknown_name("bayfill role", name))?;
            let slant = doc.slant_factor.as_ref().map(scalar).transpose()?;
            BayfillPolygon::new(common, role, slant)?.into()
        }
        PolygonKind::NonCubic => {
            let angle = doc.angle.as_ref().ok_or_else(|| missing("angle", id))?;
            NonCubicPolygon::new(common, scalar(angle)?).into()
        }
        PolygonKind::Cubic => {
            let edges = CubicEdges {
                parent: doc.parent.clone(),
                children: doc.children.clone(),
                level: doc.level.clone(),
            };
            return Ok((CubicPolygon::new(common).into(), Some(edges)));
        }
        PolygonKind::Overlay => {
            let group = doc.group.as_deref().ok_or_else(|| missing("facies group", id))?;
            let group = context.resolve(Reference::Group, group, &owner)?;
            let center = doc.center.as_ref().ok_or_else(|| missing("center", id))?;
            let mut overlay = OverlayPolygon::new(common, group, scalar(center)?);
            if let Some(Some(raw)) = doc.field.as_ref() {
                overlay.field = Some(context.resolve(Reference::Field, raw, &owner)?);
            }
            overlay.into()
        }
    };
    Ok((polygon, None))
}

fn allowed(rule: RuleKind, polygon: PolygonKind) -> bool {
    matches!(
        (rule, polygon),
        (RuleKind::Bayfill, PolygonKind::Bayfill)
            | (RuleKind::NonCubic, PolygonKind::NonCubic | PolygonKind::Overlay)
            | (RuleKind::Cubic, PolygonKind::Cubic | PolygonKind::Overlay)
    )
}

/// Resolve cubic edges into the rule's polygon map
fn link_cubic(rule: &mut CubicRule, edges: BTreeMap<EntityId, CubicEdges>) -> Result<()> {
    let has_edges = edges.values().any(|e| e.parent.is_some() || e.children.is_some());
    if !has_edges && !edges.is_empty() && edges.values().all(|e| e.level.is_some()) {
        return rebuild_from_levels(rule, edges);
    }

    let resolve = |rule: &CubicRule, raw: &str, owner: EntityId| -> Result<EntityId> {
        let id = EntityId::parse(raw)?;
        if rule.cubic(id).is_none() {
            return Err(DomainError::Reconstruction(format!(
                "cubic polygon {} references {}, which is not a cubic polygon of rule '{}'",
                owner, id, rule.base.name
            )));
        }
        Ok(id)
    };

    for (id, edge) in edges {
        let parent = match edge.parent.flatten() {
            Some(raw) => Some(resolve(&*rule, &raw, id)?),
            None => None,
        };
        let children = edge
            .children
            .unwrap_or_default()
            .iter()
            .map(|raw| resolve(&*rule, raw, id))
            .collect::<Result<Vec<_>>>()?;
        if let Some(node) = rule.base.polygon_mut(id).and_then(Polygon::as_cubic_mut) {
            node.parent = parent;
            node.children = children;
        }
    }
    Ok(())
}

/// Rebuild a slicing tree from template levels, creating the implied root
/// and interior nodes
fn rebuild_from_levels(rule: &mut CubicRule, edges: BTreeMap<EntityId, CubicEdges>) -> Result<()> {
    debug!(rule = %rule.base.name, polygons = edges.len(), "rebuilding cubic tree from levels");

    let mut by_path: BTreeMap<Vec<i32>, EntityId> = BTreeMap::new();
    for (id, edge) in &edges {
        let level = edge.level.clone().unwrap_or_default();
        let depth = CubicRule::at_level(&level);
        let path = level[..depth].to_vec();
        if path.is_empty() {
            return Err(DomainError::Reconstruction(format!(
                "cubic polygon {} has an empty level",
                id
            )));
        }
        if by_path.insert(path.clone(), *id).is_some() {
            return Err(DomainError::Reconstruction(format!(
                "two cubic polygons of rule '{}' share level {:?}",
                rule.base.name, path
            )));
        }
    }

    let root = CubicPolygon::new(PolygonCommon::new(1));
    let root_id = root.common.id;
    rule.base.insert_polygon(root);

    // Shorter paths sort first, so every parent exists before its children
    let mut paths: Vec<Vec<i32>> = by_path.keys().cloned().collect();
    paths.sort_by_key(|p| p.len());
    for path in paths {
        let mut parent = root_id;
        for depth in 1..=path.len() {
            let prefix = &path[..depth];
            let node = match by_path.get(prefix).copied() {
                Some(existing) if rule.cubic(existing).is_some_and(|n| n.parent.is_some()) => existing,
                Some(existing) => {
                    if let Some(n) = rule.base.polygon_mut(existing).and_then(Polygon::as_cubic_mut) {
                        n.parent = Some(parent);
                        n.common.order = prefix[depth - 1];
                    }
                    existing
                }
                None => {
                    let mut interior = CubicPolygon::new(PolygonCommon::new(prefix[depth - 1]));
                    interior.parent = Some(parent);
                    let interior_id = rule.base.insert_polygon(interior);
                    by_path.insert(prefix.to_vec(), interior_id);
                    interior_id
                }
            };
            if let Some(p) = rule.base.polygon_mut(parent).and_then(Polygon::as_cubic_mut) {
                if !p.children.contains(&node) {
                    p.children.push(node);
                }
            }
            parent = node;
        }
    }
    Ok(())
}

/// Reconstruct a truncation rule with its polygons
///
/// # Errors
/// Reconstruction error for unknown names, polygons of the wrong variant,
/// duplicate polygon ids and dangling references
pub fn rule(doc: &RuleDoc, context: &ReferenceContext) -> Result<TruncationRule> {
    let kind = RuleKind::parse(&doc.kind).ok_or_else(|| unknown_name("truncation rule type", &doc.kind))?;
    let owner = format!("truncation rule '{}'", doc.name);
    let mut base = RuleBase::new(parent(&doc.parent)?, doc.name.clone(), 0);
    base.id = EntityId::parse(&doc.id)?;
    base.background_fields = doc
        .background_fields
        .iter()
        .map(|slot| {
            slot.as_deref()
                .map(|raw| context.resolve(Reference::Field, raw, &owner))
                .transpose()
        })
        .collect::<Result<Vec<_>>>()?;
    let slots = kind.background_field_count();
    if base.background_fields.len() < slots {
        base.background_fields.resize(slots, None);
    }

    let mut cubic_edges = BTreeMap::new();
    let mut has_overlay = false;
    for polygon_doc in &doc.polygons {
        let (polygon, edges) = polygon(polygon_doc, context)?;
        if !allowed(kind, polygon.kind()) {
            return Err(DomainError::Reconstruction(format!(
                "{} cannot hold a {} polygon",
                owner,
                polygon.kind().as_str()
            )));
        }
        has_overlay |= polygon.is_overlay();
        let id = polygon.common().id;
        if base.polygons.insert(id, polygon).is_some() {
            return Err(DomainError::Reconstruction(format!(
                "{} has two polygons with id {}",
                owner, id
            )));
        }
        if let Some(edges) = edges {
            cubic_edges.insert(id, edges);
        }
    }

    let overlay = doc.overlay.unwrap_or(has_overlay);
    let rule = match kind {
        RuleKind::Bayfill => TruncationRule::Bayfill(BayfillRule { base }),
        RuleKind::NonCubic => TruncationRule::NonCubic(NonCubicRule { base, overlay }),
        RuleKind::Cubic => {
            let direction = match doc.direction.as_deref() {
                Some(name) => SlicingDirection::parse(name).ok_or_else(|| unknown_name("slicing direction", name))?,
                None => SlicingDirection::default(),
            };
            let mut cubic = CubicRule {
                base,
                overlay,
                direction,
                level_depth: doc.level_depth.unwrap_or(aps_domain::rule::cubic::DEFAULT_LEVEL_DEPTH),
            };
            link_cubic(&mut cubic, cubic_edges)?;
            TruncationRule::Cubic(cubic)
        }
    };
    Ok(rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(json: serde_json::Value) -> PolygonDoc {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_shape_precedence() {
        use serde_json::json;
        assert_eq!(infer_kind(&doc(json!({"angle": 10.0, "level": [1]}))).unwrap(), PolygonKind::NonCubic);
        assert_eq!(infer_kind(&doc(json!({"children": [], "parent": null}))).unwrap(), PolygonKind::Cubic);
        assert_eq!(infer_kind(&doc(json!({"level": [1, 0], "name": "Lagoon"}))).unwrap(), PolygonKind::Cubic);
        assert_eq!(infer_kind(&doc(json!({"group": "g", "field": null}))).unwrap(), PolygonKind::Overlay);
        assert_eq!(infer_kind(&doc(json!({"overlay": true}))).unwrap(), PolygonKind::Overlay);
        assert_eq!(infer_kind(&doc(json!({"slantFactor": 0.5}))).unwrap(), PolygonKind::Bayfill);
        assert_eq!(infer_kind(&doc(json!({"name": "Lagoon"}))).unwrap(), PolygonKind::Bayfill);
    }

    #[test]
    fn test_children_without_parent_is_not_cubic() {
        let shape = doc(serde_json::json!({"children": []}));
        assert!(matches!(infer_kind(&shape), Err(DomainError::Reconstruction(_))));
    }

    #[test]
    fn test_group_without_field_key_is_not_overlay() {
        let shape = doc(serde_json::json!({"group": "g"}));
        assert!(infer_kind(&shape).is_err());
    }

    #[test]
    fn test_explicit_kind_wins() {
        let shape = doc(serde_json::json!({"kind": "bayfill", "angle": 3.0}));
        assert_eq!(infer_kind(&shape).unwrap(), PolygonKind::Bayfill);
        let shape = doc(serde_json::json!({"kind": "hexagonal"}));
        assert!(infer_kind(&shape).is_err());
    }

    #[test]
    fn test_parent_requires_zone() {
        let doc = ParentDoc {
            zone: None,
            region: Some(EntityId::new().to_string()),
        };
        assert!(matches!(parent(&doc), Err(DomainError::Configuration(_))));
    }

    #[test]
    fn test_resolve_reports_dangling_and_malformed() {
        let mut context = ReferenceContext::new();
        let known = EntityId::new();
        context.insert(Reference::Field, known);

        assert_eq!(context.resolve(Reference::Field, &known.to_string(), "rule").unwrap(), known);
        assert!(matches!(
            context.resolve(Reference::Group, &known.to_string(), "rule"),
            Err(DomainError::Reconstruction(_))
        ));
        assert!(matches!(
            context.resolve(Reference::Field, "not-a-uuid", "rule"),
            Err(DomainError::Identity(_))
        ));
    }

    #[test]
    fn test_template_levels_rebuild_tree() {
        let zone = EntityId::new().to_string();
        let rule_doc: RuleDoc = serde_json::from_value(serde_json::json!({
            "id": EntityId::new().to_string(),
            "parent": {"zone": zone, "region": null},
            "name": "template",
            "type": "cubic",
            "backgroundFields": [null, null, null],
            "polygons": [
                {"order": 1, "level": [1, 1, 0]},
                {"order": 2, "level": [1, 2, 0]},
                {"order": 2, "level": [2, 0, 0]}
            ]
        }))
        .unwrap();

        let rule = rule(&rule_doc, &ReferenceContext::new()).unwrap();
        let cubic = rule.as_cubic().unwrap();
        // implied root and the interior [1] node
        assert_eq!(cubic.base.polygons.len(), 5);
        assert_eq!(cubic.roots().len(), 1);
        let levels: Vec<_> = cubic.leaves().iter().map(|id| cubic.level(*id).unwrap()).collect();
        assert_eq!(levels, vec![vec![1, 1, 0], vec![1, 2, 0], vec![2, 0, 0]]);
        assert!(!cubic.status().unmet.contains(&"tree edges are consistent and acyclic"));
    }

    #[test]
    fn test_missing_background_fields_get_empty_slots() {
        let field = EntityId::new();
        let mut context = ReferenceContext::new();
        context.insert(Reference::Field, field);
        for (kind, slots) in [("bayfill", 3), ("non-cubic", 2), ("cubic", 3)] {
            let rule_doc: RuleDoc = serde_json::from_value(serde_json::json!({
                "id": EntityId::new().to_string(),
                "parent": {"zone": EntityId::new().to_string()},
                "name": "bare",
                "type": kind
            }))
            .unwrap();

            let mut rule = rule(&rule_doc, &context).unwrap();
            assert_eq!(rule.base().background_fields, vec![None; slots], "{}", kind);
            rule.base_mut().set_background_field(slots - 1, Some(field)).unwrap();
        }
    }

    #[test]
    fn test_dangling_cubic_child_is_fatal() {
        let zone = EntityId::new().to_string();
        let root = EntityId::new().to_string();
        let rule_doc: RuleDoc = serde_json::from_value(serde_json::json!({
            "id": EntityId::new().to_string(),
            "parent": {"zone": zone, "region": null},
            "name": "broken",
            "type": "cubic",
            "polygons": [
                {"id": root, "order": 1, "parent": null, "children": [EntityId::new().to_string()]}
            ]
        }))
        .unwrap();
        assert!(matches!(
            rule(&rule_doc, &ReferenceContext::new()),
            Err(DomainError::Reconstruction(_))
        ));
    }

    #[test]
    fn test_wrong_polygon_variant_for_rule() {
        let rule_doc: RuleDoc = serde_json::from_value(serde_json::json!({
            "id": EntityId::new().to_string(),
            "parent": {"zone": EntityId::new().to_string()},
            "name": "mixed",
            "type": "bayfill",
            "polygons": [{"order": 1, "angle": 45.0}]
        }))
        .unwrap();
        assert!(matches!(
            rule(&rule_doc, &ReferenceContext::new()),
            Err(DomainError::Reconstruction(_))
        ));
    }
}
