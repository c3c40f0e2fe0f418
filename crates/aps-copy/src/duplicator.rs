//! Scope duplication

use std::collections::BTreeSet;

use aps_domain::{CrossSection, DomainError, EntityId, FaciesGroup, Parent};
use aps_store::{
    flatten, reconstruct, CollectionKind, Document, Project, Reference, ScopeCounts,
};
use tracing::{debug, info};

use crate::rewrite::IdRewriter;
use crate::{CopyConfig, CopyError, CopyReport, Result};

/// Copies the scoped items of one zone or region into another
///
/// Every copy gets a fresh id, and references among the copied items are
/// rewritten to point at the copies. The target's existing items of the
/// copied kinds are replaced.
///
/// # Examples
///
/// ```no_run
/// use aps_copy::{CopyConfig, Duplicator};
/// use aps_store::Project;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut project = Project::load("model.aps.json")?;
/// let source = project.scope_by_codes(1, None).ok_or("no zone 1")?;
/// let target = project.scope_by_codes(2, None).ok_or("no zone 2")?;
///
/// let report = Duplicator::new(CopyConfig::default()).duplicate(&mut project, &source, &target)?;
/// println!("{}", report.summary());
/// # Ok(())
/// # }
/// ```
pub struct Duplicator {
    config: CopyConfig,
}

impl Duplicator {
    /// Create a duplicator with the given configuration
    pub fn new(config: CopyConfig) -> Self {
        Self { config }
    }

    /// Create a duplicator with default configuration
    pub fn default_config() -> Self {
        Self::new(CopyConfig::default())
    }

    /// The configuration in use
    pub fn config(&self) -> &CopyConfig {
        &self.config
    }

    /// Copy everything at `source` into `target`
    ///
    /// When `target` is a zone with regions the copy is made once per
    /// region. All work happens on a scratch copy of the project, which
    /// replaces the project only when every target succeeded and this is
    /// not a dry run.
    ///
    /// # Errors
    /// - Configuration when a scope does not exist or nothing is included
    /// - Conflict when source and target coincide, or a binding cannot be
    ///   made in the target
    /// - Store errors when the rewritten items cannot be reconstructed
    pub fn duplicate(&self, project: &mut Project, source: &Parent, target: &Parent) -> Result<CopyReport> {
        self.config.validate()?;
        for (scope, role) in [(source, "source"), (target, "target")] {
            if !project.scope_exists(scope) {
                return Err(DomainError::Configuration(format!("{} scope {} does not exist", role, scope)).into());
            }
        }

        let targets = self.target_scopes(project, target)?;
        if targets.contains(source) {
            return Err(CopyError::Conflict(format!("cannot copy scope {} onto itself", source)));
        }

        let mut working = project.clone();
        let mut report = CopyReport::new(self.config.dry_run);
        for scope in targets {
            let scope_report = self.copy_into(&mut working, source, &scope)?;
            debug!(
                target = %scope,
                copied = scope_report.total_copied(),
                removed = scope_report.total_removed(),
                "copied scope"
            );
            report.record_scope(scope, scope_report);
        }

        info!(
            source = %source,
            targets = report.scopes.len(),
            copied = report.total_copied(),
            dry_run = self.config.dry_run,
            "duplicate complete"
        );
        if !self.config.dry_run {
            *project = working;
        }
        Ok(report)
    }

    fn target_scopes(&self, project: &Project, target: &Parent) -> Result<Vec<Parent>> {
        let zone = project
            .zone(target.zone)
            .ok_or_else(|| DomainError::NotFound(format!("zone {}", target.zone)))?;
        if target.region.is_some() || !zone.has_regions() {
            return Ok(vec![*target]);
        }
        if !self.config.recurse_into_regions {
            return Err(CopyError::Conflict(format!(
                "zone '{}' has regions; its items live in the regions",
                zone.name
            )));
        }
        Ok(zone.scopes())
    }

    /// Flatten the included source items into one document
    fn select(&self, project: &Project, source: &Parent) -> Document {
        let mut document = Document::default();
        for kind in self.config.kinds() {
            match kind {
                CollectionKind::Fields => {
                    document.fields = project.fields().by_parent(source).into_iter().map(flatten::field).collect();
                }
                CollectionKind::Facies => {
                    document.facies = project.facies().by_parent(source).into_iter().map(flatten::facies).collect();
                }
                CollectionKind::Groups => {
                    document.facies_groups = project
                        .groups()
                        .by_parent(source)
                        .into_iter()
                        .map(flatten::facies_group)
                        .collect();
                }
                CollectionKind::Rules => {
                    document.rules = project.rules().by_parent(source).into_iter().map(flatten::rule).collect();
                }
            }
        }
        document
    }

    /// Point references to excluded kinds at the target's counterparts
    ///
    /// Facies match by global facies, fields by name, and groups by the
    /// global facies of their members.
    fn redirect_excluded(&self, project: &Project, source: &Parent, target: &Parent, rewriter: &mut IdRewriter) {
        if !self.config.include_facies {
            for facies in project.facies().by_parent(source) {
                if let Some(counterpart) = project
                    .facies()
                    .by_parent(target)
                    .into_iter()
                    .find(|f| f.global == facies.global)
                {
                    rewriter.redirect(facies.id, counterpart.id);
                }
            }
        }
        if !self.config.include_fields {
            for field in project.fields().by_parent(source) {
                if let Some(counterpart) = project
                    .fields()
                    .by_parent(target)
                    .into_iter()
                    .find(|f| f.name == field.name)
                {
                    rewriter.redirect(field.id, counterpart.id);
                }
            }
        }
        if !self.config.include_groups {
            let members = |group: &FaciesGroup| -> BTreeSet<EntityId> {
                group
                    .facies()
                    .iter()
                    .filter_map(|id| project.facies().get(*id).map(|f| f.global))
                    .collect()
            };
            for group in project.groups().by_parent(source) {
                let key = members(group);
                if let Some(counterpart) = project
                    .groups()
                    .by_parent(target)
                    .into_iter()
                    .find(|g| members(g) == key)
                {
                    rewriter.redirect(group.id, counterpart.id);
                }
            }
        }
    }

    /// Bind copied fields to the target's cross-section
    ///
    /// Returns the cross-section to create, if the target has none.
    fn bind_cross_section(
        &self,
        project: &Project,
        document: &Document,
        target: &Parent,
        rewriter: &mut IdRewriter,
    ) -> Result<Option<CrossSection>> {
        let used: BTreeSet<&str> = document.fields.iter().map(|f| f.cross_section.as_str()).collect();
        let Some(first) = used.iter().next() else {
            return Ok(None);
        };

        let (section, created) = match project.cross_section_for(target) {
            Some(existing) => (existing.id, None),
            None if self.config.create_missing_cross_sections => {
                let model = project
                    .cross_sections()
                    .get(EntityId::parse(first)?)
                    .ok_or_else(|| DomainError::NotFound(format!("cross-section {}", first)))?;
                let section = CrossSection::new(*target, model.kind, model.relative_position())?;
                (section.id, Some(section))
            }
            None => {
                return Err(CopyError::Conflict(format!(
                    "target scope {} has no cross-section for the copied fields",
                    target
                )))
            }
        };
        for old in used {
            rewriter.redirect(EntityId::parse(old)?, section);
        }
        Ok(created)
    }

    fn copy_into(&self, working: &mut Project, source: &Parent, target: &Parent) -> Result<CopyReport> {
        let kinds = self.config.kinds();
        let mut document = self.select(working, source);

        let mut rewriter = IdRewriter::new();
        rewriter.assign_document(&document);
        self.redirect_excluded(working, source, target, &mut rewriter);
        let created = self.bind_cross_section(working, &document, target, &mut rewriter)?;
        rewriter.rewrite_document(&mut document, &flatten::parent(target));

        let mut context = working.reference_context();
        context.extend_from_document(&document);
        if let Some(section) = &created {
            context.insert(Reference::CrossSection, section.id);
        }

        // Reconstruct everything before the target is touched
        let fields = document
            .fields
            .iter()
            .map(|doc| reconstruct::field(doc, &context))
            .collect::<aps_domain::Result<Vec<_>>>()?;
        let facies = document
            .facies
            .iter()
            .map(|doc| reconstruct::facies(doc, &context))
            .collect::<aps_domain::Result<Vec<_>>>()?;
        let groups = document
            .facies_groups
            .iter()
            .map(|doc| reconstruct::facies_group(doc, &context))
            .collect::<aps_domain::Result<Vec<_>>>()?;
        let rules = document
            .rules
            .iter()
            .map(|doc| reconstruct::rule(doc, &context))
            .collect::<aps_domain::Result<Vec<_>>>()?;

        let mut report = CopyReport::new(self.config.dry_run);
        report.id_map.insert(*target, rewriter.id_map()?);
        report.copied = ScopeCounts {
            fields: fields.len(),
            facies: facies.len(),
            groups: groups.len(),
            rules: rules.len(),
        };
        report.cross_sections_created = usize::from(created.is_some());

        report.removed = working.clear_scope(target, &kinds);
        if let Some(section) = created {
            working.insert_cross_section(section)?;
        }
        for field in fields {
            working.insert_field(field)?;
        }
        for f in facies {
            working.insert_facies(f)?;
        }
        for group in groups {
            working.insert_group(group)?;
        }
        for rule in rules {
            working.insert_rule(rule)?;
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aps_domain::{
        Conformity, CrossSectionType, Facies, FmuUpdatable, GaussianRandomField, GlobalFacies,
        NonCubicPolygon, NonCubicRule, OverlayCapable, OverlayPolygon, PolygonCommon, Scoped, Zone,
    };

    struct Fixture {
        project: Project,
        source: Parent,
        target: Parent,
        field: EntityId,
    }

    fn fixture() -> Fixture {
        let mut project = Project::new();
        let upper = Zone::new("Upper", 1, 10.0, Conformity::Proportional).unwrap();
        let lower = Zone::new("Lower", 2, 10.0, Conformity::Proportional).unwrap();
        let (source, target) = (upper.scope(), lower.scope());
        project.add_zone(upper).unwrap();
        project.add_zone(lower).unwrap();

        let section = project
            .insert_cross_section(CrossSection::new(source, CrossSectionType::JK, 0.75).unwrap())
            .unwrap();
        let global = project
            .insert_global_facies(GlobalFacies::new("Sand", 1.0, "yellow").unwrap())
            .unwrap();
        let facies = project.insert_facies(Facies::new(source, global)).unwrap();
        let group = project.insert_group(FaciesGroup::new(source, [facies])).unwrap();
        let field = project
            .insert_field(GaussianRandomField::new(source, "GRF1", section).unwrap())
            .unwrap();
        let other = project
            .insert_field(GaussianRandomField::new(source, "GRF2", section).unwrap())
            .unwrap();
        let auxiliary = project
            .insert_field(GaussianRandomField::new(source, "GRF3", section).unwrap())
            .unwrap();

        let mut rule = NonCubicRule::new(source, "rule");
        rule.base.set_background_field(0, Some(field)).unwrap();
        rule.base.set_background_field(1, Some(other)).unwrap();
        rule.add_polygon(NonCubicPolygon::new(
            PolygonCommon::new(1).with_facies(facies),
            FmuUpdatable::fixed(0.0),
        ));
        rule.add_overlay_polygon(
            OverlayPolygon::new(PolygonCommon::new(2).with_facies(facies), group, FmuUpdatable::fixed(0.0))
                .with_field(auxiliary),
        );
        project.insert_rule(rule.into()).unwrap();

        Fixture {
            project,
            source,
            target,
            field,
        }
    }

    #[test]
    fn test_duplicate_creates_fresh_ids() {
        let mut f = fixture();
        let report = Duplicator::default_config()
            .duplicate(&mut f.project, &f.source, &f.target)
            .unwrap();

        assert_eq!(report.copied.total(), 6);
        assert_eq!(report.cross_sections_created, 1);
        let copy = report.copy_of(&f.target, f.field).unwrap();
        assert_ne!(copy, f.field);

        let field = f.project.fields().get(copy).unwrap();
        assert_eq!(*field.parent(), f.target);
        assert_eq!(
            Some(field.cross_section),
            f.project.cross_section_for(&f.target).map(|s| s.id)
        );
    }

    #[test]
    fn test_copied_references_resolve_in_target() {
        let mut f = fixture();
        Duplicator::default_config()
            .duplicate(&mut f.project, &f.source, &f.target)
            .unwrap();

        let rule = f.project.rules().by_parent(&f.target)[0];
        for field in rule.fields().into_iter().flatten() {
            assert_eq!(*f.project.fields().get(field).unwrap().parent(), f.target);
        }
        for overlay in rule.overlay_polygons() {
            assert_eq!(*f.project.groups().get(overlay.group).unwrap().parent(), f.target);
        }
        assert!(rule.ready());
    }

    #[test]
    fn test_second_copy_replaces_first() {
        let mut f = fixture();
        let duplicator = Duplicator::default_config();
        duplicator.duplicate(&mut f.project, &f.source, &f.target).unwrap();
        let report = duplicator.duplicate(&mut f.project, &f.source, &f.target).unwrap();

        assert_eq!(report.removed.total(), 6);
        assert_eq!(report.cross_sections_created, 0);
        assert_eq!(f.project.counts(&f.target), f.project.counts(&f.source));
    }

    #[test]
    fn test_dry_run_leaves_project() {
        let mut f = fixture();
        let before = f.project.clone();
        let config = CopyConfig {
            dry_run: true,
            ..CopyConfig::default()
        };
        let report = Duplicator::new(config)
            .duplicate(&mut f.project, &f.source, &f.target)
            .unwrap();

        assert_eq!(report.copied.total(), 6);
        assert_eq!(f.project, before);
    }

    #[test]
    fn test_strict_without_cross_section_conflicts() {
        let mut f = fixture();
        let before = f.project.clone();
        let result = Duplicator::new(CopyConfig::strict()).duplicate(&mut f.project, &f.source, &f.target);

        assert!(matches!(result, Err(CopyError::Conflict(_))));
        assert_eq!(f.project, before);
    }

    #[test]
    fn test_onto_itself_conflicts() {
        let mut f = fixture();
        let result = Duplicator::default_config().duplicate(&mut f.project, &f.source, &f.source);
        assert!(matches!(result, Err(CopyError::Conflict(_))));
    }

    #[test]
    fn test_unknown_scope_is_configuration_error() {
        let mut f = fixture();
        let missing = Parent::zone(EntityId::new());
        let err = Duplicator::default_config()
            .duplicate(&mut f.project, &f.source, &missing)
            .unwrap_err();
        assert!(matches!(err.domain(), Some(DomainError::Configuration(_))));
    }
}
