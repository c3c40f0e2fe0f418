//! In-memory project: zones plus id-keyed scoped collections
//!
//! The project is the only owner of entities; everything else refers to
//! them by id. Insertions validate references, and removals cascade so that
//! no dangling reference survives.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use aps_domain::{
    CrossSection, DomainError, Entity, EntityId, Facies, FaciesGroup, GaussianRandomField,
    GlobalFacies, Parent, Region, RuleStatus, Scoped, TruncationRule, Zone,
};
use tracing::{debug, info};

use crate::document::{Document, CURRENT_VERSION};
use crate::error::{Result, StoreError};
use crate::reconstruct::{self, Reference, ReferenceContext};
use crate::flatten;

/// An id-keyed collection, iterated in id order
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    items: BTreeMap<EntityId, T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }
}

impl<T: Entity> Collection<T> {
    /// An empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an item
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.items.get(&id)
    }

    /// Look up an item, mutably
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.items.get_mut(&id)
    }

    /// Whether an item exists
    pub fn contains(&self, id: EntityId) -> bool {
        self.items.contains_key(&id)
    }

    fn insert(&mut self, item: T) -> Option<T> {
        self.items.insert(item.id(), item)
    }

    fn remove(&mut self, id: EntityId) -> Option<T> {
        self.items.remove(&id)
    }

    /// Items in id order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.values_mut()
    }

    /// Ids in order
    pub fn ids(&self) -> Vec<EntityId> {
        self.items.keys().copied().collect()
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Scoped> Collection<T> {
    /// Items whose scope equals `scope`
    pub fn by_parent(&self, scope: &Parent) -> Vec<&T> {
        self.iter().filter(|item| item.is_child_of(scope)).collect()
    }

    /// Ids of the items whose scope equals `scope`
    pub fn ids_in(&self, scope: &Parent) -> Vec<EntityId> {
        self.by_parent(scope).iter().map(|item| item.id()).collect()
    }

    /// Ids of every item scoped anywhere under `zone`
    pub fn ids_under_zone(&self, zone: EntityId) -> Vec<EntityId> {
        self.iter()
            .filter(|item| item.parent().zone == zone)
            .map(|item| item.id())
            .collect()
    }
}

/// The scoped collections that duplication and clearing operate on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectionKind {
    /// Gaussian random fields
    Fields,
    /// Scoped facies
    Facies,
    /// Facies groups
    Groups,
    /// Truncation rules
    Rules,
}

impl CollectionKind {
    /// Dependency order: later kinds refer to earlier ones
    pub const DEPENDENCY_ORDER: [CollectionKind; 4] = [
        CollectionKind::Fields,
        CollectionKind::Facies,
        CollectionKind::Groups,
        CollectionKind::Rules,
    ];

    /// Get the collection name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Fields => "gaussianRandomFields",
            CollectionKind::Facies => "facies",
            CollectionKind::Groups => "facies/groups",
            CollectionKind::Rules => "truncationRules",
        }
    }
}

/// Item counts per scoped collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeCounts {
    /// Gaussian random fields
    pub fields: usize,
    /// Scoped facies
    pub facies: usize,
    /// Facies groups
    pub groups: usize,
    /// Truncation rules
    pub rules: usize,
}

impl ScopeCounts {
    /// Count for one collection
    pub fn get(&self, kind: CollectionKind) -> usize {
        match kind {
            CollectionKind::Fields => self.fields,
            CollectionKind::Facies => self.facies,
            CollectionKind::Groups => self.groups,
            CollectionKind::Rules => self.rules,
        }
    }

    /// Mutable count for one collection
    pub fn get_mut(&mut self, kind: CollectionKind) -> &mut usize {
        match kind {
            CollectionKind::Fields => &mut self.fields,
            CollectionKind::Facies => &mut self.facies,
            CollectionKind::Groups => &mut self.groups,
            CollectionKind::Rules => &mut self.rules,
        }
    }

    /// Sum over collections
    pub fn total(&self) -> usize {
        self.fields + self.facies + self.groups + self.rules
    }

    /// Add another set of counts
    pub fn add(&mut self, other: &ScopeCounts) {
        for kind in CollectionKind::DEPENDENCY_ORDER {
            *self.get_mut(kind) += other.get(kind);
        }
    }
}

fn not_found(what: &str, id: EntityId) -> DomainError {
    DomainError::NotFound(format!("{} {}", what, id))
}

/// A facies modeling project
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    zones: Vec<Zone>,
    cross_sections: Collection<CrossSection>,
    global_facies: Collection<GlobalFacies>,
    facies: Collection<Facies>,
    groups: Collection<FaciesGroup>,
    fields: Collection<GaussianRandomField>,
    rules: Collection<TruncationRule>,
}

impl Project {
    /// An empty project
    pub fn new() -> Self {
        Self::default()
    }

    // --- persistence -----------------------------------------------------

    /// Reconstruct a project from a document
    ///
    /// # Errors
    /// Any reconstruction or insertion failure aborts the load
    pub fn from_document(document: &Document) -> Result<Self> {
        if document.version > CURRENT_VERSION {
            return Err(StoreError::UnsupportedVersion(document.version));
        }
        let context = ReferenceContext::from_document(document);
        let mut project = Self::new();

        for doc in &document.zones {
            project.add_zone(reconstruct::zone(doc)?)?;
        }
        for doc in &document.cross_sections {
            project.insert_cross_section(reconstruct::cross_section(doc)?)?;
        }
        for doc in &document.global_facies {
            project.insert_global_facies(reconstruct::global_facies(doc)?)?;
        }
        for doc in &document.facies {
            project.insert_facies(reconstruct::facies(doc, &context)?)?;
        }
        for doc in &document.facies_groups {
            project.insert_group(reconstruct::facies_group(doc, &context)?)?;
        }
        for doc in &document.fields {
            project.insert_field(reconstruct::field(doc, &context)?)?;
        }
        for doc in &document.rules {
            project.insert_rule(reconstruct::rule(doc, &context)?)?;
        }
        Ok(project)
    }

    /// Flatten the project; collections other than zones are sorted by id
    pub fn to_document(&self) -> Document {
        let mut document = Document {
            version: CURRENT_VERSION,
            zones: self.zones.iter().map(flatten::zone).collect(),
            cross_sections: self.cross_sections.iter().map(flatten::cross_section).collect(),
            global_facies: self.global_facies.iter().map(flatten::global_facies).collect(),
            facies: self.facies.iter().map(flatten::facies).collect(),
            facies_groups: self.groups.iter().map(flatten::facies_group).collect(),
            fields: self.fields.iter().map(flatten::field).collect(),
            rules: self.rules.iter().map(flatten::rule).collect(),
        };
        document.sort();
        document
    }

    /// Parse and reconstruct a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let document: Document = serde_json::from_str(json)?;
        Self::from_document(&document)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    /// Load a project file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let project = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            zones = project.zones.len(),
            rules = project.rules.len(),
            "loaded project"
        );
        Ok(project)
    }

    /// Save the project as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), "saved project");
        Ok(())
    }

    /// Ids of every entity, per collection
    pub fn reference_context(&self) -> ReferenceContext {
        let mut context = ReferenceContext::new();
        for id in self.cross_sections.ids() {
            context.insert(Reference::CrossSection, id);
        }
        for id in self.global_facies.ids() {
            context.insert(Reference::GlobalFacies, id);
        }
        for id in self.facies.ids() {
            context.insert(Reference::Facies, id);
        }
        for id in self.groups.ids() {
            context.insert(Reference::Group, id);
        }
        for id in self.fields.ids() {
            context.insert(Reference::Field, id);
        }
        context
    }

    // --- lookups ---------------------------------------------------------

    /// Zones, in insertion order
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Look up a zone
    pub fn zone(&self, id: EntityId) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    /// Look up a zone, mutably
    pub fn zone_mut(&mut self, id: EntityId) -> Option<&mut Zone> {
        self.zones.iter_mut().find(|z| z.id == id)
    }

    /// Look up a zone by code
    pub fn zone_by_code(&self, code: i32) -> Option<&Zone> {
        self.zones.iter().find(|z| z.code == code)
    }

    /// Look up a region
    pub fn region(&self, zone: EntityId, region: EntityId) -> Option<&Region> {
        self.zone(zone).and_then(|z| z.region(region))
    }

    /// Resolve a scope from zone and region codes
    pub fn scope_by_codes(&self, zone: i32, region: Option<i32>) -> Option<Parent> {
        let zone = self.zone_by_code(zone)?;
        match region {
            Some(code) => zone.region_by_code(code).map(Region::scope),
            None => Some(zone.scope()),
        }
    }

    /// Whether the scope names an existing zone, and region if given
    pub fn scope_exists(&self, scope: &Parent) -> bool {
        self.zone(scope.zone).is_some_and(|z| z.owns_scope(scope))
    }

    /// Every scope entities may live in, zone by zone
    pub fn scopes(&self) -> Vec<Parent> {
        self.zones.iter().flat_map(Zone::scopes).collect()
    }

    /// The cross-section of a scope
    pub fn cross_section_for(&self, scope: &Parent) -> Option<&CrossSection> {
        self.cross_sections.by_parent(scope).into_iter().next()
    }

    /// Cross-sections
    pub fn cross_sections(&self) -> &Collection<CrossSection> {
        &self.cross_sections
    }

    /// Global facies
    pub fn global_facies(&self) -> &Collection<GlobalFacies> {
        &self.global_facies
    }

    /// Scoped facies
    pub fn facies(&self) -> &Collection<Facies> {
        &self.facies
    }

    /// Facies groups
    pub fn groups(&self) -> &Collection<FaciesGroup> {
        &self.groups
    }

    /// Gaussian random fields
    pub fn fields(&self) -> &Collection<GaussianRandomField> {
        &self.fields
    }

    /// Truncation rules
    pub fn rules(&self) -> &Collection<TruncationRule> {
        &self.rules
    }

    /// Look up a rule, mutably
    ///
    /// References added through the returned rule are not validated until
    /// the project is saved and reloaded.
    pub fn rule_mut(&mut self, id: EntityId) -> Option<&mut TruncationRule> {
        self.rules.get_mut(id)
    }

    /// Look up a field, mutably
    pub fn field_mut(&mut self, id: EntityId) -> Option<&mut GaussianRandomField> {
        self.fields.get_mut(id)
    }

    /// Look up a facies, mutably
    pub fn facies_mut(&mut self, id: EntityId) -> Option<&mut Facies> {
        self.facies.get_mut(id)
    }

    /// Item counts at exactly `scope`
    pub fn counts(&self, scope: &Parent) -> ScopeCounts {
        ScopeCounts {
            fields: self.fields.by_parent(scope).len(),
            facies: self.facies.by_parent(scope).len(),
            groups: self.groups.by_parent(scope).len(),
            rules: self.rules.by_parent(scope).len(),
        }
    }

    /// Readiness of every rule, in id order
    pub fn rule_statuses(&self) -> Vec<(&TruncationRule, RuleStatus)> {
        self.rules.iter().map(|rule| (rule, rule.status())).collect()
    }

    // --- insertion -------------------------------------------------------

    fn require_scope(&self, scope: &Parent, owner: &str) -> Result<()> {
        if !self.scope_exists(scope) {
            return Err(DomainError::NotFound(format!("scope {} of {}", scope, owner)).into());
        }
        Ok(())
    }

    /// Add a zone
    ///
    /// # Errors
    /// Conflict when the id or code is taken
    pub fn add_zone(&mut self, zone: Zone) -> Result<EntityId> {
        if self.zones.iter().any(|z| z.id == zone.id || z.code == zone.code) {
            return Err(DomainError::Conflict(format!(
                "a zone with id {} or code {} already exists",
                zone.id, zone.code
            ))
            .into());
        }
        let id = zone.id;
        self.zones.push(zone);
        Ok(id)
    }

    /// Insert or replace a cross-section
    ///
    /// # Errors
    /// NotFound for an unknown scope, Conflict when the scope already has
    /// another cross-section
    pub fn insert_cross_section(&mut self, section: CrossSection) -> Result<EntityId> {
        self.require_scope(&section.parent, "cross-section")?;
        if let Some(existing) = self.cross_section_for(&section.parent) {
            if existing.id != section.id {
                return Err(DomainError::Conflict(format!(
                    "scope {} already has cross-section {}",
                    section.parent, existing.id
                ))
                .into());
            }
        }
        let id = section.id;
        self.cross_sections.insert(section);
        Ok(id)
    }

    /// Insert or replace a global facies
    ///
    /// # Errors
    /// Conflict when another global facies has the same code
    pub fn insert_global_facies(&mut self, facies: GlobalFacies) -> Result<EntityId> {
        if let Some(other) = self
            .global_facies
            .iter()
            .find(|g| g.code == facies.code && g.id != facies.id)
        {
            return Err(DomainError::Conflict(format!(
                "facies code {} is already used by '{}'",
                facies.code.value(),
                other.name
            ))
            .into());
        }
        let id = facies.id;
        self.global_facies.insert(facies);
        Ok(id)
    }

    /// Insert or replace a scoped facies
    ///
    /// # Errors
    /// NotFound for an unknown scope or global facies, Conflict when the
    /// scope already uses that global facies
    pub fn insert_facies(&mut self, facies: Facies) -> Result<EntityId> {
        self.require_scope(&facies.parent, "facies")?;
        if !self.global_facies.contains(facies.global) {
            return Err(not_found("global facies", facies.global).into());
        }
        if self
            .facies
            .by_parent(&facies.parent)
            .iter()
            .any(|f| f.global == facies.global && f.id != facies.id)
        {
            return Err(DomainError::Conflict(format!(
                "scope {} already uses global facies {}",
                facies.parent, facies.global
            ))
            .into());
        }
        let id = facies.id;
        self.facies.insert(facies);
        Ok(id)
    }

    fn check_group_member(&self, group: &FaciesGroup, facies: EntityId) -> Result<()> {
        let member = self.facies.get(facies).ok_or_else(|| not_found("facies", facies))?;
        if member.parent != group.parent {
            return Err(DomainError::Conflict(format!(
                "facies {} is scoped to {}, not {}",
                facies, member.parent, group.parent
            ))
            .into());
        }
        if let Some(other) = self
            .groups
            .by_parent(&group.parent)
            .into_iter()
            .find(|g| g.id != group.id && g.contains(facies))
        {
            return Err(DomainError::Conflict(format!(
                "facies {} already belongs to group {}",
                facies, other.id
            ))
            .into());
        }
        Ok(())
    }

    /// Insert or replace a facies group
    ///
    /// # Errors
    /// NotFound for an unknown scope or member, Conflict when a member is in
    /// another scope or another group of the same scope
    pub fn insert_group(&mut self, group: FaciesGroup) -> Result<EntityId> {
        self.require_scope(&group.parent, "facies group")?;
        for facies in group.facies() {
            self.check_group_member(&group, *facies)?;
        }
        let id = group.id;
        self.groups.insert(group);
        Ok(id)
    }

    /// Add a facies to a group; returns false when already a member
    ///
    /// # Errors
    /// As for [`insert_group`](Self::insert_group)
    pub fn add_to_group(&mut self, group: EntityId, facies: EntityId) -> Result<bool> {
        let current = self.groups.get(group).ok_or_else(|| not_found("facies group", group))?;
        self.check_group_member(current, facies)?;
        Ok(self
            .groups
            .get_mut(group)
            .is_some_and(|g| g.add(facies)))
    }

    /// Insert or replace a Gaussian random field
    ///
    /// # Errors
    /// NotFound for an unknown scope or cross-section, Conflict when the
    /// cross-section belongs to another scope
    pub fn insert_field(&mut self, field: GaussianRandomField) -> Result<EntityId> {
        self.require_scope(&field.parent, "field")?;
        let section = self
            .cross_sections
            .get(field.cross_section)
            .ok_or_else(|| not_found("cross-section", field.cross_section))?;
        if section.parent != field.parent {
            return Err(DomainError::Conflict(format!(
                "cross-section {} belongs to {}, not to field '{}' in {}",
                section.id, section.parent, field.name, field.parent
            ))
            .into());
        }
        let id = field.id;
        self.fields.insert(field);
        Ok(id)
    }

    fn check_rule_references(&self, rule: &TruncationRule) -> Result<()> {
        let scope = rule.base().parent;
        let in_scope = |found: Option<&Parent>, what: &str, id: EntityId| -> Result<()> {
            match found {
                None => Err(not_found(what, id).into()),
                Some(p) if *p != scope => Err(DomainError::Conflict(format!(
                    "rule '{}' in {} refers to {} {} in {}",
                    rule.name(),
                    scope,
                    what,
                    id,
                    p
                ))
                .into()),
                Some(_) => Ok(()),
            }
        };
        for field in rule.base().assigned_background_fields() {
            in_scope(self.fields.get(field).map(|f| &f.parent), "field", field)?;
        }
        for polygon in rule.base().polygons.values() {
            if let Some(facies) = polygon.facies() {
                in_scope(self.facies.get(facies).map(|f| &f.parent), "facies", facies)?;
            }
            if let Some(overlay) = polygon.as_overlay() {
                in_scope(self.groups.get(overlay.group).map(|g| &g.parent), "facies group", overlay.group)?;
                if let Some(field) = overlay.field {
                    in_scope(self.fields.get(field).map(|f| &f.parent), "field", field)?;
                }
            }
        }
        Ok(())
    }

    /// Insert or replace a truncation rule
    ///
    /// Readiness is not required; only references are checked.
    ///
    /// # Errors
    /// NotFound for an unknown scope or reference, Conflict for a reference
    /// into another scope
    pub fn insert_rule(&mut self, rule: TruncationRule) -> Result<EntityId> {
        self.require_scope(&rule.base().parent, "truncation rule")?;
        self.check_rule_references(&rule)?;
        let id = rule.id();
        self.rules.insert(rule);
        Ok(id)
    }

    // --- removal ---------------------------------------------------------

    /// Remove a rule
    pub fn remove_rule(&mut self, id: EntityId) -> Option<TruncationRule> {
        self.rules.remove(id)
    }

    /// Remove a field, unassigning it from every rule
    pub fn remove_field(&mut self, id: EntityId) -> Option<GaussianRandomField> {
        let field = self.fields.remove(id)?;
        let mut stripped = 0;
        for rule in self.rules.iter_mut() {
            if rule.base_mut().strip_field(id) {
                stripped += 1;
            }
        }
        debug!(field = %id, rules = stripped, "removed field");
        Some(field)
    }

    /// Remove a facies group, deleting the overlay polygons over it
    pub fn remove_group(&mut self, id: EntityId) -> Option<FaciesGroup> {
        let group = self.groups.remove(id)?;
        for rule in self.rules.iter_mut() {
            rule.base_mut().remove_overlays_for_group(id);
        }
        Some(group)
    }

    /// Remove a scoped facies, clearing polygons that map to it and dropping
    /// it from its group
    pub fn remove_facies(&mut self, id: EntityId) -> Option<Facies> {
        let facies = self.facies.remove(id)?;
        for rule in self.rules.iter_mut() {
            rule.base_mut().strip_facies(id);
        }
        for group in self.groups.iter_mut() {
            group.remove(id);
        }
        Some(facies)
    }

    /// Remove a global facies and every scoped usage of it
    pub fn remove_global_facies(&mut self, id: EntityId) -> Option<GlobalFacies> {
        let global = self.global_facies.remove(id)?;
        let usages: Vec<EntityId> = self
            .facies
            .iter()
            .filter(|f| f.global == id)
            .map(|f| f.id)
            .collect();
        for usage in usages {
            self.remove_facies(usage);
        }
        Some(global)
    }

    /// Remove a cross-section
    ///
    /// # Errors
    /// Conflict while a field still uses it
    pub fn remove_cross_section(&mut self, id: EntityId) -> Result<Option<CrossSection>> {
        if let Some(field) = self.fields.iter().find(|f| f.cross_section == id) {
            return Err(DomainError::Conflict(format!(
                "cross-section {} is used by field '{}'",
                id, field.name
            ))
            .into());
        }
        Ok(self.cross_sections.remove(id))
    }

    /// Remove the items of the given kinds at exactly `scope`
    ///
    /// Runs in reverse dependency order (rules, groups, facies, fields) so
    /// nothing is removed while something else still refers to it.
    pub fn clear_scope(&mut self, scope: &Parent, kinds: &[CollectionKind]) -> ScopeCounts {
        let mut removed = ScopeCounts::default();
        for kind in CollectionKind::DEPENDENCY_ORDER.iter().rev() {
            if !kinds.contains(kind) {
                continue;
            }
            let count = match kind {
                CollectionKind::Rules => {
                    let ids = self.rules.ids_in(scope);
                    ids.into_iter().filter_map(|id| self.remove_rule(id)).count()
                }
                CollectionKind::Groups => {
                    let ids = self.groups.ids_in(scope);
                    ids.into_iter().filter_map(|id| self.remove_group(id)).count()
                }
                CollectionKind::Facies => {
                    let ids = self.facies.ids_in(scope);
                    ids.into_iter().filter_map(|id| self.remove_facies(id)).count()
                }
                CollectionKind::Fields => {
                    let ids = self.fields.ids_in(scope);
                    ids.into_iter().filter_map(|id| self.remove_field(id)).count()
                }
            };
            *removed.get_mut(*kind) += count;
        }
        removed
    }

    fn clear_scope_entirely(&mut self, scope: &Parent) -> ScopeCounts {
        let removed = self.clear_scope(scope, &CollectionKind::DEPENDENCY_ORDER);
        for id in self.cross_sections.ids_in(scope) {
            self.cross_sections.remove(id);
        }
        removed
    }

    /// Remove a region and everything scoped to it
    ///
    /// # Errors
    /// NotFound for an unknown zone or region
    pub fn remove_region(&mut self, zone: EntityId, region: EntityId) -> Result<Region> {
        if self.region(zone, region).is_none() {
            return Err(not_found("region", region).into());
        }
        let removed = self.clear_scope_entirely(&Parent::region(zone, region));
        debug!(region = %region, items = removed.total(), "removing region");
        self.zone_mut(zone)
            .and_then(|z| z.remove_region(region))
            .ok_or_else(|| not_found("region", region).into())
    }

    /// Remove a zone and everything scoped under it
    ///
    /// # Errors
    /// NotFound for an unknown zone
    pub fn remove_zone(&mut self, zone: EntityId) -> Result<Zone> {
        let target = self.zone(zone).ok_or_else(|| not_found("zone", zone))?;
        let mut scopes = target.scopes();
        if target.has_regions() {
            scopes.push(target.scope());
        }
        for scope in scopes {
            self.clear_scope_entirely(&scope);
        }
        let index = self
            .zones
            .iter()
            .position(|z| z.id == zone)
            .ok_or_else(|| not_found("zone", zone))?;
        Ok(self.zones.remove(index))
    }
}
