//! Structural id rewriting over flat documents
//!
//! Only fields that hold an id are touched. Ids not in the map pass through
//! unchanged, so references to project-wide entities such as global facies
//! survive the copy.

use std::collections::BTreeMap;

use aps_domain::EntityId;
use aps_store::document::{Document, ParentDoc, PolygonDoc, RuleDoc};

use crate::Result;

/// Old id to new id mapping applied to a document
#[derive(Debug, Clone, Default)]
pub struct IdRewriter {
    fresh: BTreeMap<String, String>,
    redirects: BTreeMap<String, String>,
}

impl IdRewriter {
    /// Create an empty rewriter
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh id for `old`; assigning the same id twice keeps the first
    pub fn assign(&mut self, old: &str) -> String {
        self.fresh
            .entry(old.to_string())
            .or_insert_with(|| EntityId::new().to_string())
            .clone()
    }

    /// Point references to `old` at an existing entity instead of a copy
    pub fn redirect(&mut self, old: EntityId, new: EntityId) {
        self.redirects.insert(old.to_string(), new.to_string());
    }

    /// Mint fresh ids for every entity and polygon of the document
    pub fn assign_document(&mut self, document: &Document) {
        for doc in &document.fields {
            self.assign(&doc.id);
        }
        for doc in &document.facies {
            self.assign(&doc.id);
        }
        for doc in &document.facies_groups {
            self.assign(&doc.id);
        }
        for rule in &document.rules {
            self.assign(&rule.id);
            for polygon in &rule.polygons {
                if let Some(id) = &polygon.id {
                    self.assign(id);
                }
            }
        }
    }

    /// The rewritten form of an id
    pub fn map(&self, id: &str) -> String {
        self.fresh
            .get(id)
            .or_else(|| self.redirects.get(id))
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    fn map_in_place(&self, id: &mut String) {
        *id = self.map(id);
    }

    fn map_option(&self, id: &mut Option<String>) {
        if let Some(id) = id {
            self.map_in_place(id);
        }
    }

    fn rewrite_polygon(&self, polygon: &mut PolygonDoc) {
        self.map_option(&mut polygon.id);
        self.map_option(&mut polygon.facies);
        self.map_option(&mut polygon.group);
        if let Some(parent) = &mut polygon.parent {
            self.map_option(parent);
        }
        if let Some(field) = &mut polygon.field {
            self.map_option(field);
        }
        if let Some(children) = &mut polygon.children {
            children.iter_mut().for_each(|child| self.map_in_place(child));
        }
    }

    fn rewrite_rule(&self, rule: &mut RuleDoc, target: &ParentDoc) {
        self.map_in_place(&mut rule.id);
        rule.parent = target.clone();
        for slot in &mut rule.background_fields {
            self.map_option(slot);
        }
        for polygon in &mut rule.polygons {
            self.rewrite_polygon(polygon);
        }
    }

    /// Rewrite every id-bearing field and move every entity to `target`
    pub fn rewrite_document(&self, document: &mut Document, target: &ParentDoc) {
        for doc in &mut document.fields {
            self.map_in_place(&mut doc.id);
            doc.parent = target.clone();
            self.map_in_place(&mut doc.cross_section);
        }
        for doc in &mut document.facies {
            self.map_in_place(&mut doc.id);
            doc.parent = target.clone();
            self.map_in_place(&mut doc.facies);
        }
        for doc in &mut document.facies_groups {
            self.map_in_place(&mut doc.id);
            doc.parent = target.clone();
            doc.facies.iter_mut().for_each(|member| self.map_in_place(member));
        }
        for rule in &mut document.rules {
            self.rewrite_rule(rule, target);
        }
    }

    /// Freshly assigned ids, parsed
    pub fn id_map(&self) -> Result<BTreeMap<EntityId, EntityId>> {
        self.fresh
            .iter()
            .map(|(old, new)| -> Result<(EntityId, EntityId)> {
                Ok((EntityId::parse(old)?, EntityId::parse(new)?))
            })
            .collect()
    }

    /// Number of freshly assigned ids
    pub fn len(&self) -> usize {
        self.fresh.len()
    }

    /// Whether no id has been assigned
    pub fn is_empty(&self) -> bool {
        self.fresh.is_empty()
    }
}
