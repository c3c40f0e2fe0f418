//! Per-run report of a copy operation

use std::collections::BTreeMap;

use aps_domain::{EntityId, Parent};
use aps_store::{CollectionKind, ScopeCounts};

/// What a copy did, or would do on a dry run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CopyReport {
    /// Target scopes that received copies
    pub scopes: Vec<Parent>,

    /// Items inserted per collection
    pub copied: ScopeCounts,

    /// Items removed from the targets per collection
    pub removed: ScopeCounts,

    /// Cross-sections created in targets that had none
    pub cross_sections_created: usize,

    /// Source id to copy id per target scope, for entities and polygons
    pub id_map: BTreeMap<Parent, BTreeMap<EntityId, EntityId>>,

    /// Whether the project was left unchanged
    pub dry_run: bool,
}

impl CopyReport {
    /// Create an empty report
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Merge the report of one target scope
    pub fn record_scope(&mut self, scope: Parent, other: CopyReport) {
        self.scopes.push(scope);
        self.copied.add(&other.copied);
        self.removed.add(&other.removed);
        self.cross_sections_created += other.cross_sections_created;
        self.id_map.extend(other.id_map);
    }

    /// Total items inserted
    pub fn total_copied(&self) -> usize {
        self.copied.total()
    }

    /// Total items removed
    pub fn total_removed(&self) -> usize {
        self.removed.total()
    }

    /// The copy of a source entity in `scope`, if it was copied there
    pub fn copy_of(&self, scope: &Parent, source: EntityId) -> Option<EntityId> {
        self.id_map.get(scope)?.get(&source).copied()
    }

    /// Every copy of a source entity, by target scope
    pub fn copies_of(&self, source: EntityId) -> Vec<(Parent, EntityId)> {
        self.id_map
            .iter()
            .filter_map(|(scope, map)| map.get(&source).map(|copy| (*scope, *copy)))
            .collect()
    }

    /// Number of source-to-copy mappings over all target scopes
    pub fn mapped(&self) -> usize {
        self.id_map.values().map(BTreeMap::len).sum()
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let mut lines = vec![
            if self.dry_run {
                "Copy Summary (dry run)".to_string()
            } else {
                "Copy Summary".to_string()
            },
            "============".to_string(),
            format!("Target scopes: {}", self.scopes.len()),
        ];
        for scope in &self.scopes {
            lines.push(format!("  {}", scope));
        }
        lines.push(String::new());

        lines.push("Copied:".to_string());
        for kind in CollectionKind::DEPENDENCY_ORDER {
            lines.push(format!("  {}: {}", kind.as_str(), self.copied.get(kind)));
        }
        lines.push(format!("  Total: {}", self.total_copied()));

        if self.total_removed() > 0 {
            lines.push(String::new());
            lines.push("Replaced in target:".to_string());
            for kind in CollectionKind::DEPENDENCY_ORDER {
                lines.push(format!("  {}: {}", kind.as_str(), self.removed.get(kind)));
            }
            lines.push(format!("  Total: {}", self.total_removed()));
        }

        if self.cross_sections_created > 0 {
            lines.push(String::new());
            lines.push(format!("Cross-sections created: {}", self.cross_sections_created));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_scope_accumulates() {
        let zone = EntityId::new();
        let mut report = CopyReport::new(false);

        let (east, west) = (Parent::region(zone, EntityId::new()), Parent::region(zone, EntityId::new()));
        let source = EntityId::new();
        let (east_copy, west_copy) = (EntityId::new(), EntityId::new());

        let mut first = CopyReport::new(false);
        first.copied.rules = 2;
        first.removed.facies = 1;
        first.id_map.insert(east, BTreeMap::from([(source, east_copy)]));
        report.record_scope(east, first);

        let mut second = CopyReport::new(false);
        second.copied.rules = 3;
        second.cross_sections_created = 1;
        second.id_map.insert(west, BTreeMap::from([(source, west_copy)]));
        report.record_scope(west, second);

        assert_eq!(report.scopes.len(), 2);
        assert_eq!(report.copied.rules, 5);
        assert_eq!(report.total_removed(), 1);
        assert_eq!(report.cross_sections_created, 1);
        assert_eq!(report.mapped(), 2);
        assert_eq!(report.copy_of(&east, source), Some(east_copy));
        assert_eq!(report.copy_of(&west, source), Some(west_copy));
        assert_eq!(report.copies_of(source).len(), 2);
    }

    #[test]
    fn test_summary() {
        let mut report = CopyReport::new(true);
        report.scopes.push(Parent::zone(EntityId::new()));
        report.copied.fields = 3;
        report.copied.rules = 1;

        let summary = report.summary();
        assert!(summary.contains("dry run"));
        assert!(summary.contains("gaussianRandomFields: 3"));
        assert!(summary.contains("Total: 4"));
        assert!(!summary.contains("Replaced"));
    }
}
