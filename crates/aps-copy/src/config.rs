//! Configuration for copy operations
//!
//! Selects which collections are duplicated and how missing bindings in the
//! target scope are handled.

use aps_store::CollectionKind;
use serde::{Deserialize, Serialize};

use crate::{CopyError, Result};

/// Configuration for the duplicator
///
/// # Examples
///
/// ```
/// use aps_copy::CopyConfig;
///
/// // Default: copy everything, recursing into target regions
/// let config = CopyConfig::default();
/// assert!(config.include_fields && config.include_rules);
///
/// // Only truncation rules, referring to what the target already has
/// let config = CopyConfig::rules_only();
/// assert!(!config.include_facies);
///
/// // Never create cross-sections in the target
/// let config = CopyConfig::strict();
/// assert!(!config.create_missing_cross_sections);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopyConfig {
    /// Copy Gaussian random fields
    /// Default: true
    pub include_fields: bool,

    /// Copy scoped facies
    /// Default: true
    pub include_facies: bool,

    /// Copy facies groups
    /// Default: true
    pub include_groups: bool,

    /// Copy truncation rules
    /// Default: true
    pub include_rules: bool,

    /// When the target is a zone with regions, copy into each region instead
    /// Default: true
    pub recurse_into_regions: bool,

    /// Create a cross-section in a target scope that has none, modeled on
    /// the source scope's
    /// Default: true
    pub create_missing_cross_sections: bool,

    /// Compute the report without changing the project
    /// Default: false
    pub dry_run: bool,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            include_fields: true,
            include_facies: true,
            include_groups: true,
            include_rules: true,
            recurse_into_regions: true,
            create_missing_cross_sections: true,
            dry_run: false,
        }
    }
}

impl CopyConfig {
    /// Copy only truncation rules
    ///
    /// References to fields, facies, and groups resolve to their counterparts
    /// already in the target scope.
    pub fn rules_only() -> Self {
        Self {
            include_fields: false,
            include_facies: false,
            include_groups: false,
            ..Self::default()
        }
    }

    /// Copy everything, but fail instead of creating cross-sections
    pub fn strict() -> Self {
        Self {
            create_missing_cross_sections: false,
            ..Self::default()
        }
    }

    /// Check the configuration selects at least one collection
    pub fn validate(&self) -> Result<()> {
        if self.kinds().is_empty() {
            return Err(CopyError::Config(
                "at least one collection must be included".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a collection is included
    pub fn includes(&self, kind: CollectionKind) -> bool {
        match kind {
            CollectionKind::Fields => self.include_fields,
            CollectionKind::Facies => self.include_facies,
            CollectionKind::Groups => self.include_groups,
            CollectionKind::Rules => self.include_rules,
        }
    }

    /// Included collections, in dependency order
    pub fn kinds(&self) -> Vec<CollectionKind> {
        CollectionKind::DEPENDENCY_ORDER
            .into_iter()
            .filter(|kind| self.includes(*kind))
            .collect()
    }

    /// Parse from TOML
    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| CopyError::Config(e.to_string()))
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CopyError::Config(e.to_string()))
    }
}
