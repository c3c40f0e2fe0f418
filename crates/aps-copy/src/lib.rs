//! APS Copy Engine
//!
//! Duplicates the scoped contents of one zone or region into another.
//!
//! # Overview
//!
//! A copy runs in dependency order over the included collections:
//! - **Gaussian random fields**, bound to the target's cross-section
//! - **Facies**, sharing the source's global facies
//! - **Facies groups**, over the copied facies
//! - **Truncation rules**, with polygons and field slots pointing at the copies
//!
//! Items of the copied kinds already in the target are removed first, in
//! reverse order. Ids are rewritten field by field on the flat document, so
//! only values known to hold an id ever change.
//!
//! When the target is a zone with regions, the copy is made once per region.
//!
//! # Usage
//!
//! ```no_run
//! use aps_copy::{CopyConfig, Duplicator};
//! use aps_store::Project;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut project = Project::load("model.aps.json")?;
//! let source = project.scope_by_codes(1, None).ok_or("no zone 1")?;
//! let target = project.scope_by_codes(2, Some(3)).ok_or("no region 3")?;
//!
//! let report = Duplicator::new(CopyConfig::rules_only()).duplicate(&mut project, &source, &target)?;
//! println!("{}", report.summary());
//! project.save("model.aps.json")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! The duplicator can be configured via TOML:
//!
//! ```toml
//! [copy]
//! include_fields = true
//! include_facies = true
//! include_groups = true
//! include_rules = true
//! recurse_into_regions = true
//! create_missing_cross_sections = true
//! dry_run = false
//! ```

#![warn(missing_docs)]

mod config;
mod duplicator;
mod error;
mod report;
pub mod rewrite;

pub use config::CopyConfig;
pub use duplicator::Duplicator;
pub use error::{CopyError, Result};
pub use report::CopyReport;
pub use rewrite::IdRewriter;
