//! APS Storage Layer
//!
//! Owns a facies modeling [`Project`] in memory and persists it as a flat
//! JSON [`Document`].
//!
//! # Architecture
//!
//! - `document`: the serde shapes of the stored document, ids as strings
//! - `flatten`: typed entities to documents
//! - `reconstruct`: documents back to typed entities, with reference checks
//! - `project`: id-keyed collections with validated inserts and cascading removal
//!
//! Loading then saving an unmodified document produces the same document.
//!
//! # Examples
//!
//! ```no_run
//! use aps_store::Project;
//!
//! let project = Project::load("model.aps.json").unwrap();
//! for (rule, status) in project.rule_statuses() {
//!     println!("{}: ready={}", rule.name(), status.ready);
//! }
//! ```

#![warn(missing_docs)]

pub mod document;
pub mod error;
pub mod flatten;
pub mod project;
pub mod reconstruct;

pub use document::{Document, CURRENT_VERSION};
pub use error::{Result, StoreError};
pub use project::{Collection, CollectionKind, Project, ScopeCounts};
pub use reconstruct::{Reference, ReferenceContext};
