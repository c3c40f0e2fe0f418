//! APS Domain Layer
//!
//! The facies-modeling domain model: spatial scopes, facies, Gaussian random
//! fields, and the truncation rules that map simulated fields to facies.
//! No I/O happens here; persistence lives in `aps-store` and duplication in
//! `aps-copy`.
//!
//! ## Key Concepts
//!
//! - **Scope** ([`Parent`]): a zone, optionally narrowed to one of its regions
//! - **Facies**: project-wide [`GlobalFacies`] and their scoped [`Facies`] usages
//! - **Gaussian random field**: a simulated continuous field with variogram and trend
//! - **Truncation rule**: polygons partitioning field values into facies
//! - **FMU-updatable scalar**: a number an uncertainty workflow may override
//!
//! ## Architecture
//!
//! - Cross-references are ids, never owned pointers
//! - Polygon and rule variants are closed enums
//! - Rule readiness is a declarative constraint table, evaluated on demand

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod facies;
pub mod field;
pub mod fmu;
pub mod id;
pub mod parent;
pub mod polygon;
pub mod rule;
pub mod traits;
pub mod zone;

// Re-exports for convenience
pub use error::{DomainError, Result};
pub use facies::{Facies, FaciesCode, FaciesGroup, GlobalFacies, Observation};
pub use field::{
    CrossSection, CrossSectionType, GaussianRandomField, OriginType, StackingDirection, Trend,
    TrendParameter, TrendType, Variogram, VariogramType,
};
pub use fmu::{FmuInput, FmuUpdatable};
pub use id::{Entity, EntityId};
pub use parent::{Parent, ParentKey, Scoped};
pub use polygon::{
    BayfillPolygon, BayfillRole, CubicPolygon, NonCubicPolygon, OverlayPolygon, Polygon,
    PolygonCommon, PolygonKind,
};
pub use rule::{
    BayfillRule, Constraint, CubicRule, NonCubicRule, OverlayCapable, RuleBase, RuleKind,
    RuleStatus, SlantFactor, SlicingDirection, TruncationRule,
};
pub use traits::{FieldSimulation, GridGeometry, HostApplication, ParameterKind};
pub use zone::{Conformity, Region, Selection, Zone};
