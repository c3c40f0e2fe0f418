//! Command implementations.

pub mod config;
pub mod copy;
pub mod export;
pub mod inspect;
pub mod validate;

pub use self::config::execute_config;
pub use self::copy::execute_copy;
pub use self::export::execute_export;
pub use self::inspect::execute_inspect;
pub use self::validate::execute_validate;

use std::path::Path;

use crate::cli::ScopeArg;
use crate::error::{CliError, Result};
use aps_domain::Parent;
use aps_store::Project;
use tracing::debug;

/// Read and reconstruct a model document.
pub async fn read_project(path: &Path) -> Result<Project> {
    debug!(path = %path.display(), "reading document");
    let json = tokio::fs::read_to_string(path).await?;
    Ok(Project::from_json(&json)?)
}

/// Write a project as a model document.
pub async fn write_project(project: &Project, path: &Path) -> Result<()> {
    let json = project.to_json()?;
    tokio::fs::write(path, json).await?;
    debug!(path = %path.display(), "wrote document");
    Ok(())
}

/// Resolve a scope given by codes.
pub fn resolve_scope(project: &Project, scope: ScopeArg) -> Result<Parent> {
    project
        .scope_by_codes(scope.zone, scope.region)
        .ok_or_else(|| CliError::InvalidInput(format!("no scope with codes {}", scope)))
}

/// A scope by name, `zone` or `zone/region`.
pub fn scope_name(project: &Project, scope: &Parent) -> String {
    let zone = project.zone(scope.zone);
    let zone_name = zone.map_or_else(|| scope.zone.to_string(), |z| z.name.clone());
    match scope.region {
        Some(region) => {
            let region_name = zone
                .and_then(|z| z.region(region))
                .map_or_else(|| region.to_string(), |r| r.name.clone());
            format!("{}/{}", zone_name, region_name)
        }
        None => zone_name,
    }
}

/// A scope by code, `zone` or `zone/region`.
pub fn scope_codes(project: &Project, scope: &Parent) -> String {
    let zone = project.zone(scope.zone);
    let zone_code = zone.map_or_else(|| "?".to_string(), |z| z.code.to_string());
    match scope.region {
        Some(region) => {
            let region_code = zone
                .and_then(|z| z.region(region))
                .map_or_else(|| "?".to_string(), |r| r.code.to_string());
            format!("{}/{}", zone_code, region_code)
        }
        None => zone_code,
    }
}
