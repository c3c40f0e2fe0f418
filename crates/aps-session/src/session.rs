//! Single-flight session over a project

use std::sync::Arc;

use aps_copy::{CopyConfig, CopyReport, Duplicator};
use aps_domain::{DomainError, EntityId, FieldSimulation, HostApplication, ParameterKind, Parent};
use aps_store::Project;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::{Result, SessionError};

/// A project shared between readers and one mutator at a time
///
/// Operations run one after another: each works on a copy of the project
/// and publishes it only when it succeeds, so readers always see the last
/// fully applied state. Host calls are the only suspension points and are
/// made without holding the operation lock.
///
/// # Examples
///
/// ```no_run
/// use aps_session::{MockHost, Session};
/// use aps_store::Project;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let project = Project::load("model.aps.json")?;
///     let session = Session::new(project, MockHost::default());
///
///     let scope = session.read(|p| p.scope_by_codes(1, None)).await.ok_or("no zone 1")?;
///     session.select(scope).await?;
///     Ok(())
/// }
/// ```
pub struct Session<H> {
    project: RwLock<Project>,
    // Operation lock; also guards the current selection
    current: Mutex<Option<Parent>>,
    host: Arc<H>,
}

impl<H> Session<H>
where
    H: HostApplication + Send + Sync + 'static,
{
    /// Create a session with nothing selected
    pub fn new(project: Project, host: H) -> Self {
        Self {
            project: RwLock::new(project),
            current: Mutex::new(None),
            host: Arc::new(host),
        }
    }

    /// The host application
    pub fn host(&self) -> &H {
        &self.host
    }

    /// A copy of the last fully applied project
    pub async fn snapshot(&self) -> Project {
        self.project.read().await.clone()
    }

    /// Run a query against the last fully applied project
    pub async fn read<T>(&self, query: impl FnOnce(&Project) -> T) -> T {
        query(&*self.project.read().await)
    }

    /// The selected scope, if any
    pub async fn current_scope(&self) -> Option<Parent> {
        *self.current.lock().await
    }

    async fn run<T, E, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Project, &mut Option<Parent>) -> std::result::Result<T, E>,
        SessionError: From<E>,
    {
        let mut current = self.current.lock().await;
        let mut working = self.project.read().await.clone();
        let mut selection = *current;

        let value = op(&mut working, &mut selection)?;

        *self.project.write().await = working;
        *current = selection;
        Ok(value)
    }

    /// Apply `op` as one operation
    ///
    /// On error nothing is published and the project is unchanged.
    pub async fn apply<T, E, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Project) -> std::result::Result<T, E>,
        SessionError: From<E>,
    {
        self.run(|project, _| op(project)).await
    }

    /// Make `scope` the current selection and update selection flags
    ///
    /// # Errors
    /// NotFound when the scope does not exist
    pub async fn select(&self, scope: Parent) -> Result<()> {
        self.run(|project, current| -> Result<()> {
            if !project.scope_exists(&scope) {
                return Err(DomainError::NotFound(format!("scope {}", scope)).into());
            }
            let zones: Vec<EntityId> = project.zones().iter().map(|z| z.id).collect();
            for id in zones {
                if let Some(zone) = project.zone_mut(id) {
                    zone.set_selected(false);
                }
            }
            if let Some(zone) = project.zone_mut(scope.zone) {
                match scope.region {
                    Some(region) => {
                        if let Some(region) = zone.region_mut(region) {
                            region.selected = true;
                        }
                    }
                    None => zone.set_selected(true),
                }
            }
            *current = Some(scope);
            Ok(())
        })
        .await?;
        info!(scope = %scope, "selected");
        Ok(())
    }

    /// Duplicate `source` into `target` as one operation
    pub async fn duplicate(&self, source: Parent, target: Parent, config: CopyConfig) -> Result<CopyReport> {
        debug!(source = %source, target = %target, "duplicating");
        self.apply(|project| Duplicator::new(config).duplicate(project, &source, &target))
            .await
    }

    /// Simulate a field through the host
    ///
    /// Returns `None` when, by the time the host answers, the field's scope
    /// is no longer within the current selection.
    ///
    /// # Errors
    /// NotFound for an unknown field, Host when the host fails
    pub async fn simulate(&self, field: EntityId) -> Result<Option<FieldSimulation>> {
        let field = self
            .read(|project| project.fields().get(field).cloned())
            .await
            .ok_or_else(|| DomainError::NotFound(format!("field {}", field)))?;
        let scope = field.parent;
        let host = Arc::clone(&self.host);

        let simulation = tokio::task::spawn_blocking(move || {
            let grid = host.grid_geometry().map_err(|e| SessionError::Host(e.to_string()))?;
            host.simulate_field(&field, &grid)
                .map_err(|e| SessionError::Host(e.to_string()))
        })
        .await
        .map_err(|e| SessionError::Join(e.to_string()))??;

        let current = self.current_scope().await;
        if current.is_some_and(|current| current.contains(&scope)) {
            Ok(Some(simulation))
        } else {
            warn!(field = %simulation.field, scope = %scope, "discarding stale simulation");
            Ok(None)
        }
    }

    /// Names of the host parameters of `kind`
    pub async fn parameter_names(&self, kind: ParameterKind) -> Result<Vec<String>> {
        let host = Arc::clone(&self.host);
        tokio::task::spawn_blocking(move || {
            host.parameter_names(kind)
                .map_err(|e| SessionError::Host(e.to_string()))
        })
        .await
        .map_err(|e| SessionError::Join(e.to_string()))?
    }

    /// Consume the session, returning the project
    pub fn into_project(self) -> Project {
        self.project.into_inner()
    }
}
