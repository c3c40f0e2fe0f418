//! Mock host application for testing

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use aps_domain::{FieldSimulation, GaussianRandomField, GridGeometry, HostApplication, ParameterKind};
use thiserror::Error;

/// Failure reported by [`MockHost`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MockHostError {
    /// Configured failure
    #[error("Mock host failure: {0}")]
    Failure(String),
}

/// Deterministic in-process host
///
/// Simulated values depend only on the cell index and the field's main
/// range, so repeated calls give identical results.
///
/// # Examples
///
/// ```
/// use aps_domain::{HostApplication, ParameterKind};
/// use aps_session::MockHost;
///
/// let mut host = MockHost::default();
/// host.add_parameter(ParameterKind::ProbabilityCube, "Prob_Sand");
/// assert_eq!(host.parameter_names(ParameterKind::ProbabilityCube).unwrap(), vec!["Prob_Sand"]);
/// assert_eq!(host.call_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockHost {
    geometry: GridGeometry,
    parameters: HashMap<ParameterKind, Vec<String>>,
    delay: Option<Duration>,
    failure: Option<String>,
    call_count: Arc<Mutex<usize>>,
}

impl MockHost {
    /// Create a host with the given grid
    pub fn new(geometry: GridGeometry) -> Self {
        Self {
            geometry,
            parameters: HashMap::new(),
            delay: None,
            failure: None,
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Block every call for `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail every call with `message`
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Register a host parameter
    pub fn add_parameter(&mut self, kind: ParameterKind, name: impl Into<String>) {
        self.parameters.entry(kind).or_default().push(name.into());
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.call_count.lock().map(|count| *count).unwrap_or_default()
    }

    fn enter(&self) -> Result<(), MockHostError> {
        if let Ok(mut count) = self.call_count.lock() {
            *count += 1;
        }
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        match &self.failure {
            Some(message) => Err(MockHostError::Failure(message.clone())),
            None => Ok(()),
        }
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new(GridGeometry {
            nx: 20,
            ny: 10,
            nz: 5,
            x_increment: 50.0,
            y_increment: 50.0,
            azimuth: 0.0,
        })
    }
}

impl HostApplication for MockHost {
    type Error = MockHostError;

    fn parameter_names(&self, kind: ParameterKind) -> Result<Vec<String>, Self::Error> {
        self.enter()?;
        Ok(self.parameters.get(&kind).cloned().unwrap_or_default())
    }

    fn grid_geometry(&self) -> Result<GridGeometry, Self::Error> {
        self.enter()?;
        Ok(self.geometry)
    }

    fn simulate_field(
        &self,
        field: &GaussianRandomField,
        grid: &GridGeometry,
    ) -> Result<FieldSimulation, Self::Error> {
        self.enter()?;
        let range = field.variogram.main_range.value.max(1.0);
        let values = (0..grid.ny)
            .flat_map(|j| (0..grid.nx).map(move |i| (i, j)))
            .map(|(i, j)| {
                let x = i as f64 * grid.x_increment / range;
                let y = j as f64 * grid.y_increment / range;
                (x.sin() + y.cos()) / 2.0
            })
            .collect();
        Ok(FieldSimulation {
            field: field.id,
            nx: grid.nx,
            ny: grid.ny,
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aps_domain::{EntityId, Parent};

    #[test]
    fn test_simulation_is_deterministic() {
        let host = MockHost::default();
        let field = GaussianRandomField::new(Parent::zone(EntityId::new()), "GRF1", EntityId::new()).unwrap();
        let grid = host.grid_geometry().unwrap();

        let first = host.simulate_field(&field, &grid).unwrap();
        let second = host.simulate_field(&field, &grid).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.values.len(), grid.nx * grid.ny);
        assert!(first.values.iter().all(|v| (-1.0..=1.0).contains(v)));
        assert_eq!(host.call_count(), 3);
    }

    #[test]
    fn test_failure() {
        let host = MockHost::default().with_failure("grid not loaded");
        let err = host.grid_geometry().unwrap_err();
        assert_eq!(err.to_string(), "Mock host failure: grid not loaded");
    }
}
