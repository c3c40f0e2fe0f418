//! Trait definitions for the host application boundary
//!
//! The host (a reservoir modeling application) supplies parameter lists,
//! grid geometry and field simulations. The domain only consumes them.

use crate::field::GaussianRandomField;
use crate::id::EntityId;

/// Kinds of host parameter the model can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// Probability cubes for facies
    ProbabilityCube,
    /// Trend parameters for RMS_PARAM trends
    RmsTrend,
    /// Region parameters of the grid
    RegionParameter,
}

impl ParameterKind {
    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::ProbabilityCube => "probability-cube",
            ParameterKind::RmsTrend => "rms-trend",
            ParameterKind::RegionParameter => "region-parameter",
        }
    }
}

/// Simulation grid dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    /// Cells along I
    pub nx: usize,
    /// Cells along J
    pub ny: usize,
    /// Cells along K
    pub nz: usize,
    /// Cell size along I
    pub x_increment: f64,
    /// Cell size along J
    pub y_increment: f64,
    /// Grid rotation in degrees
    pub azimuth: f64,
}

impl GridGeometry {
    /// Lateral extent `(x, y)` of the grid
    pub fn extent(&self) -> (f64, f64) {
        (self.nx as f64 * self.x_increment, self.ny as f64 * self.y_increment)
    }
}

/// A simulated field realization on a preview cross-section
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSimulation {
    /// The field that was simulated
    pub field: EntityId,
    /// Columns
    pub nx: usize,
    /// Rows
    pub ny: usize,
    /// Row-major values, `nx * ny` of them
    pub values: Vec<f64>,
}

impl FieldSimulation {
    /// Value at column `i`, row `j`
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.nx || j >= self.ny {
            return None;
        }
        self.values.get(j * self.nx + i).copied()
    }
}

/// Host application operations
///
/// Implemented outside the domain (see `aps-session`'s `MockHost`).
pub trait HostApplication {
    /// Error type for host operations
    type Error: std::fmt::Display;

    /// Names of the host parameters of the given kind
    fn parameter_names(&self, kind: ParameterKind) -> Result<Vec<String>, Self::Error>;

    /// Geometry of the simulation grid
    fn grid_geometry(&self) -> Result<GridGeometry, Self::Error>;

    /// Simulate `field` on `grid`
    fn simulate_field(
        &self,
        field: &GaussianRandomField,
        grid: &GridGeometry,
    ) -> Result<FieldSimulation, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_indexing() {
        let sim = FieldSimulation {
            field: EntityId::new(),
            nx: 2,
            ny: 2,
            values: vec![0.0, 1.0, 2.0, 3.0],
        };
        assert_eq!(sim.get(1, 0), Some(1.0));
        assert_eq!(sim.get(0, 1), Some(2.0));
        assert_eq!(sim.get(2, 0), None);
    }

    #[test]
    fn test_grid_extent() {
        let grid = GridGeometry {
            nx: 10,
            ny: 20,
            nz: 5,
            x_increment: 50.0,
            y_increment: 25.0,
            azimuth: 0.0,
        };
        assert_eq!(grid.extent(), (500.0, 500.0));
    }
}
