//! Gaussian random fields: variogram, trend, and cross-section

use crate::error::{DomainError, Result};
use crate::fmu::FmuUpdatable;
use crate::id::{Entity, EntityId};
use crate::parent::{Parent, Scoped};

/// Variogram model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VariogramType {
    /// Spherical
    #[default]
    Spherical,
    /// Exponential
    Exponential,
    /// Gaussian
    Gaussian,
    /// General exponential (uses the power parameter)
    GeneralExponential,
    /// Matérn, ν = 3/2
    Matern32,
    /// Matérn, ν = 5/2
    Matern52,
    /// Matérn, ν = 7/2
    Matern72,
    /// Constant field (no spatial correlation parameters)
    Constant,
}

impl VariogramType {
    /// Get the variogram name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            VariogramType::Spherical => "SPHERICAL",
            VariogramType::Exponential => "EXPONENTIAL",
            VariogramType::Gaussian => "GAUSSIAN",
            VariogramType::GeneralExponential => "GENERAL_EXPONENTIAL",
            VariogramType::Matern32 => "MATERN32",
            VariogramType::Matern52 => "MATERN52",
            VariogramType::Matern72 => "MATERN72",
            VariogramType::Constant => "CONSTANT",
        }
    }

    /// Parse a variogram type from its name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SPHERICAL" => Some(VariogramType::Spherical),
            "EXPONENTIAL" => Some(VariogramType::Exponential),
            "GAUSSIAN" => Some(VariogramType::Gaussian),
            "GENERAL_EXPONENTIAL" => Some(VariogramType::GeneralExponential),
            "MATERN32" => Some(VariogramType::Matern32),
            "MATERN52" => Some(VariogramType::Matern52),
            "MATERN72" => Some(VariogramType::Matern72),
            "CONSTANT" => Some(VariogramType::Constant),
            _ => None,
        }
    }

    /// Whether the power parameter applies
    pub fn uses_power(&self) -> bool {
        matches!(self, VariogramType::GeneralExponential)
    }

    /// Whether angles and ranges apply
    pub fn uses_ranges(&self) -> bool {
        !matches!(self, VariogramType::Constant)
    }
}

/// Variogram parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Variogram {
    /// Model
    pub kind: VariogramType,
    /// Azimuth angle of the main range
    pub azimuth: FmuUpdatable,
    /// Dip angle
    pub dip: FmuUpdatable,
    /// Main range
    pub main_range: FmuUpdatable,
    /// Perpendicular range
    pub perpendicular_range: FmuUpdatable,
    /// Vertical range
    pub vertical_range: FmuUpdatable,
    /// Exponent for the general exponential model
    pub power: FmuUpdatable,
}

impl Default for Variogram {
    fn default() -> Self {
        Self {
            kind: VariogramType::default(),
            azimuth: FmuUpdatable::fixed(0.0),
            dip: FmuUpdatable::fixed(0.0),
            main_range: FmuUpdatable::fixed(1000.0),
            perpendicular_range: FmuUpdatable::fixed(1000.0),
            vertical_range: FmuUpdatable::fixed(5.0),
            power: FmuUpdatable::fixed(1.5),
        }
    }
}

impl Variogram {
    /// Whether any applicable parameter may be overridden by FMU
    pub fn is_fmu_updatable(&self) -> bool {
        let ranges = self.kind.uses_ranges()
            && [
                &self.azimuth,
                &self.dip,
                &self.main_range,
                &self.perpendicular_range,
                &self.vertical_range,
            ]
            .iter()
            .any(|v| v.updatable);
        ranges || (self.kind.uses_power() && self.power.updatable)
    }
}

/// Trend model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrendType {
    /// No trend
    #[default]
    None,
    /// Linear
    Linear,
    /// Elliptic
    Elliptic,
    /// Hyperbolic
    Hyperbolic,
    /// Read from an RMS parameter
    RmsParameter,
    /// Elliptic cone
    EllipticCone,
    /// Hyperbolic cone
    HyperbolicCone,
}

/// One trend parameter, for applicability lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrendParameter {
    /// Azimuth angle
    Azimuth,
    /// Stacking angle
    StackingAngle,
    /// Curvature
    Curvature,
    /// Migration angle
    MigrationAngle,
    /// Origin coordinates
    Origin,
    /// Relative size of the ellipse
    RelativeSize,
    /// Relative standard deviation
    RelativeStdDev,
    /// RMS parameter name
    Parameter,
}

impl TrendType {
    /// Get the trend name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendType::None => "NONE",
            TrendType::Linear => "LINEAR",
            TrendType::Elliptic => "ELLIPTIC",
            TrendType::Hyperbolic => "HYPERBOLIC",
            TrendType::RmsParameter => "RMS_PARAM",
            TrendType::EllipticCone => "ELLIPTIC_CONE",
            TrendType::HyperbolicCone => "HYPERBOLIC_CONE",
        }
    }

    /// Parse a trend type from its name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "NONE" => Some(TrendType::None),
            "LINEAR" => Some(TrendType::Linear),
            "ELLIPTIC" => Some(TrendType::Elliptic),
            "HYPERBOLIC" => Some(TrendType::Hyperbolic),
            "RMS_PARAM" => Some(TrendType::RmsParameter),
            "ELLIPTIC_CONE" => Some(TrendType::EllipticCone),
            "HYPERBOLIC_CONE" => Some(TrendType::HyperbolicCone),
            _ => None,
        }
    }

    fn is_cone(&self) -> bool {
        matches!(self, TrendType::EllipticCone | TrendType::HyperbolicCone)
    }

    /// Whether `parameter` matters for this trend type
    pub fn uses(&self, parameter: TrendParameter) -> bool {
        use TrendParameter::*;
        match (self, parameter) {
            (TrendType::None, _) => false,
            (_, RelativeStdDev) => true,
            (TrendType::RmsParameter, Parameter) => true,
            (TrendType::RmsParameter, _) => false,
            (_, Parameter) => false,
            (_, Azimuth | StackingAngle) => true,
            (TrendType::Hyperbolic | TrendType::HyperbolicCone, Curvature) => true,
            (_, Curvature) => false,
            (t, MigrationAngle | RelativeSize) => t.is_cone(),
            (TrendType::Linear, Origin) => false,
            (_, Origin) => true,
        }
    }
}

/// Direction of stacking for trends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StackingDirection {
    /// Prograding
    #[default]
    Prograding,
    /// Retrograding
    Retrograding,
}

impl StackingDirection {
    /// Get the direction name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            StackingDirection::Prograding => "PROGRADING",
            StackingDirection::Retrograding => "RETROGRADING",
        }
    }

    /// Parse a direction from its name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PROGRADING" => Some(StackingDirection::Prograding),
            "RETROGRADING" => Some(StackingDirection::Retrograding),
            _ => None,
        }
    }
}

/// How trend origin coordinates are expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OriginType {
    /// Relative to the zone's bounding box
    #[default]
    Relative,
    /// Absolute coordinates
    Absolute,
}

impl OriginType {
    /// Get the origin type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            OriginType::Relative => "RELATIVE",
            OriginType::Absolute => "ABSOLUTE",
        }
    }

    /// Parse an origin type from its name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "RELATIVE" => Some(OriginType::Relative),
            "ABSOLUTE" => Some(OriginType::Absolute),
            _ => None,
        }
    }
}

/// Trend parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Trend {
    /// Model
    pub kind: TrendType,
    /// Azimuth angle
    pub azimuth: FmuUpdatable,
    /// Stacking angle
    pub stacking_angle: FmuUpdatable,
    /// Stacking direction
    pub direction: StackingDirection,
    /// Curvature (hyperbolic trends only)
    pub curvature: FmuUpdatable,
    /// Migration angle (cones only)
    pub migration_angle: FmuUpdatable,
    /// Origin x
    pub origin_x: FmuUpdatable,
    /// Origin y
    pub origin_y: FmuUpdatable,
    /// Origin z
    pub origin_z: FmuUpdatable,
    /// Origin coordinate system
    pub origin_kind: OriginType,
    /// Relative size of the ellipse (cones only)
    pub relative_size: FmuUpdatable,
    /// Relative standard deviation
    pub relative_std_dev: FmuUpdatable,
    /// RMS parameter name (RMS parameter trends only)
    pub parameter: Option<String>,
}

impl Default for Trend {
    fn default() -> Self {
        Self {
            kind: TrendType::default(),
            azimuth: FmuUpdatable::fixed(0.0),
            stacking_angle: FmuUpdatable::fixed(0.0),
            direction: StackingDirection::default(),
            curvature: FmuUpdatable::fixed(1.0),
            migration_angle: FmuUpdatable::fixed(0.0),
            origin_x: FmuUpdatable::fixed(0.0),
            origin_y: FmuUpdatable::fixed(0.0),
            origin_z: FmuUpdatable::fixed(0.0),
            origin_kind: OriginType::default(),
            relative_size: FmuUpdatable::fixed(1.0),
            relative_std_dev: FmuUpdatable::fixed(0.0),
            parameter: None,
        }
    }
}

impl Trend {
    /// Numeric parameters that apply to the current trend type
    pub fn applicable_values(&self) -> Vec<(TrendParameter, &FmuUpdatable)> {
        let all = [
            (TrendParameter::Azimuth, &self.azimuth),
            (TrendParameter::StackingAngle, &self.stacking_angle),
            (TrendParameter::Curvature, &self.curvature),
            (TrendParameter::MigrationAngle, &self.migration_angle),
            (TrendParameter::Origin, &self.origin_x),
            (TrendParameter::Origin, &self.origin_y),
            (TrendParameter::Origin, &self.origin_z),
            (TrendParameter::RelativeSize, &self.relative_size),
            (TrendParameter::RelativeStdDev, &self.relative_std_dev),
        ];
        all.into_iter().filter(|(p, _)| self.kind.uses(*p)).collect()
    }

    /// Whether any applicable parameter may be overridden by FMU
    ///
    /// Flags on parameters the trend type does not use are ignored, e.g. an
    /// updatable curvature on a linear trend.
    pub fn is_fmu_updatable(&self) -> bool {
        self.applicable_values().iter().any(|(_, v)| v.updatable)
    }
}

/// Orientation of a preview cross-section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CrossSectionType {
    /// Horizontal (I-J plane)
    #[default]
    IJ,
    /// Vertical along I
    IK,
    /// Vertical along J
    JK,
}

impl CrossSectionType {
    /// Get the orientation name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            CrossSectionType::IJ => "IJ",
            CrossSectionType::IK => "IK",
            CrossSectionType::JK => "JK",
        }
    }

    /// Parse an orientation from its name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "IJ" => Some(CrossSectionType::IJ),
            "IK" => Some(CrossSectionType::IK),
            "JK" => Some(CrossSectionType::JK),
            _ => None,
        }
    }
}

/// Preview cross-section; at most one per scope
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSection {
    /// Unique identifier
    pub id: EntityId,
    /// Owning scope
    pub parent: Parent,
    /// Orientation
    pub kind: CrossSectionType,
    relative_position: f64,
}

impl CrossSection {
    /// Create a cross-section
    ///
    /// # Errors
    /// Configuration error when `relative_position` is outside `[0, 1]`
    pub fn new(parent: Parent, kind: CrossSectionType, relative_position: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&relative_position) {
            return Err(DomainError::Configuration(format!(
                "cross-section position must be in [0, 1], got {}",
                relative_position
            )));
        }
        Ok(Self {
            id: EntityId::new(),
            parent,
            kind,
            relative_position,
        })
    }

    /// Use a specific identifier
    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = id;
        self
    }

    /// Position along the normal axis, in `[0, 1]`
    pub fn relative_position(&self) -> f64 {
        self.relative_position
    }
}

impl Entity for CrossSection {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Scoped for CrossSection {
    fn parent(&self) -> &Parent {
        &self.parent
    }
}

/// A simulated continuous field used as truncation rule input
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianRandomField {
    /// Unique identifier
    pub id: EntityId,
    /// Owning scope
    pub parent: Parent,
    /// Field name
    pub name: String,
    /// Variogram
    pub variogram: Variogram,
    /// Trend
    pub trend: Trend,
    /// Cross-section used for previews
    pub cross_section: EntityId,
}

impl GaussianRandomField {
    /// Create a field with default variogram and no trend
    ///
    /// # Errors
    /// Configuration error when the name is empty
    pub fn new(parent: Parent, name: impl Into<String>, cross_section: EntityId) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::Configuration("field name cannot be empty".to_string()));
        }
        Ok(Self {
            id: EntityId::new(),
            parent,
            name,
            variogram: Variogram::default(),
            trend: Trend::default(),
            cross_section,
        })
    }

    /// Use a specific identifier
    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = id;
        self
    }

    /// Whether FMU may override any applicable parameter
    pub fn is_fmu_updatable(&self) -> bool {
        self.variogram.is_fmu_updatable() || self.trend.is_fmu_updatable()
    }
}

impl Entity for GaussianRandomField {
    fn id(&self) -> EntityId {
        self.id
    }
}

impl Scoped for GaussianRandomField {
    fn parent(&self) -> &Parent {
        &self.parent
    }
}
