//! Flat, JSON-safe document model
//!
//! Cross-references are bare id strings, never embedded objects. Ids stay
//! strings here so that malformed ones surface as identity errors during
//! reconstruction instead of JSON errors.

use aps_domain::{FmuInput, FmuUpdatable};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Current document format version
pub const CURRENT_VERSION: u32 = 1;

fn current_version() -> u32 {
    CURRENT_VERSION
}

fn default_fraction() -> f64 {
    1.0
}

/// Distinguish an absent key (`None`) from an explicit `null` (`Some(None)`)
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Write integral codes without a fractional part
fn integral<S: Serializer>(code: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if code.fract() == 0.0 && *code >= 0.0 && *code <= u32::MAX as f64 {
        serializer.serialize_u64(*code as u64)
    } else {
        serializer.serialize_f64(*code)
    }
}

/// A whole project, keyed by collection name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Format version
    #[serde(default = "current_version")]
    pub version: u32,
    /// Zones, with their regions
    #[serde(default)]
    pub zones: Vec<ZoneDoc>,
    /// Preview cross-sections
    #[serde(default, rename = "crossSections")]
    pub cross_sections: Vec<CrossSectionDoc>,
    /// Project-wide facies
    #[serde(default, rename = "facies/global")]
    pub global_facies: Vec<GlobalFaciesDoc>,
    /// Scoped facies usages
    #[serde(default)]
    pub facies: Vec<FaciesDoc>,
    /// Facies groups
    #[serde(default, rename = "facies/groups")]
    pub facies_groups: Vec<FaciesGroupDoc>,
    /// Gaussian random fields
    #[serde(default, rename = "gaussianRandomFields")]
    pub fields: Vec<FieldDoc>,
    /// Truncation rules
    #[serde(default, rename = "truncationRules")]
    pub rules: Vec<RuleDoc>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            zones: Vec::new(),
            cross_sections: Vec::new(),
            global_facies: Vec::new(),
            facies: Vec::new(),
            facies_groups: Vec::new(),
            fields: Vec::new(),
            rules: Vec::new(),
        }
    }
}

impl Document {
    /// Sort every scoped collection by id
    pub fn sort(&mut self) {
        self.cross_sections.sort_by(|a, b| a.id.cmp(&b.id));
        self.global_facies.sort_by(|a, b| a.id.cmp(&b.id));
        self.facies.sort_by(|a, b| a.id.cmp(&b.id));
        self.facies_groups.sort_by(|a, b| a.id.cmp(&b.id));
        self.fields.sort_by(|a, b| a.id.cmp(&b.id));
        self.rules.sort_by(|a, b| a.id.cmp(&b.id));
        for rule in &mut self.rules {
            rule.polygons.sort_by(|a, b| a.id.cmp(&b.id));
        }
    }

    /// Whether the document carries no scoped items
    pub fn is_empty(&self) -> bool {
        self.cross_sections.is_empty()
            && self.facies.is_empty()
            && self.facies_groups.is_empty()
            && self.fields.is_empty()
            && self.rules.is_empty()
    }
}

/// Scope reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentDoc {
    /// Zone id; required
    #[serde(default)]
    pub zone: Option<String>,
    /// Region id
    #[serde(default)]
    pub region: Option<String>,
}

/// FMU-updatable scalar: a bare number on input, always an object on output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FmuDoc {
    /// Bare number
    Raw(f64),
    /// Object form
    Object {
        /// Value
        #[serde(default)]
        value: Option<f64>,
        /// Whether FMU may override the value
        #[serde(default)]
        updatable: Option<bool>,
    },
}

impl FmuDoc {
    /// Construction input for the domain scalar
    pub fn input(&self) -> FmuInput {
        match *self {
            FmuDoc::Raw(value) => FmuInput::Raw(value),
            FmuDoc::Object { value, updatable } => FmuInput::Object { value, updatable },
        }
    }
}

impl From<FmuUpdatable> for FmuDoc {
    fn from(scalar: FmuUpdatable) -> Self {
        FmuDoc::Object {
            value: Some(scalar.value),
            updatable: Some(scalar.updatable),
        }
    }
}

/// Zone selection: a flag, or `"intermediate"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectedDoc {
    /// Selected or not
    Flag(bool),
    /// Named state
    State(String),
}

impl Default for SelectedDoc {
    fn default() -> Self {
        SelectedDoc::Flag(false)
    }
}

/// Zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDoc {
    /// Identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Name
    pub name: String,
    /// Zone code
    pub code: i32,
    /// Thickness
    #[serde(default)]
    pub thickness: f64,
    /// Conformity name
    #[serde(default)]
    pub conformity: Option<String>,
    /// Selection
    #[serde(default)]
    pub selected: SelectedDoc,
    /// Regions
    #[serde(default)]
    pub regions: Vec<RegionDoc>,
}

/// Region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDoc {
    /// Identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Name
    pub name: String,
    /// Region code
    pub code: i32,
    /// Whether the region is selected
    #[serde(default)]
    pub selected: bool,
    /// Owning zone, a back-reference
    #[serde(default)]
    pub zone: Option<String>,
}

/// Cross-section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossSectionDoc {
    /// Identifier
    pub id: String,
    /// Scope
    pub parent: ParentDoc,
    /// Orientation name
    #[serde(rename = "type")]
    pub kind: String,
    /// Position along the normal axis
    pub relative_position: f64,
}

/// Observation record entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservationDoc {
    /// Zone code
    pub zone: i32,
    /// Region code
    #[serde(default)]
    pub region: Option<i32>,
}

/// Global facies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalFaciesDoc {
    /// Identifier
    pub id: String,
    /// Name
    pub name: String,
    /// Facies code, validated on reconstruction
    #[serde(serialize_with = "integral")]
    pub code: f64,
    /// Display color
    #[serde(default)]
    pub color: String,
    /// Alias; empty when the name serves as alias
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alias: String,
    /// Observation record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed: Option<Vec<ObservationDoc>>,
}

/// Scoped facies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaciesDoc {
    /// Identifier
    pub id: String,
    /// Scope
    pub parent: ParentDoc,
    /// Global facies id
    pub facies: String,
    /// Probability cube parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability_cube: Option<String>,
    /// Preview probability
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_probability: Option<f64>,
}

/// Facies group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaciesGroupDoc {
    /// Identifier
    pub id: String,
    /// Scope
    pub parent: ParentDoc,
    /// Member facies ids
    #[serde(default)]
    pub facies: Vec<String>,
}

/// Variogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariogramDoc {
    /// Model name
    #[serde(rename = "type")]
    pub kind: String,
    /// Azimuth
    pub azimuth: FmuDoc,
    /// Dip
    pub dip: FmuDoc,
    /// Main range
    pub main_range: FmuDoc,
    /// Perpendicular range
    pub perpendicular_range: FmuDoc,
    /// Vertical range
    pub vertical_range: FmuDoc,
    /// Power
    pub power: FmuDoc,
}

/// Trend origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginDoc {
    /// X
    pub x: FmuDoc,
    /// Y
    pub y: FmuDoc,
    /// Z
    pub z: FmuDoc,
    /// Coordinate system name
    #[serde(rename = "type")]
    pub kind: String,
}

/// Trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendDoc {
    /// Model name
    #[serde(rename = "type")]
    pub kind: String,
    /// Azimuth
    pub azimuth: FmuDoc,
    /// Stacking angle
    pub stacking_angle: FmuDoc,
    /// Stacking direction name
    pub direction: String,
    /// Curvature
    pub curvature: FmuDoc,
    /// Migration angle
    pub migration_angle: FmuDoc,
    /// Origin
    pub origin: OriginDoc,
    /// Relative size
    pub relative_size: FmuDoc,
    /// Relative standard deviation
    pub relative_std_dev: FmuDoc,
    /// RMS parameter name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

/// Gaussian random field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDoc {
    /// Identifier
    pub id: String,
    /// Scope
    pub parent: ParentDoc,
    /// Name
    pub name: String,
    /// Variogram; the default variogram when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variogram: Option<VariogramDoc>,
    /// Trend; no trend when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendDoc>,
    /// Cross-section id
    pub cross_section: String,
}

/// Polygon, in any of its shapes
///
/// Shape-specific keys are present only for the shapes that use them.
/// `parent` and `field` track presence separately from `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonDoc {
    /// Explicit discriminant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Rank
    #[serde(default)]
    pub order: i32,
    /// Fraction
    #[serde(default = "default_fraction")]
    pub fraction: f64,
    /// Facies id
    #[serde(default)]
    pub facies: Option<String>,
    /// Sector angle (non-cubic)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<FmuDoc>,
    /// Parent polygon id (cubic)
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub parent: Option<Option<String>>,
    /// Child polygon ids (cubic)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<String>>,
    /// Derived level (cubic)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Vec<i32>>,
    /// Facies group id (overlay)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Field id (overlay)
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub field: Option<Option<String>>,
    /// Interval center (overlay)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<FmuDoc>,
    /// Legacy overlay marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<bool>,
    /// Role name (bayfill)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Slant factor (bayfill)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slant_factor: Option<FmuDoc>,
}

/// Truncation rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDoc {
    /// Identifier
    pub id: String,
    /// Scope
    pub parent: ParentDoc,
    /// Name
    pub name: String,
    /// Rule type name
    #[serde(rename = "type")]
    pub kind: String,
    /// Background field slots
    #[serde(default)]
    pub background_fields: Vec<Option<String>>,
    /// Polygons
    #[serde(default)]
    pub polygons: Vec<PolygonDoc>,
    /// Overlay flag (non-cubic and cubic)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<bool>,
    /// Slicing direction (cubic)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    /// Level depth (cubic)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_depth: Option<usize>,
}
