//! FMU-updatable scalars
//!
//! A numeric parameter tagged with whether an external uncertainty workflow
//! (FMU) may override it.

use crate::error::{DomainError, Result};

/// A value paired with its "may be overridden by FMU" flag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FmuUpdatable {
    /// Current value
    pub value: f64,
    /// Whether FMU may override the value
    pub updatable: bool,
}

/// Raw construction input: a bare number, or an object carrying both fields
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FmuInput {
    /// Bare number
    Raw(f64),
    /// Object form with optional fields
    Object {
        /// The value; required
        value: Option<f64>,
        /// The flag; falls back to the caller's default when absent
        updatable: Option<bool>,
    },
}

impl FmuUpdatable {
    /// Create a new scalar
    pub fn new(value: f64, updatable: bool) -> Self {
        Self { value, updatable }
    }

    /// A scalar FMU may not override
    pub fn fixed(value: f64) -> Self {
        Self::new(value, false)
    }

    /// Build from raw input
    ///
    /// An object's own `updatable` flag takes precedence over
    /// `default_updatable`.
    ///
    /// # Errors
    /// Returns a configuration error when an object carries no value
    ///
    /// # Examples
    ///
    /// ```
    /// use aps_domain::{FmuInput, FmuUpdatable};
    ///
    /// let input = FmuInput::Object { value: Some(5.0), updatable: Some(true) };
    /// assert!(FmuUpdatable::from_input(input, false).unwrap().updatable);
    /// ```
    pub fn from_input(input: FmuInput, default_updatable: bool) -> Result<Self> {
        match input {
            FmuInput::Raw(value) => Ok(Self::new(value, default_updatable)),
            FmuInput::Object { value, updatable } => {
                let value = value.ok_or_else(|| {
                    DomainError::Configuration(
                        "an FMU-updatable object must carry a value".to_string(),
                    )
                })?;
                Ok(Self::new(value, updatable.unwrap_or(default_updatable)))
            }
        }
    }

    /// The same scalar with a new value, keeping the flag
    pub fn with_value(self, value: f64) -> Self {
        Self { value, ..self }
    }
}

impl Default for FmuUpdatable {
    fn default() -> Self {
        Self::fixed(0.0)
    }
}

impl From<f64> for FmuUpdatable {
    fn from(value: f64) -> Self {
        Self::fixed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_uses_default_flag() {
        assert!(!FmuUpdatable::from_input(FmuInput::Raw(1.0), false).unwrap().updatable);
        assert!(FmuUpdatable::from_input(FmuInput::Raw(1.0), true).unwrap().updatable);
    }

    #[test]
    fn test_object_flag_wins_over_default() {
        let input = FmuInput::Object {
            value: Some(5.0),
            updatable: Some(true),
        };
        let scalar = FmuUpdatable::from_input(input, false).unwrap();
        assert_eq!(scalar.value, 5.0);
        assert!(scalar.updatable);

        let input = FmuInput::Object {
            value: Some(5.0),
            updatable: Some(false),
        };
        assert!(!FmuUpdatable::from_input(input, true).unwrap().updatable);
    }

    #[test]
    fn test_object_without_flag_uses_default() {
        let input = FmuInput::Object {
            value: Some(2.0),
            updatable: None,
        };
        assert!(FmuUpdatable::from_input(input, true).unwrap().updatable);
    }

    #[test]
    fn test_object_without_value_fails() {
        let input = FmuInput::Object {
            value: None,
            updatable: Some(true),
        };
        assert!(matches!(
            FmuUpdatable::from_input(input, false),
            Err(DomainError::Configuration(_))
        ));
    }
}
