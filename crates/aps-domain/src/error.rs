//! Error kinds raised by domain constructors and mutators

use thiserror::Error;

/// Errors that can occur while building or mutating the facies model
///
/// A truncation rule that is not ready is not an error; see
/// [`RuleStatus`](crate::rule::RuleStatus).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Missing or malformed entity identifier
    #[error("Identity error: {0}")]
    Identity(String),

    /// Missing scope, missing variant-specific field, or out-of-range value
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A flat form could not be turned back into a typed entity
    #[error("Reconstruction error: {0}")]
    Reconstruction(String),

    /// The operation would overwrite a binding owned by another entity or scope
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Lookup by id failed
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result alias for domain operations
pub type Result<T> = std::result::Result<T, DomainError>;
