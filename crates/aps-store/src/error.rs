//! Error types for the store

use aps_domain::DomainError;
use thiserror::Error;

/// Errors that can occur while loading, saving, or mutating a project
#[derive(Error, Debug)]
pub enum StoreError {
    /// Domain error (identity, configuration, reconstruction, conflict, lookup)
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Malformed JSON
    #[error("Invalid document: {0}")]
    Json(#[from] serde_json::Error),

    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document written by an unknown format version
    #[error("Unsupported document version: {0}")]
    UnsupportedVersion(u32),
}

impl StoreError {
    /// The wrapped domain error, if any
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            StoreError::Domain(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
