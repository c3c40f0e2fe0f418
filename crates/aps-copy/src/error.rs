//! Error types for copy operations

use aps_domain::DomainError;
use aps_store::StoreError;
use thiserror::Error;

/// Errors that can occur while duplicating a scope
#[derive(Error, Debug)]
pub enum CopyError {
    /// Storage layer error, including reconstruction of the rewritten document
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Domain error raised while inserting copies
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The copy would overwrite or cross a binding it may not
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CopyError {
    /// The underlying domain error, if any
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            CopyError::Domain(e) => Some(e),
            CopyError::Store(e) => e.domain(),
            _ => None,
        }
    }
}

/// Result type for copy operations
pub type Result<T> = std::result::Result<T, CopyError>;
