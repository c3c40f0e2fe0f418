//! Error types for session operations

use aps_copy::CopyError;
use aps_domain::DomainError;
use aps_store::StoreError;
use thiserror::Error;

/// Errors that can occur while operating on a session
#[derive(Error, Debug)]
pub enum SessionError {
    /// Domain error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Storage error
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Copy error
    #[error("Copy error: {0}")]
    Copy(#[from] CopyError),

    /// The host application reported a failure
    #[error("Host error: {0}")]
    Host(String),

    /// A blocking host call could not be joined
    #[error("Task join error: {0}")]
    Join(String),
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
