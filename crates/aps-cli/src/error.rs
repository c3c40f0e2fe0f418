//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Document could not be read or reconstructed
    #[error(transparent)]
    Store(#[from] aps_store::StoreError),

    /// Scope duplication failed
    #[error(transparent)]
    Copy(#[from] aps_copy::CopyError),

    /// Domain rule violated
    #[error(transparent)]
    Domain(#[from] aps_domain::DomainError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation not permitted
    #[error("Operation not permitted: {0}")]
    NotPermitted(String),

    /// Strict validation found rules that are not ready
    #[error("{0} truncation rule(s) not ready")]
    NotReady(usize),
}
