//! APS CLI library.
//!
//! Command-line access to APS model documents: validating and inspecting a
//! document, duplicating one scope's models into another, and exporting the
//! bayfill slant-factor specification.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command, ScopeArg};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
