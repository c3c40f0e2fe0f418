//! CLI command definitions and argument parsing.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};

/// APS CLI - Inspect and edit APS facies model documents.
#[derive(Debug, Parser)]
#[command(name = "aps")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "APS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (minimal)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that a document reconstructs and report rule readiness
    Validate(ValidateArgs),

    /// Show per-scope counts of fields, facies, groups and rules
    Inspect(InspectArgs),

    /// Duplicate the models of one scope into another
    Copy(CopyArgs),

    /// Export the slant-factor specification of a bayfill rule
    Export(ExportArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the validate command.
#[derive(Debug, Parser)]
pub struct ValidateArgs {
    /// Model document
    pub document: PathBuf,

    /// Fail when any truncation rule is not ready
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the inspect command.
#[derive(Debug, Parser)]
pub struct InspectArgs {
    /// Model document
    pub document: PathBuf,
}

/// Arguments for the copy command.
#[derive(Debug, Parser)]
pub struct CopyArgs {
    /// Model document
    pub document: PathBuf,

    /// Source scope (format: zone or zone/region, by code)
    #[arg(long)]
    pub from: ScopeArg,

    /// Target scope (format: zone or zone/region, by code)
    #[arg(long)]
    pub to: ScopeArg,

    /// Write the result here instead of over the input document
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report what would be copied without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the export command.
#[derive(Debug, Parser)]
pub struct ExportArgs {
    /// Model document
    pub document: PathBuf,

    /// Identifier of the bayfill rule
    #[arg(short, long)]
    pub rule: String,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// A scope given by zone code and optional region code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeArg {
    /// Zone code
    pub zone: i32,
    /// Region code
    pub region: Option<i32>,
}

impl FromStr for ScopeArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parse = |part: &str, what: &str| {
            part.trim()
                .parse::<i32>()
                .map_err(|_| format!("invalid {} code '{}' (expected zone or zone/region)", what, part))
        };
        match s.split_once('/') {
            Some((zone, region)) => Ok(Self {
                zone: parse(zone, "zone")?,
                region: Some(parse(region, "region")?),
            }),
            None => Ok(Self {
                zone: parse(s, "zone")?,
                region: None,
            }),
        }
    }
}

impl fmt::Display for ScopeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.region {
            Some(region) => write!(f, "{}/{}", self.zone, region),
            None => write!(f, "{}", self.zone),
        }
    }
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_command() {
        let cli = Cli::parse_from(["aps", "validate", "model.json", "--strict"]);
        match cli.command {
            Command::Validate(args) => {
                assert!(args.strict);
                assert_eq!(args.document, PathBuf::from("model.json"));
            }
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_copy_command() {
        let cli = Cli::parse_from([
            "aps", "copy", "model.json", "--from", "1", "--to", "2/3", "--dry-run", "-f", "json",
        ]);
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        match cli.command {
            Command::Copy(args) => {
                assert_eq!(args.from, ScopeArg { zone: 1, region: None });
                assert_eq!(args.to, ScopeArg { zone: 2, region: Some(3) });
                assert!(args.dry_run);
                assert!(args.output.is_none());
            }
            _ => panic!("Expected Copy command"),
        }
    }

    #[test]
    fn test_config_init_command() {
        let cli = Cli::parse_from(["aps", "config", "init", "--force"]);
        match cli.command {
            Command::Config(ConfigArgs {
                action: ConfigAction::Init { force },
            }) => assert!(force),
            _ => panic!("Expected Config Init command"),
        }
    }

    #[test]
    fn test_scope_arg_rejects_garbage() {
        assert!("".parse::<ScopeArg>().is_err());
        assert!("1/x".parse::<ScopeArg>().is_err());
        assert!("a".parse::<ScopeArg>().is_err());
        assert_eq!("4/1".parse::<ScopeArg>().unwrap().to_string(), "4/1");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["aps", "inspect", "model.json", "--verbose", "--no-color"]);
        assert!(cli.verbose);
        assert!(cli.no_color);
    }
}
