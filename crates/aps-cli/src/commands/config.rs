//! Config command implementation.

use std::path::Path;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;

/// Execute the config command against the file at `path`.
pub async fn execute_config(args: ConfigArgs, config: &Config, path: &Path, formatter: &Formatter) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            let contents = toml::to_string_pretty(config)
                .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
            println!("{}", formatter.info(&format!("Config file: {}", path.display())));
            println!("{}", contents);
        }
        ConfigAction::Init { force } => {
            init_config(path, force)?;
            println!("{}", formatter.success(&format!("Wrote default config to {}", path.display())));
        }
    }
    Ok(())
}

/// Write the default configuration to `path`.
///
/// # Errors
/// NotPermitted when the file exists and `force` is not set
pub fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CliError::NotPermitted(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    Config::default().save(path)
}
