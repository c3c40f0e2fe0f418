//! Export command implementation.

use crate::cli::ExportArgs;
use crate::commands::read_project;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use aps_domain::{DomainError, EntityId};

/// Execute the export command.
pub async fn execute_export(args: ExportArgs, formatter: &Formatter) -> Result<()> {
    let id = EntityId::parse(&args.rule)?;
    let project = read_project(&args.document).await?;

    let rule = project
        .rules()
        .get(id)
        .ok_or_else(|| DomainError::NotFound(format!("truncation rule {}", id)))?;
    let bayfill = rule.as_bayfill().ok_or_else(|| {
        CliError::InvalidInput(format!(
            "rule '{}' is a {} rule, not bayfill",
            rule.name(),
            rule.kind().as_str()
        ))
    })?;

    println!("{}", formatter.format_specification(&bayfill.specification()?)?);
    Ok(())
}
