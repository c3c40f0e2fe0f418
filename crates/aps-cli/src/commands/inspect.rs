//! Inspect command implementation.

use crate::cli::InspectArgs;
use crate::commands::{read_project, scope_codes, scope_name};
use crate::error::Result;
use crate::output::{Formatter, ScopeRow};
use aps_store::Project;

/// Execute the inspect command.
pub async fn execute_inspect(args: InspectArgs, formatter: &Formatter) -> Result<()> {
    let project = read_project(&args.document).await?;
    println!("{}", formatter.format_scopes(&scope_rows(&project))?);
    Ok(())
}

/// Counts for every scope entities may live in.
pub fn scope_rows(project: &Project) -> Vec<ScopeRow> {
    project
        .scopes()
        .iter()
        .map(|scope| {
            ScopeRow::new(
                scope_name(project, scope),
                scope_codes(project, scope),
                &project.counts(scope),
            )
        })
        .collect()
}
