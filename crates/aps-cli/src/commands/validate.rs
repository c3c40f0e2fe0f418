//! Validate command implementation.

use crate::cli::ValidateArgs;
use crate::commands::{read_project, scope_name};
use crate::error::{CliError, Result};
use crate::output::{Formatter, RuleRow};
use aps_store::Project;
use tracing::info;

/// Execute the validate command.
///
/// Reconstruction failures propagate as errors. With `--strict`, any rule
/// that is not ready fails the command as well.
pub async fn execute_validate(args: ValidateArgs, formatter: &Formatter) -> Result<()> {
    let project = read_project(&args.document).await?;
    let rows = rule_rows(&project);
    let unready = rows.iter().filter(|r| !r.ready).count();
    info!(rules = rows.len(), unready, "validated document");

    println!("{}", formatter.format_rules(&rows)?);

    if args.strict && unready > 0 {
        return Err(CliError::NotReady(unready));
    }
    Ok(())
}

/// Readiness of every rule, ordered by scope then name.
pub fn rule_rows(project: &Project) -> Vec<RuleRow> {
    let mut statuses = project.rule_statuses();
    statuses.sort_by(|(a, _), (b, _)| {
        a.base()
            .parent
            .cmp(&b.base().parent)
            .then_with(|| a.name().cmp(b.name()))
    });
    statuses
        .into_iter()
        .map(|(rule, status)| RuleRow {
            id: rule.base().id.to_string(),
            scope: scope_name(project, &rule.base().parent),
            name: rule.name().to_string(),
            kind: rule.kind().as_str(),
            ready: status.ready,
            unmet: status.unmet,
        })
        .collect()
}
