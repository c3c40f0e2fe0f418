//! Copy command implementation.

use crate::cli::CopyArgs;
use crate::commands::{read_project, resolve_scope, write_project};
use crate::error::Result;
use crate::output::Formatter;
use aps_copy::{CopyConfig, Duplicator};
use tracing::info;

/// Execute the copy command.
///
/// The document is rewritten in place unless `--output` is given. Nothing
/// is written on a dry run.
pub async fn execute_copy(args: CopyArgs, config: &CopyConfig, formatter: &Formatter) -> Result<()> {
    let mut project = read_project(&args.document).await?;
    let source = resolve_scope(&project, args.from)?;
    let target = resolve_scope(&project, args.to)?;

    let mut config = config.clone();
    config.dry_run |= args.dry_run;
    let report = Duplicator::new(config).duplicate(&mut project, &source, &target)?;

    if !report.dry_run {
        let path = args.output.as_deref().unwrap_or(args.document.as_path());
        write_project(&project, path).await?;
        info!(path = %path.display(), copied = report.total_copied(), "copy written");
    }

    println!("{}", formatter.format_copy_report(&report)?);
    Ok(())
}
