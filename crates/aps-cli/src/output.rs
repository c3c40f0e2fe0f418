//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use aps_copy::CopyReport;
use aps_domain::SlantFactor;
use aps_store::ScopeCounts;
use colored::*;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Readiness of one truncation rule.
#[derive(Debug, Clone, Serialize)]
pub struct RuleRow {
    /// Rule identifier
    pub id: String,
    /// Owning scope, by name
    pub scope: String,
    /// Rule name
    pub name: String,
    /// Rule kind
    pub kind: &'static str,
    /// Whether every structural constraint holds
    pub ready: bool,
    /// Constraints that do not hold
    pub unmet: Vec<&'static str>,
}

/// Collection sizes of one scope.
#[derive(Debug, Clone, Serialize)]
pub struct ScopeRow {
    /// Scope, by name
    pub scope: String,
    /// Scope, by code
    pub codes: String,
    /// Gaussian random fields
    pub fields: usize,
    /// Facies
    pub facies: usize,
    /// Facies groups
    pub groups: usize,
    /// Truncation rules
    pub rules: usize,
}

impl ScopeRow {
    /// Build a row from a scope's counts.
    pub fn new(scope: String, codes: String, counts: &ScopeCounts) -> Self {
        Self {
            scope,
            codes,
            fields: counts.fields,
            facies: counts.facies,
            groups: counts.groups,
            rules: counts.rules,
        }
    }
}

#[derive(Serialize)]
struct SlantEntry {
    name: &'static str,
    value: f64,
    updatable: bool,
}

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// The selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format rule readiness.
    pub fn format_rules(&self, rules: &[RuleRow]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(rules)?),
            OutputFormat::Quiet => Ok(rules
                .iter()
                .filter(|r| !r.ready)
                .map(|r| r.id.clone())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if rules.is_empty() {
                    return Ok(self.colorize("No truncation rules found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["ID", "Scope", "Name", "Kind", "Status", "Unmet"]);
                for rule in rules {
                    let status = if rule.ready {
                        self.colorize("ready", "green")
                    } else {
                        self.colorize("not ready", "red")
                    };
                    builder.push_record([
                        &rule.id[..8],
                        &rule.scope,
                        &rule.name,
                        rule.kind,
                        &status,
                        &rule.unmet.join("\n"),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format per-scope counts.
    pub fn format_scopes(&self, scopes: &[ScopeRow]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(scopes)?),
            OutputFormat::Quiet => Ok(scopes
                .iter()
                .map(|s| s.codes.clone())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if scopes.is_empty() {
                    return Ok(self.colorize("No zones found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Scope", "Codes", "Fields", "Facies", "Groups", "Rules"]);
                for scope in scopes {
                    builder.push_record([
                        scope.scope.clone(),
                        scope.codes.clone(),
                        scope.fields.to_string(),
                        scope.facies.to_string(),
                        scope.groups.to_string(),
                        scope.rules.to_string(),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format a copy report.
    pub fn format_copy_report(&self, report: &CopyReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let value = serde_json::json!({
                    "dryRun": report.dry_run,
                    "scopes": report.scopes.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
                    "copied": counts_json(&report.copied),
                    "removed": counts_json(&report.removed),
                    "crossSectionsCreated": report.cross_sections_created,
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Quiet => Ok(report.total_copied().to_string()),
            OutputFormat::Table => Ok(report.summary()),
        }
    }

    /// Format a bayfill slant-factor specification as JSON.
    pub fn format_specification(&self, factors: &[SlantFactor]) -> Result<String> {
        let entries: Vec<SlantEntry> = factors
            .iter()
            .map(|f| SlantEntry {
                name: f.name,
                value: f.factor.value,
                updatable: f.factor.updatable,
            })
            .collect();
        Ok(serde_json::to_string_pretty(&entries)?)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn render(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn counts_json(counts: &ScopeCounts) -> serde_json::Value {
    serde_json::json!({
        "fields": counts.fields,
        "facies": counts.facies,
        "groups": counts.groups,
        "rules": counts.rules,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aps_domain::FmuUpdatable;

    fn rows() -> Vec<RuleRow> {
        vec![
            RuleRow {
                id: "0192f3a0-0000-7000-8000-000000000001".to_string(),
                scope: "Upper".to_string(),
                name: "bayfill".to_string(),
                kind: "bayfill",
                ready: true,
                unmet: vec![],
            },
            RuleRow {
                id: "0192f3a0-0000-7000-8000-000000000002".to_string(),
                scope: "Upper/North".to_string(),
                name: "cubic".to_string(),
                kind: "cubic",
                ready: false,
                unmet: vec!["cubic root polygon exists"],
            },
        ]
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_rules(&rows()).unwrap();
        assert!(output.contains("Status"));
        assert!(output.contains("not ready"));
        assert!(output.contains("0192f3a0"));
    }

    #[test]
    fn test_quiet_lists_unready_ids() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_rules(&rows()).unwrap();
        assert_eq!(output, "0192f3a0-0000-7000-8000-000000000002");
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_rules(&rows()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[1]["ready"], false);
        assert_eq!(value[1]["unmet"][0], "cubic root polygon exists");
    }

    #[test]
    fn test_empty_rules() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_rules(&[]).unwrap();
        assert!(output.contains("No truncation rules found"));
    }

    #[test]
    fn test_specification_is_json_in_any_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let factors = [SlantFactor {
            name: "SF",
            factor: FmuUpdatable::new(0.5, true),
        }];
        let output = formatter.format_specification(&factors).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["name"], "SF");
        assert_eq!(value[0]["value"], 0.5);
        assert_eq!(value[0]["updatable"], true);
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
    }
}
