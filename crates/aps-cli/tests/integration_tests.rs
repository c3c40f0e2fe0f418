//! Integration tests for the CLI commands

use std::path::{Path, PathBuf};

use aps_cli::cli::{ConfigAction, ConfigArgs, CopyArgs, ExportArgs, InspectArgs, ValidateArgs};
use aps_cli::commands::{self, config::init_config, inspect::scope_rows, validate::rule_rows};
use aps_cli::config::OutputFormat;
use aps_cli::{CliError, Config, Formatter, ScopeArg};
use aps_copy::CopyConfig;
use aps_domain::{
    BayfillPolygon, BayfillRole, BayfillRule, Conformity, CrossSection, CrossSectionType,
    DomainError, EntityId, Facies, FmuUpdatable, GaussianRandomField, GlobalFacies,
    PolygonCommon, Zone,
};
use aps_store::Project;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    path: PathBuf,
    bayfill: EntityId,
    incomplete: EntityId,
}

/// Zone 1 holds a ready bayfill rule and an incomplete one; zone 2 has regions 1 and 2
fn fixture() -> Fixture {
    let mut project = Project::new();
    let upper = Zone::new("Upper", 1, 10.0, Conformity::Proportional).unwrap();
    let source = upper.scope();
    project.add_zone(upper).unwrap();
    let mut lower = Zone::new("Lower", 2, 5.0, Conformity::TopConform).unwrap();
    lower.add_region("East", 1).unwrap();
    lower.add_region("West", 2).unwrap();
    project.add_zone(lower).unwrap();

    let section = project
        .insert_cross_section(CrossSection::new(source, CrossSectionType::IJ, 0.5).unwrap())
        .unwrap();
    let fields: Vec<_> = (1..=3)
        .map(|n| {
            project
                .insert_field(GaussianRandomField::new(source, format!("GRF{}", n), section).unwrap())
                .unwrap()
        })
        .collect();
    let facies: Vec<_> = (1..=5)
        .map(|code| {
            let global = project
                .insert_global_facies(GlobalFacies::new(format!("F{}", code), code as f64, "blue").unwrap())
                .unwrap();
            project.insert_facies(Facies::new(source, global)).unwrap()
        })
        .collect();

    let mut rule = BayfillRule::new(source, "bayfill");
    for (slot, field) in fields.iter().enumerate() {
        rule.base.set_background_field(slot, Some(*field)).unwrap();
    }
    for (role, f) in BayfillRole::ALL.iter().zip(&facies) {
        let slant = role.requires_slant_factor().then(|| FmuUpdatable::new(0.25, false));
        let polygon = BayfillPolygon::new(PolygonCommon::new(1).with_facies(*f), *role, slant).unwrap();
        rule.add_polygon(polygon).unwrap();
    }
    let bayfill = project.insert_rule(rule.into()).unwrap();
    let incomplete = project
        .insert_rule(BayfillRule::new(source, "draft").into())
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.aps.json");
    project.save(&path).unwrap();
    Fixture {
        _dir: dir,
        path,
        bayfill,
        incomplete,
    }
}

fn quiet() -> Formatter {
    Formatter::new(OutputFormat::Quiet, false)
}

fn load(path: &Path) -> Project {
    Project::load(path).unwrap()
}

#[tokio::test]
async fn test_validate_reports_readiness() {
    let f = fixture();
    let rows = rule_rows(&load(&f.path));
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "bayfill");
    assert!(rows[0].ready);
    assert_eq!(rows[1].name, "draft");
    assert!(!rows[1].ready);
    assert!(rows[1].unmet.contains(&"has exactly 5 bayfill polygons"));
    assert_eq!(rows[0].scope, "Upper");

    let lenient = ValidateArgs {
        document: f.path.clone(),
        strict: false,
    };
    commands::execute_validate(lenient, &quiet()).await.unwrap();
}

#[tokio::test]
async fn test_strict_validate_fails_on_unready_rule() {
    let f = fixture();
    let args = ValidateArgs {
        document: f.path.clone(),
        strict: true,
    };
    let result = commands::execute_validate(args, &quiet()).await;
    assert!(matches!(result, Err(CliError::NotReady(1))));
}

#[tokio::test]
async fn test_validate_rejects_broken_document() {
    let f = fixture();
    let json = std::fs::read_to_string(&f.path).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    value["gaussianRandomFields"] = serde_json::json!([]);
    std::fs::write(&f.path, value.to_string()).unwrap();

    let args = ValidateArgs {
        document: f.path.clone(),
        strict: false,
    };
    let result = commands::execute_validate(args, &quiet()).await;
    assert!(matches!(result, Err(CliError::Store(_))));
}

#[tokio::test]
async fn test_inspect_counts() {
    let f = fixture();
    let rows = scope_rows(&load(&f.path));
    let codes: Vec<_> = rows.iter().map(|r| r.codes.as_str()).collect();
    assert_eq!(codes, vec!["1", "2/1", "2/2"]);
    assert_eq!((rows[0].fields, rows[0].facies, rows[0].rules), (3, 5, 2));
    assert_eq!(rows[1].scope, "Lower/East");
    assert_eq!(rows[1].rules, 0);

    let args = InspectArgs {
        document: f.path.clone(),
    };
    commands::execute_inspect(args, &quiet()).await.unwrap();
}

#[tokio::test]
async fn test_copy_writes_output() {
    let f = fixture();
    let output = f.path.with_file_name("copied.aps.json");
    let args = CopyArgs {
        document: f.path.clone(),
        from: ScopeArg { zone: 1, region: None },
        to: ScopeArg { zone: 2, region: Some(2) },
        output: Some(output.clone()),
        dry_run: false,
    };
    commands::execute_copy(args, &CopyConfig::default(), &quiet())
        .await
        .unwrap();

    let original = load(&f.path);
    let copied = load(&output);
    let west = copied.scope_by_codes(2, Some(2)).unwrap();
    assert_eq!(original.counts(&west).total(), 0);
    assert_eq!(copied.counts(&west).rules, 2);
    assert_eq!(copied.counts(&west).fields, 3);
}

#[tokio::test]
async fn test_copy_dry_run_leaves_document() {
    let f = fixture();
    let before = std::fs::read_to_string(&f.path).unwrap();
    let args = CopyArgs {
        document: f.path.clone(),
        from: ScopeArg { zone: 1, region: None },
        to: ScopeArg { zone: 2, region: None },
        output: None,
        dry_run: true,
    };
    commands::execute_copy(args, &CopyConfig::default(), &quiet())
        .await
        .unwrap();
    assert_eq!(std::fs::read_to_string(&f.path).unwrap(), before);
}

#[tokio::test]
async fn test_copy_unknown_scope() {
    let f = fixture();
    let args = CopyArgs {
        document: f.path.clone(),
        from: ScopeArg { zone: 1, region: None },
        to: ScopeArg { zone: 9, region: None },
        output: None,
        dry_run: false,
    };
    let result = commands::execute_copy(args, &CopyConfig::default(), &quiet()).await;
    assert!(matches!(result, Err(CliError::InvalidInput(_))));
}

#[tokio::test]
async fn test_export_specification() {
    let f = fixture();
    let project = load(&f.path);
    let spec = project
        .rules()
        .get(f.bayfill)
        .and_then(|r| r.as_bayfill())
        .unwrap()
        .specification()
        .unwrap();
    let names: Vec<_> = spec.iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["SF", "YSF", "SBHD"]);

    let args = ExportArgs {
        document: f.path.clone(),
        rule: f.bayfill.to_string(),
    };
    commands::execute_export(args, &quiet()).await.unwrap();
}

#[tokio::test]
async fn test_export_without_slant_factors_fails() {
    let f = fixture();
    let args = ExportArgs {
        document: f.path.clone(),
        rule: f.incomplete.to_string(),
    };
    let result = commands::execute_export(args, &quiet()).await;
    assert!(matches!(
        result,
        Err(CliError::Domain(DomainError::Configuration(_)))
    ));
}

#[tokio::test]
async fn test_export_bad_identifier() {
    let f = fixture();
    let args = ExportArgs {
        document: f.path.clone(),
        rule: "not-a-uuid".to_string(),
    };
    let result = commands::execute_export(args, &quiet()).await;
    assert!(matches!(result, Err(CliError::Domain(DomainError::Identity(_)))));

    let missing = ExportArgs {
        document: f.path.clone(),
        rule: EntityId::new().to_string(),
    };
    let result = commands::execute_export(missing, &quiet()).await;
    assert!(matches!(result, Err(CliError::Domain(DomainError::NotFound(_)))));
}

#[tokio::test]
async fn test_config_init_writes_defaults_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".aps").join("config.toml");

    let args = ConfigArgs {
        action: ConfigAction::Init { force: false },
    };
    commands::execute_config(args, &Config::default(), &path, &quiet())
        .await
        .unwrap();
    let written = Config::load_from(&path).unwrap();
    assert_eq!(written.settings.log_level, "warn");
    assert_eq!(written.copy, CopyConfig::default());

    assert!(matches!(init_config(&path, false), Err(CliError::NotPermitted(_))));
    init_config(&path, true).unwrap();

    let show = ConfigArgs {
        action: ConfigAction::Show,
    };
    commands::execute_config(show, &written, &path, &quiet())
        .await
        .unwrap();
}
