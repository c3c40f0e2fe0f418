//! Integration tests for project persistence

use aps_domain::{
    BayfillPolygon, BayfillRole, BayfillRule, Conformity, CrossSection, CrossSectionType, CubicPolygon, CubicRule, DomainError, Facies,
    FaciesGroup, FmuUpdatable, GaussianRandomField, GlobalFacies, NonCubicPolygon, NonCubicRule,
    OverlayCapable, OverlayPolygon, Parent, PolygonCommon, TruncationRule, Zone,
};
use aps_store::{Document, Project, StoreError};
use tempfile::TempDir;

/// A zone with two regions, each with a full set of scoped entities, and a
/// second zone holding a bayfill rule
fn build_project() -> Project {
    let mut project = Project::new();
    let mut zone = Zone::new("Valysar", 1, 25.0, Conformity::TopConform).unwrap();
    let north = zone.add_region("North", 10).unwrap();
    let south = zone.add_region("South", 20).unwrap();
    zone.region_mut(north).unwrap().selected = true;
    let zone_id = project.add_zone(zone).unwrap();

    let sand = project
        .insert_global_facies(GlobalFacies::new("Sand", 1.0, "yellow").unwrap())
        .unwrap();
    let shale = project
        .insert_global_facies(GlobalFacies::new("Shale", 2.0, "grey").unwrap().with_alias("SH"))
        .unwrap();
    let coal = project
        .insert_global_facies(GlobalFacies::new("Coal", 3.0, "black").unwrap())
        .unwrap();

    for region in [north, south] {
        let scope = Parent::region(zone_id, region);
        let section = project
            .insert_cross_section(CrossSection::new(scope, CrossSectionType::IK, 0.25).unwrap())
            .unwrap();
        let fields: Vec<_> = ["GRF1", "GRF2", "GRF3"]
            .iter()
            .map(|name| {
                project
                    .insert_field(GaussianRandomField::new(scope, *name, section).unwrap())
                    .unwrap()
            })
            .collect();
        let facies: Vec<_> = [sand, shale, coal]
            .iter()
            .map(|global| project.insert_facies(Facies::new(scope, *global)).unwrap())
            .collect();
        let group = project
            .insert_group(FaciesGroup::new(scope, [facies[0]]))
            .unwrap();

        let mut non_cubic = NonCubicRule::new(scope, "sectors");
        non_cubic.base.set_background_field(0, Some(fields[0])).unwrap();
        non_cubic.base.set_background_field(1, Some(fields[1])).unwrap();
        for (order, f) in facies.iter().enumerate() {
            non_cubic.add_polygon(NonCubicPolygon::new(
                PolygonCommon::new(order as i32 + 1).with_facies(*f),
                FmuUpdatable::fixed(30.0 * order as f64),
            ));
        }
        non_cubic.add_overlay_polygon(
            OverlayPolygon::new(PolygonCommon::new(4).with_facies(facies[2]), group, FmuUpdatable::fixed(0.5))
                .with_field(fields[2]),
        );
        project.insert_rule(non_cubic.into()).unwrap();

        let mut cubic = CubicRule::new(scope, "cubes");
        for (slot, field) in fields.iter().enumerate() {
            cubic.base.set_background_field(slot, Some(*field)).unwrap();
        }
        let root = cubic.add_polygon(None, CubicPolygon::new(PolygonCommon::new(1))).unwrap();
        for f in &facies {
            cubic
                .add_polygon(Some(root), CubicPolygon::new(PolygonCommon::new(0).with_facies(*f)))
                .unwrap();
        }
        project.insert_rule(cubic.into()).unwrap();
    }

    let lower = Zone::new("Therys", 2, 12.0, Conformity::BaseConform).unwrap();
    let scope = lower.scope();
    project.add_zone(lower).unwrap();
    let mud = project
        .insert_global_facies(GlobalFacies::new("Mud", 4.0, "brown").unwrap())
        .unwrap();
    let silt = project
        .insert_global_facies(GlobalFacies::new("Silt", 5.0, "olive").unwrap().with_alias("ST"))
        .unwrap();
    let section = project
        .insert_cross_section(CrossSection::new(scope, CrossSectionType::JK, 0.75).unwrap())
        .unwrap();
    let mut bayfill = BayfillRule::new(scope, "bay");
    for (slot, name) in ["GRF1", "GRF2", "GRF3"].iter().enumerate() {
        let field = project
            .insert_field(GaussianRandomField::new(scope, *name, section).unwrap())
            .unwrap();
        bayfill.base.set_background_field(slot, Some(field)).unwrap();
    }
    for (order, (role, global)) in BayfillRole::ALL.iter().zip([sand, shale, coal, mud, silt]).enumerate() {
        let facies = project.insert_facies(Facies::new(scope, global)).unwrap();
        let slant = role
            .requires_slant_factor()
            .then(|| FmuUpdatable::new(0.1 * (order + 1) as f64, order == 0));
        let polygon = BayfillPolygon::new(PolygonCommon::new(order as i32 + 1).with_facies(facies), *role, slant)
            .unwrap();
        bayfill.add_polygon(polygon).unwrap();
    }
    project.insert_rule(bayfill.into()).unwrap();
    project
}

/// Remove every polygon's explicit `kind` from a saved document
fn strip_polygon_kinds(json: &str) -> String {
    let mut value: serde_json::Value = serde_json::from_str(json).unwrap();
    for rule in value["truncationRules"].as_array_mut().unwrap() {
        for polygon in rule["polygons"].as_array_mut().unwrap() {
            polygon.as_object_mut().unwrap().remove("kind");
        }
    }
    value.to_string()
}

fn uuid(n: u32) -> String {
    format!("018f0c5e-0000-7000-8000-{:012}", n)
}

#[test]
fn test_round_trip_is_fixed_point() {
    let project = build_project();
    let first = project.to_json().unwrap();

    let reloaded = Project::from_json(&first).unwrap();
    let second = reloaded.to_json().unwrap();

    assert_eq!(first, second);
    assert_eq!(project, reloaded);
    let kinds: Vec<_> = reloaded.rules().iter().map(|r| r.kind().as_str()).collect();
    assert!(kinds.contains(&"bayfill"));
    assert!(kinds.contains(&"non-cubic"));
    assert!(kinds.contains(&"cubic"));
}

#[test]
fn test_unset_alias_survives_round_trip() {
    let project = build_project();
    let reloaded = Project::from_json(&project.to_json().unwrap()).unwrap();
    let sand = reloaded.global_facies().iter().find(|g| g.name == "Sand").unwrap();
    assert_eq!(sand.explicit_alias(), None);
    assert_eq!(sand.alias(), "Sand");

    let value = serde_json::to_value(project.to_document()).unwrap();
    let globals = value["facies/global"].as_array().unwrap();
    let aliases: Vec<_> = globals.iter().filter_map(|g| g.get("alias")).collect();
    assert_eq!(aliases.len(), 2);
}

#[test]
fn test_documents_without_polygon_kinds_reconstruct_every_variant() {
    let project = build_project();
    let first = project.to_json().unwrap();

    let sniffed = Project::from_json(&strip_polygon_kinds(&first)).unwrap();
    assert_eq!(sniffed, project);
    assert_eq!(sniffed.to_json().unwrap(), first);

    let bay = sniffed.rules().iter().find_map(|r| r.as_bayfill()).unwrap();
    let names: Vec<_> = bay.specification().unwrap().iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["SF", "YSF", "SBHD"]);
    assert!(bay.specification().unwrap()[0].factor.updatable);
}

#[test]
fn test_legacy_bayfill_and_template_cubic() {
    let zone = serde_json::json!({"zone": uuid(1)});
    let globals: Vec<_> = (0..5)
        .map(|n| serde_json::json!({"id": uuid(10 + n), "name": format!("F{}", n), "code": n + 1, "color": "red"}))
        .collect();
    let facies: Vec<_> = (0..5)
        .map(|n| serde_json::json!({"id": uuid(20 + n), "parent": zone, "facies": uuid(10 + n)}))
        .collect();
    let fields: Vec<_> = (0..3)
        .map(|n| serde_json::json!({"id": uuid(30 + n), "parent": zone, "name": format!("GRF{}", n + 1), "crossSection": uuid(2)}))
        .collect();
    let bay_polygons: Vec<_> = BayfillRole::ALL
        .iter()
        .enumerate()
        .map(|(n, role)| {
            let mut polygon = serde_json::json!({
                "id": uuid(40 + n as u32),
                "order": n + 1,
                "facies": uuid(20 + n as u32),
                "name": role.as_str()
            });
            if role.requires_slant_factor() {
                polygon["slantFactor"] = serde_json::json!(0.5);
            }
            polygon
        })
        .collect();
    let document = serde_json::json!({
        "zones": [{"id": uuid(1), "name": "Upper", "code": 1, "thickness": 10.0}],
        "crossSections": [{"id": uuid(2), "parent": zone, "type": "IJ", "relativePosition": 0.5}],
        "facies/global": globals,
        "facies": facies,
        "gaussianRandomFields": fields,
        "truncationRules": [
            {
                "id": uuid(3),
                "parent": zone,
                "name": "bay",
                "type": "bayfill",
                "backgroundFields": [uuid(30), uuid(31), uuid(32)],
                "polygons": bay_polygons
            },
            {
                "id": uuid(4),
                "parent": zone,
                "name": "template",
                "type": "cubic",
                "backgroundFields": [uuid(30), uuid(31), uuid(32)],
                "polygons": [
                    {"order": 1, "facies": uuid(20), "level": [1, 0, 0]},
                    {"order": 1, "facies": uuid(21), "level": [2, 1, 0]},
                    {"order": 2, "facies": uuid(22), "level": [2, 2, 0]}
                ]
            }
        ]
    });

    let project = Project::from_json(&document.to_string()).unwrap();
    let bay = project.rules().get(uuid(3).parse().unwrap()).unwrap();
    assert!(bay.ready(), "{:?}", bay.status().unmet);
    let factors = bay.as_bayfill().unwrap().specification().unwrap();
    assert!(factors.iter().all(|f| f.factor == FmuUpdatable::new(0.5, false)));

    let cubic = project.rules().get(uuid(4).parse().unwrap()).unwrap().as_cubic().unwrap();
    assert_eq!(cubic.roots().len(), 1);
    let levels: Vec<_> = cubic.leaves().iter().map(|id| cubic.level(*id).unwrap()).collect();
    assert_eq!(levels, vec![vec![1, 0, 0], vec![2, 1, 0], vec![2, 2, 0]]);
    assert!(cubic.status().ready, "{:?}", cubic.status().unmet);

    let first = project.to_json().unwrap();
    let reloaded = Project::from_json(&first).unwrap();
    assert_eq!(reloaded, project);
    assert_eq!(reloaded.to_json().unwrap(), first);
}

#[test]
fn test_built_rules_are_ready() {
    let project = build_project();
    for (rule, status) in project.rule_statuses() {
        assert!(status.ready, "{}: {:?}", rule.name(), status.unmet);
    }
}

#[test]
fn test_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("model.aps.json");

    let project = build_project();
    project.save(&path).unwrap();
    let loaded = Project::load(&path).unwrap();

    assert_eq!(project, loaded);
    assert_eq!(loaded.rules().len(), 5);
    assert_eq!(loaded.global_facies().iter().filter(|g| g.alias() == "SH").count(), 1);
}

#[test]
fn test_cubic_levels_are_derived_on_save() {
    let project = build_project();
    let document = project.to_document();
    let cubic = document.rules.iter().find(|r| r.kind == "cubic").unwrap();
    let mut levels: Vec<_> = cubic.polygons.iter().filter_map(|p| p.level.clone()).collect();
    levels.sort();
    assert_eq!(
        levels,
        vec![Vec::<i32>::new(), vec![1, 0, 0], vec![2, 0, 0], vec![3, 0, 0]]
    );
}

#[test]
fn test_dangling_field_reference_is_fatal() {
    let project = build_project();
    let mut document = project.to_document();
    let removed = document.fields.remove(0).id;
    assert!(document.rules.iter().any(|r| r.background_fields.contains(&Some(removed.clone()))));

    let err = Project::from_document(&document).unwrap_err();
    assert!(matches!(err.domain(), Some(DomainError::Reconstruction(_))), "{}", err);
}

#[test]
fn test_malformed_id_is_identity_error() {
    let mut document = build_project().to_document();
    document.facies[0].id = "facies-1".to_string();

    let err = Project::from_document(&document).unwrap_err();
    assert!(matches!(err.domain(), Some(DomainError::Identity(_))), "{}", err);
}

#[test]
fn test_future_version_is_rejected() {
    let document = Document {
        version: 99,
        ..Document::default()
    };
    assert!(matches!(
        Project::from_document(&document),
        Err(StoreError::UnsupportedVersion(99))
    ));
}

#[test]
fn test_legacy_document_without_kinds() {
    let json = r#"{
        "zones": [{
            "id": "018f0c5e-0000-7000-8000-000000000001",
            "name": "Upper",
            "code": 1,
            "thickness": 10.0,
            "selected": true
        }],
        "crossSections": [{
            "id": "018f0c5e-0000-7000-8000-000000000002",
            "parent": {"zone": "018f0c5e-0000-7000-8000-000000000001"},
            "type": "IJ",
            "relativePosition": 0.5
        }],
        "facies/global": [{
            "id": "018f0c5e-0000-7000-8000-000000000003",
            "name": "Sand",
            "code": 1,
            "color": "yellow"
        }],
        "facies": [{
            "id": "018f0c5e-0000-7000-8000-000000000004",
            "parent": {"zone": "018f0c5e-0000-7000-8000-000000000001"},
            "facies": "018f0c5e-0000-7000-8000-000000000003"
        }],
        "gaussianRandomFields": [{
            "id": "018f0c5e-0000-7000-8000-000000000005",
            "parent": {"zone": "018f0c5e-0000-7000-8000-000000000001"},
            "name": "GRF1",
            "crossSection": "018f0c5e-0000-7000-8000-000000000002"
        }],
        "truncationRules": [{
            "id": "018f0c5e-0000-7000-8000-000000000006",
            "parent": {"zone": "018f0c5e-0000-7000-8000-000000000001"},
            "name": "sectors",
            "type": "non-cubic",
            "backgroundFields": ["018f0c5e-0000-7000-8000-000000000005", null],
            "polygons": [{
                "id": "018f0c5e-0000-7000-8000-000000000007",
                "order": 1,
                "facies": "018f0c5e-0000-7000-8000-000000000004",
                "angle": 45.0
            }]
        }]
    }"#;

    let project = Project::from_json(json).unwrap();
    let rule = project.rules().iter().next().unwrap();
    match rule {
        TruncationRule::NonCubic(r) => {
            assert_eq!(r.base.polygons.len(), 1);
            assert!(!r.overlay);
        }
        other => panic!("unexpected rule kind {}", other.kind().as_str()),
    }
    // Only one field is assigned
    assert!(!rule.ready());

    let saved = serde_json::to_value(project.to_document()).unwrap();
    let polygon = &saved["truncationRules"][0]["polygons"][0];
    assert_eq!(polygon["kind"], "non-cubic");
    assert_eq!(polygon["angle"], serde_json::json!({"value": 45.0, "updatable": false}));
}
