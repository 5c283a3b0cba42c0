//! Integration tests for the project-file flow: TOML in, plan out.

use pc_pipeline::{Optimizer, Project, quick_estimate};

const FRAME_PROJECT_TOML: &str = r#"
name = "Picture frames"

[optimizer]
angle_tolerance = 5.0

[[parts]]
id = "horizontal"
length = 600
quantity = 8
thickness = 18
angles = { topLeft = 45.0, topRight = 45.0 }

[[parts]]
id = "vertical"
length = 400
quantity = 8
thickness = 18
angles = { topLeft = 45.0, topRight = 45.0 }

[[materials]]
id = "oak_3m"
length = 3000
quantity = 0
"#;

#[test]
fn test_project_loads_and_validates() {
    let project = Project::from_toml(FRAME_PROJECT_TOML).expect("failed to parse TOML");
    assert_eq!(project.name.as_deref(), Some("Picture frames"));
    assert_eq!(project.parts.len(), 2);
    assert!(project.materials[0].is_unlimited());
    assert!(project.ensure_valid().is_ok());
}

#[test]
fn test_full_flow_places_every_frame_part() {
    let project = Project::from_toml(FRAME_PROJECT_TOML).unwrap();
    let optimizer = Optimizer::new(project.optimizer.clone());
    let result = optimizer.optimize(&project.parts, &project.materials);

    assert!(result.success, "unplaced: {:?}", result.unplaced_parts);
    assert_eq!(result.placed_parts.len(), 16);
    assert!(
        result.report.shared_cut_pairs > 0,
        "45 degree frame parts must share cuts"
    );
    assert!(result.total_savings > 0.0);

    // The plan serializes with the wire field names.
    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("placedParts"));
    assert!(json.contains("unplacedParts"));
    assert!(json.contains("usedMaterials"));
    assert!(json.contains("totalSavings"));
}

#[test]
fn test_estimate_matches_catalog_shape() {
    let project = Project::from_toml(FRAME_PROJECT_TOML).unwrap();
    let estimate = quick_estimate(
        &project.parts,
        &project.materials,
        project.optimizer.angle_tolerance,
    );
    assert_eq!(estimate.total_parts, 16);
    assert_eq!(estimate.total_length_mm, 8 * 600 + 8 * 400);
    assert!(estimate.match_count > 0);
    assert_eq!(estimate.estimated_bar_length, 3000);
    assert!(estimate.estimated_bars >= 3);
}

#[test]
fn test_invalid_project_is_rejected() {
    let bad = r#"
[[parts]]
id = "bad"
length = 500
quantity = 1
thickness = 10
angles = { topLeft = 30.0, bottomLeft = 40.0 }

[[materials]]
id = "m"
length = 6000
quantity = 1
"#;
    let project = Project::from_toml(bad).unwrap();
    let err = project.ensure_valid().unwrap_err();
    assert!(err.to_string().contains("left side"));
}
