//! End-to-end scenarios for the optimizer pipeline.
//!
//! Each scenario runs the full chain: catalog → angle matching → chain
//! building → placement, and checks the resulting plan against the
//! structural invariants every plan must satisfy.

use std::collections::{HashMap, HashSet};

use pc_core::material::Material;
use pc_core::part::{CornerAngles, Part};
use pc_core::progress::{ProgressReporter, ProgressUpdate};
use pc_pipeline::{Optimizer, OptimizerConfig};
use pc_place::result::PlacementResult;

fn beveled(id: &str, length: u32, quantity: u32, thickness: u32, angles: CornerAngles) -> Part {
    Part::new(id, length, quantity, thickness).with_angles(angles)
}

fn top_left(angle: f64) -> CornerAngles {
    CornerAngles::new(angle, 0.0, 0.0, 0.0)
}

/// The invariants of §placement, checked over a whole plan.
fn assert_plan_invariants(result: &PlacementResult, parts: &[Part], materials: &[Material]) {
    // 1. placed ∪ unplaced partitions the expanded instance set.
    let mut seen: HashSet<(String, u32)> = HashSet::new();
    for p in &result.placed_parts {
        assert!(seen.insert((p.part_id.clone(), p.part_instance_id)));
    }
    for u in &result.unplaced_parts {
        assert!(seen.insert((u.part_id.clone(), u.instance_id)));
    }
    let expected: u64 = parts.iter().map(|p| u64::from(p.quantity)).sum();
    assert_eq!(seen.len() as u64, expected);
    for p in parts {
        for i in 0..p.quantity {
            assert!(seen.contains(&(p.id.clone(), i)), "missing {}#{}", p.id, i);
        }
    }

    // 6. success ⇔ nothing unplaced.
    assert_eq!(result.success, result.unplaced_parts.is_empty());

    // 2, 3, 5. Bar-level geometry.
    let material_by_id: HashMap<&str, &Material> =
        materials.iter().map(|m| (m.id.as_str(), m)).collect();
    let mut by_bar: HashMap<&str, Vec<&pc_place::result::PlacedPart>> = HashMap::new();
    for p in &result.placed_parts {
        by_bar.entry(p.material_instance_id.as_str()).or_default().push(p);
    }
    for (bar, mut placed) in by_bar {
        placed.sort_by(|a, b| a.position.partial_cmp(&b.position).unwrap());
        let mat = material_by_id[placed[0].material_id.as_str()];
        for p in &placed {
            assert!(p.position >= 0.0);
            assert!(
                p.position + f64::from(p.length) <= f64::from(mat.length) + 1e-6,
                "{bar}: part overruns the bar"
            );
        }
        for pair in placed.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if let Some(info) = &a.shared_cutting_info {
                // 5. Shared partners sit exactly length - savings apart.
                assert_eq!(info.paired_with_part_id, b.part_id);
                let expected = f64::from(a.length) - info.savings;
                assert!(
                    (b.position - a.position - expected).abs() < 1e-6,
                    "{bar}: shared pair at wrong distance"
                );
            } else {
                let gap = b.position - (a.position + f64::from(a.length));
                assert!(gap >= 5.0 - 1e-6, "{bar}: gap {gap} below the kerf");
            }
        }
    }
}

#[test]
fn two_identical_bevel_parts_combine() {
    // S1: two 45-degree parts share one cut on one bar.
    let parts = vec![beveled("A", 2000, 2, 20, top_left(45.0))];
    let materials = vec![Material::new("M", 6000, 1)];
    let result = Optimizer::default().optimize(&parts, &materials);

    assert!(result.success, "unplaced: {:?}", result.unplaced_parts);
    assert_eq!(result.placed_parts.len(), 2);
    assert_eq!(result.report.shared_cut_pairs, 1);
    // One joint at 45 degrees on 20 mm stock: ~28.28 mm, inside the
    // [5, 40] clamp band.
    assert!(result.total_savings >= 5.0 && result.total_savings <= 40.0);
    assert!((result.total_savings - 28.28).abs() < 0.5);
    assert!(result.unplaced_parts.is_empty());
    assert_plan_invariants(&result, &parts, &materials);
}

#[test]
fn tolerance_match_averages_angles() {
    // S2: 32 and 35 degree bevels meet in the middle at 33.5.
    let parts = vec![
        beveled("C", 1500, 2, 20, top_left(32.0)),
        beveled("D", 1500, 2, 20, top_left(35.0)),
    ];
    let materials = vec![Material::new("M", 6000, 3)];
    let result = Optimizer::default().optimize(&parts, &materials);

    assert!(result.success, "unplaced: {:?}", result.unplaced_parts);
    assert_eq!(result.placed_parts.len(), 4);
    let averaged = result
        .placed_parts
        .iter()
        .filter_map(|p| p.shared_cutting_info.as_ref())
        .any(|info| (info.shared_angle - 33.5).abs() < 1e-9);
    assert!(averaged, "expected a 33.5 degree joint between C and D");
    assert_plan_invariants(&result, &parts, &materials);
}

#[test]
fn cross_position_bevels_match() {
    // S3: bevels on different corners can still share cuts.
    let parts = vec![
        beveled("A", 2222, 2, 20, CornerAngles::new(33.0, 33.0, 0.0, 0.0)),
        beveled("B", 2222, 2, 20, CornerAngles::new(0.0, 33.0, 33.0, 0.0)),
    ];
    let materials = vec![Material::new("M", 10000, 1)];
    let result = Optimizer::default().optimize(&parts, &materials);

    assert!(result.report.shared_cut_pairs > 0, "chains must be produced");
    let cross = result
        .placed_parts
        .iter()
        .filter_map(|p| p.shared_cutting_info.as_ref())
        .any(|info| (info.shared_angle - 33.0).abs() < 1e-9);
    assert!(cross, "expected 33 degree shared cuts");
    assert_plan_invariants(&result, &parts, &materials);
}

#[test]
fn unlimited_supply_finishes_every_part() {
    // S4: quantity 0 means unlimited; nothing may be left over.
    let parts = vec![Part::new("A", 5000, 10, 20)];
    let materials = vec![Material::new("M", 6000, 0)];
    let result = Optimizer::default().optimize(&parts, &materials);

    assert!(result.success);
    assert_eq!(result.placed_parts.len(), 10);
    assert!(result.used_materials.len() >= 10);
    assert!(result.unplaced_parts.is_empty());
    assert_plan_invariants(&result, &parts, &materials);
}

#[test]
fn finite_insufficient_supply_reports_unplaced() {
    // S5: 50 m of parts cannot come out of 12 m of stock.
    let parts = vec![Part::new("A", 5000, 10, 20)];
    let materials = vec![Material::new("M", 6000, 2)];
    let result = Optimizer::default().optimize(&parts, &materials);

    assert!(!result.success);
    assert!(result.placed_parts.len() <= 2);
    assert!(result.unplaced_parts.len() >= 8);
    assert!(!result.warnings.is_empty());
    assert_plan_invariants(&result, &parts, &materials);
}

#[test]
fn oversize_part_rejected_with_reason() {
    // S6: a part longer than every bar names the oversize condition.
    let parts = vec![Part::new("A", 20000, 1, 20)];
    let materials = vec![Material::new("M", 6000, 1)];
    let result = Optimizer::default().optimize(&parts, &materials);

    assert!(!result.success);
    assert!(result.placed_parts.is_empty());
    assert_eq!(result.unplaced_parts.len(), 1);
    assert!(
        result.unplaced_parts[0].reason.contains("exceeds longest material"),
        "reason was: {}",
        result.unplaced_parts[0].reason
    );
    assert_plan_invariants(&result, &parts, &materials);
}

#[test]
fn empty_inputs_are_valid_calls() {
    let optimizer = Optimizer::default();

    let no_parts = optimizer.optimize(&[], &[Material::new("M", 6000, 1)]);
    assert!(no_parts.success);
    assert!(no_parts.placed_parts.is_empty());

    let no_materials = optimizer.optimize(&[Part::new("A", 1000, 1, 20)], &[]);
    assert!(no_materials.success);
    assert!(no_materials.placed_parts.is_empty());
    assert!(!no_materials.warnings.is_empty());
}

#[test]
fn square_catalog_places_without_chains() {
    // All angles zero: no chains, but BFD still places everything.
    let parts = vec![Part::new("A", 1200, 6, 20), Part::new("B", 900, 6, 20)];
    let materials = vec![Material::new("M", 6000, 3)];
    let result = Optimizer::default().optimize(&parts, &materials);

    assert!(result.success);
    assert_eq!(result.placed_parts.len(), 12);
    assert_eq!(result.report.shared_cut_pairs, 0);
    assert_eq!(result.total_savings, 0.0);
    assert_plan_invariants(&result, &parts, &materials);
}

#[test]
fn optimize_is_idempotent() {
    let parts = vec![
        beveled("A", 2000, 4, 20, top_left(45.0)),
        beveled("B", 1500, 3, 20, top_left(42.0)),
        Part::new("C", 800, 5, 20),
    ];
    let materials = vec![Material::unlimited("M", 6000)];
    let optimizer = Optimizer::default();

    let first = optimizer.optimize(&parts, &materials);
    let second = optimizer.optimize(&parts, &materials);

    assert_eq!(first.placed_parts.len(), second.placed_parts.len());
    assert_eq!(first.total_savings, second.total_savings);
    let unplaced_first: HashSet<(String, u32)> = first
        .unplaced_parts
        .iter()
        .map(|u| (u.part_id.clone(), u.instance_id))
        .collect();
    let unplaced_second: HashSet<(String, u32)> = second
        .unplaced_parts
        .iter()
        .map(|u| (u.part_id.clone(), u.instance_id))
        .collect();
    assert_eq!(unplaced_first, unplaced_second);
}

#[test]
fn progress_percent_is_monotone_across_the_pipeline() {
    use std::cell::RefCell;
    struct Capture(RefCell<Vec<f64>>);
    impl ProgressReporter for Capture {
        fn report(&self, update: ProgressUpdate) {
            self.0.borrow_mut().push(update.percent);
        }
    }

    let parts = vec![
        beveled("A", 2000, 8, 20, top_left(45.0)),
        Part::new("B", 700, 30, 20),
    ];
    let materials = vec![Material::unlimited("M", 6000)];
    let capture = Capture(RefCell::new(Vec::new()));
    let result =
        Optimizer::default().optimize_with_progress(&parts, &materials, &capture);
    assert!(result.success);

    let percents = capture.0.borrow();
    assert!(!percents.is_empty());
    for pair in percents.windows(2) {
        assert!(pair[0] <= pair[1], "progress went backwards: {pair:?}");
    }
    assert_eq!(*percents.last().unwrap(), 100.0);
}

#[test]
fn mixed_catalog_with_tight_tolerance() {
    // A tolerance of 1 degree keeps 32 and 35 apart: no cross-spec
    // joints, but same-spec chains still form.
    let config = OptimizerConfig {
        angle_tolerance: 1.0,
        ..OptimizerConfig::default()
    };
    let parts = vec![
        beveled("C", 1500, 2, 20, top_left(32.0)),
        beveled("D", 1500, 2, 20, top_left(35.0)),
    ];
    let materials = vec![Material::new("M", 6000, 3)];
    let result = Optimizer::new(config).optimize(&parts, &materials);

    assert!(result.success);
    let cross_spec = result.placed_parts.iter().any(|p| {
        p.shared_cutting_info
            .as_ref()
            .is_some_and(|info| info.paired_with_part_id != p.part_id)
    });
    assert!(!cross_spec, "1 degree tolerance must not join C to D");
    assert_plan_invariants(&result, &parts, &materials);
}

#[test]
fn thousand_instance_catalog_completes() {
    // Scale check: a 1,000-instance mixed-bevel catalog runs the whole
    // pipeline and places everything on unlimited stock.
    let parts = vec![
        beveled("A", 1200, 400, 20, top_left(45.0)),
        beveled("B", 900, 300, 20, top_left(30.0)),
        Part::new("C", 700, 300, 20),
    ];
    let materials = vec![Material::unlimited("M", 6000)];
    let result = Optimizer::default().optimize(&parts, &materials);

    assert!(result.success, "{} unplaced", result.unplaced_parts.len());
    assert_eq!(result.placed_parts.len(), 1000);
    assert!(result.total_savings > 0.0);
    assert_plan_invariants(&result, &parts, &materials);
}
