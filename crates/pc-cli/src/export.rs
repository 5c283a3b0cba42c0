//! Cut-list export.

use std::fmt::Write;

use pc_place::result::PlacementResult;

/// Flat CSV cut list: one row per placed part, in bar-and-position order.
pub fn plan_to_csv(result: &PlacementResult) -> String {
    let mut csv = String::from(
        "part_id,instance,material_id,material_instance,position_mm,length_mm,shared_with,shared_angle,savings_mm\n",
    );
    for p in &result.placed_parts {
        let (shared_with, shared_angle, savings) = match &p.shared_cutting_info {
            Some(info) => (
                format!("{}#{}", info.paired_with_part_id, info.paired_with_instance_id),
                format!("{:.2}", info.shared_angle),
                format!("{:.2}", info.savings),
            ),
            None => (String::new(), String::new(), String::new()),
        };
        let _ = writeln!(
            csv,
            "{},{},{},{},{:.2},{},{},{},{}",
            p.part_id,
            p.part_instance_id,
            p.material_id,
            p.material_instance_id,
            p.position,
            p.length,
            shared_with,
            shared_angle,
            savings,
        );
    }
    csv
}
