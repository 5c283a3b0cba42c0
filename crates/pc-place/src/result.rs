//! The placement plan: the only artifact that leaves the optimizer.

use serde::{Deserialize, Serialize};

use pc_core::material::Material;

/// Part orientation on the bar. Profiles are never flipped, so this is
/// always `normal`; the field exists for the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Normal,
}

/// The shared-cut partner of a placed part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedCutInfo {
    pub paired_with_part_id: String,
    pub paired_with_instance_id: u32,
    pub shared_angle: f64,
    pub savings: f64,
}

/// One part instance assigned to a position on a material instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedPart {
    pub part_id: String,
    pub part_instance_id: u32,
    pub material_id: String,
    /// `"{materialId}_{index}"` of the concrete bar.
    pub material_instance_id: String,
    /// Millimeters from the bar's zero end.
    pub position: f64,
    pub length: u32,
    pub orientation: Orientation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_cutting_info: Option<SharedCutInfo>,
}

/// A part instance that could not be placed, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnplacedPart {
    pub part_id: String,
    pub instance_id: u32,
    pub reason: String,
}

/// A material instance that received at least one part.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsedMaterial {
    pub material: Material,
    pub instance_id: String,
    /// Used length over bar length, in [0, 1].
    pub utilization: f64,
}

/// Run totals for the report block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementReport {
    pub total_parts: usize,
    pub placed_parts: usize,
    /// Aggregate utilization over used bars, in [0, 1].
    pub material_utilization: f64,
    pub shared_cut_pairs: usize,
    pub processing_ms: u64,
    pub strategy: String,
}

/// The complete placement plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementResult {
    pub placed_parts: Vec<PlacedPart>,
    pub unplaced_parts: Vec<UnplacedPart>,
    pub used_materials: Vec<UsedMaterial>,
    /// Millimeters saved by shared cuts actually placed.
    pub total_savings: f64,
    /// True exactly when nothing is unplaced.
    pub success: bool,
    pub warnings: Vec<String>,
    pub report: PlacementReport,
}

impl PlacementResult {
    /// An empty plan, used for degenerate inputs.
    pub fn empty(strategy: &str, warnings: Vec<String>) -> Self {
        Self {
            placed_parts: Vec::new(),
            unplaced_parts: Vec::new(),
            used_materials: Vec::new(),
            total_savings: 0.0,
            success: true,
            warnings,
            report: PlacementReport {
                total_parts: 0,
                placed_parts: 0,
                material_utilization: 0.0,
                shared_cut_pairs: 0,
                processing_ms: 0,
                strategy: strategy.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_is_successful() {
        let result = PlacementResult::empty("bfd", vec!["no parts requested".into()]);
        assert!(result.success);
        assert!(result.placed_parts.is_empty());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_placed_part_serde_camel_case() {
        let part = PlacedPart {
            part_id: "a".into(),
            part_instance_id: 0,
            material_id: "m".into(),
            material_instance_id: "m_0".into(),
            position: 20.0,
            length: 2000,
            orientation: Orientation::Normal,
            shared_cutting_info: Some(SharedCutInfo {
                paired_with_part_id: "a".into(),
                paired_with_instance_id: 1,
                shared_angle: 45.0,
                savings: 28.28,
            }),
        };
        let json = serde_json::to_string(&part).unwrap();
        assert!(json.contains("partInstanceId"));
        assert!(json.contains("materialInstanceId"));
        assert!(json.contains("sharedCuttingInfo"));
        assert!(json.contains("\"orientation\":\"normal\""));
    }

    #[test]
    fn test_shared_info_omitted_when_absent() {
        let part = PlacedPart {
            part_id: "a".into(),
            part_instance_id: 0,
            material_id: "m".into(),
            material_instance_id: "m_0".into(),
            position: 20.0,
            length: 2000,
            orientation: Orientation::Normal,
            shared_cutting_info: None,
        };
        let json = serde_json::to_string(&part).unwrap();
        assert!(!json.contains("sharedCuttingInfo"));
    }
}
