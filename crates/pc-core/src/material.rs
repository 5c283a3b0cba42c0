use serde::{Deserialize, Serialize};

/// A stock material specification (one profile family in the rack).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    /// Stable identifier (e.g., "alu_6m").
    pub id: String,

    /// Bar length in millimeters.
    pub length: u32,

    /// Bars available. 0 means unlimited supply: the placer may create as
    /// many instances as it needs.
    #[serde(default)]
    pub quantity: u32,
}

impl Material {
    pub fn new(id: impl Into<String>, length: u32, quantity: u32) -> Self {
        Self {
            id: id.into(),
            length,
            quantity,
        }
    }

    /// A material with unlimited supply.
    pub fn unlimited(id: impl Into<String>, length: u32) -> Self {
        Self::new(id, length, 0)
    }

    pub fn is_unlimited(&self) -> bool {
        self.quantity == 0
    }
}

/// Stock lengths commonly held by extrusion suppliers, in millimeters.
/// Used when instances must be created and no unlimited catalog entry
/// names a length.
pub const STANDARD_STOCK_LENGTHS: [u32; 5] = [6000, 9000, 10000, 12000, 15000];

/// The smallest standard stock length that accommodates `required` mm,
/// falling back to the largest when nothing fits.
pub fn standard_stock_for(required: f64) -> u32 {
    for len in STANDARD_STOCK_LENGTHS {
        if f64::from(len) >= required {
            return len;
        }
    }
    STANDARD_STOCK_LENGTHS[STANDARD_STOCK_LENGTHS.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_flag() {
        assert!(Material::unlimited("alu", 6000).is_unlimited());
        assert!(!Material::new("alu", 6000, 3).is_unlimited());
    }

    #[test]
    fn test_standard_stock_picks_smallest_fitting() {
        assert_eq!(standard_stock_for(100.0), 6000);
        assert_eq!(standard_stock_for(6000.0), 6000);
        assert_eq!(standard_stock_for(6000.5), 9000);
        assert_eq!(standard_stock_for(9500.0), 10000);
        assert_eq!(standard_stock_for(14000.0), 15000);
    }

    #[test]
    fn test_standard_stock_falls_back_to_largest() {
        assert_eq!(standard_stock_for(20000.0), 15000);
    }

    #[test]
    fn test_material_serde_quantity_default() {
        let mat: Material = serde_json::from_str(r#"{"id":"m","length":6000}"#).unwrap();
        assert_eq!(mat.quantity, 0);
        assert!(mat.is_unlimited());
    }
}
