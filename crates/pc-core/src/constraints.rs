use serde::{Deserialize, Serialize};

/// Shop losses and placement knobs, in millimeters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConstraints {
    /// Material consumed by one saw cut (kerf).
    pub cutting_loss: f64,

    /// Unusable stub at the clamped end of each bar.
    pub front_end_loss: f64,

    /// Unusable stub at the tail end. Defaults to 0: the tail absorbs it.
    /// The historic value for saws that need a tail grip is 15.
    pub back_end_loss: f64,

    /// Extra spacing required between consecutive parts beyond the kerf.
    pub min_part_spacing: f64,

    /// When finite supply runs out with parts still unplaced, allow the
    /// placer to treat the largest material as unlimited as a last resort.
    /// Every promotion is recorded as a warning on the result.
    pub allow_supply_promotion: bool,
}

impl Default for PlacementConstraints {
    fn default() -> Self {
        Self {
            cutting_loss: 5.0,
            front_end_loss: 20.0,
            back_end_loss: 0.0,
            min_part_spacing: 0.0,
            allow_supply_promotion: true,
        }
    }
}

impl PlacementConstraints {
    /// Spacing consumed between two consecutive parts that do not share
    /// a cut.
    pub fn part_spacing(&self) -> f64 {
        self.cutting_loss + self.min_part_spacing
    }

    /// Usable length of a bar of `material_length` mm.
    pub fn usable_length(&self, material_length: u32) -> f64 {
        f64::from(material_length) - self.front_end_loss - self.back_end_loss
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = PlacementConstraints::default();
        assert_eq!(c.cutting_loss, 5.0);
        assert_eq!(c.front_end_loss, 20.0);
        assert_eq!(c.back_end_loss, 0.0);
        assert_eq!(c.min_part_spacing, 0.0);
        assert!(c.allow_supply_promotion);
    }

    #[test]
    fn test_usable_length() {
        let c = PlacementConstraints::default();
        assert!((c.usable_length(6000) - 5980.0).abs() < 1e-10);

        let with_tail = PlacementConstraints {
            back_end_loss: 15.0,
            ..PlacementConstraints::default()
        };
        assert!((with_tail.usable_length(6000) - 5965.0).abs() < 1e-10);
    }

    #[test]
    fn test_toml_overrides() {
        let c: PlacementConstraints = toml::from_str("cutting_loss = 3.0").unwrap();
        assert_eq!(c.cutting_loss, 3.0);
        assert_eq!(c.front_end_loss, 20.0, "unset fields keep defaults");
    }
}
