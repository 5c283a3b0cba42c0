//! The optimizer facade: angle matching, chain building, and placement
//! composed into one `optimize` call.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use pc_chain::builder::{ChainBuilder, ChainBuilderConfig};
use pc_chain::chain::{MAX_CHAIN_LENGTH, MAX_CHAIN_SIZE};
use pc_core::constraints::PlacementConstraints;
use pc_core::material::Material;
use pc_core::part::{Part, PartTable};
use pc_core::progress::{NullReporter, ProgressReporter, ProgressUpdate};
use pc_place::packer::Placer;
use pc_place::result::PlacementResult;

use crate::cache::ResultCache;

/// Top-level optimizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Maximum angle difference, in degrees, for two bevels to share a cut.
    pub angle_tolerance: f64,

    /// Upper bound on parts per chain.
    pub max_chain_size: usize,

    /// Try cross-spec chains before same-spec chains on small catalogs.
    pub prioritize_mixed_chains: bool,

    pub constraints: PlacementConstraints,

    /// Memoize results for repeated identical inputs.
    pub use_result_cache: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            angle_tolerance: 5.0,
            max_chain_size: MAX_CHAIN_SIZE,
            prioritize_mixed_chains: true,
            constraints: PlacementConstraints::default(),
            use_result_cache: false,
        }
    }
}

/// Runs the full pipeline: chains from the catalog's bevels, then
/// placement of chains and loose parts.
pub struct Optimizer {
    config: OptimizerConfig,
    cache: RefCell<ResultCache>,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new(OptimizerConfig::default())
    }
}

impl Optimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self {
            config,
            cache: RefCell::new(ResultCache::new()),
        }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn optimize(&self, parts: &[Part], materials: &[Material]) -> PlacementResult {
        self.optimize_with_progress(parts, materials, &NullReporter)
    }

    /// Optimize with progress reporting: chain building maps onto
    /// 0..40%, placement onto 40..100%.
    pub fn optimize_with_progress(
        &self,
        parts: &[Part],
        materials: &[Material],
        reporter: &dyn ProgressReporter,
    ) -> PlacementResult {
        if parts.is_empty() {
            return PlacementResult::empty("none", vec!["no parts requested".into()]);
        }
        if materials.is_empty() {
            return PlacementResult::empty("none", vec!["no materials available".into()]);
        }

        let key = self
            .config
            .use_result_cache
            .then(|| ResultCache::canonical_key(parts, materials, &self.config));
        if let Some(key) = &key
            && let Some(hit) = self.cache.borrow_mut().get(key)
        {
            return hit;
        }

        let table = PartTable::new(parts);

        let chain_config = ChainBuilderConfig {
            angle_tolerance: self.config.angle_tolerance,
            max_chain_size: self.config.max_chain_size.min(MAX_CHAIN_SIZE),
            max_chain_length: MAX_CHAIN_LENGTH,
            prioritize_mixed_chains: self.config.prioritize_mixed_chains,
        };
        let chain_progress = ScaledReporter {
            inner: reporter,
            lo: 0.0,
            hi: 40.0,
        };
        let (chains, _) = ChainBuilder::new(&table, chain_config)
            .build_chains_with_report(&chain_progress);

        let placement_progress = ScaledReporter {
            inner: reporter,
            lo: 40.0,
            hi: 100.0,
        };
        let placer = Placer::new(&table, materials, self.config.constraints.clone());
        let result = placer.place_parts_with_chains(&chains, &placement_progress);

        if let Some(key) = key {
            self.cache.borrow_mut().insert(key, result.clone());
        }
        result
    }
}

/// Maps a stage's local 0..100% into a slice of the overall run, keeping
/// the reported values non-decreasing across stages.
struct ScaledReporter<'a> {
    inner: &'a dyn ProgressReporter,
    lo: f64,
    hi: f64,
}

impl ProgressReporter for ScaledReporter<'_> {
    fn report(&self, update: ProgressUpdate) {
        self.inner.report(ProgressUpdate {
            stage: update.stage,
            percent: self.lo + (self.hi - self.lo) * update.percent / 100.0,
            details: update.details,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pc_core::part::CornerAngles;

    #[test]
    fn test_empty_parts_yields_empty_success() {
        let optimizer = Optimizer::default();
        let result = optimizer.optimize(&[], &[Material::new("m", 6000, 1)]);
        assert!(result.success);
        assert!(result.placed_parts.is_empty());
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn test_empty_materials_yields_empty_success() {
        let optimizer = Optimizer::default();
        let result = optimizer.optimize(&[Part::new("a", 1000, 1, 20)], &[]);
        assert!(result.success);
        assert!(result.placed_parts.is_empty());
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn test_pipeline_places_beveled_catalog() {
        let optimizer = Optimizer::default();
        let parts = vec![
            Part::new("a", 2000, 2, 20).with_angles(CornerAngles::new(45.0, 0.0, 0.0, 0.0)),
        ];
        let materials = vec![Material::new("m", 6000, 1)];
        let result = optimizer.optimize(&parts, &materials);

        assert!(result.success);
        assert_eq!(result.placed_parts.len(), 2);
        assert_eq!(result.report.shared_cut_pairs, 1);
        assert!(result.total_savings > 0.0);
    }

    #[test]
    fn test_result_cache_returns_equivalent_plan() {
        let config = OptimizerConfig {
            use_result_cache: true,
            ..OptimizerConfig::default()
        };
        let optimizer = Optimizer::new(config);
        let parts = vec![Part::new("a", 1000, 4, 20)];
        let materials = vec![Material::unlimited("m", 6000)];

        let first = optimizer.optimize(&parts, &materials);
        let second = optimizer.optimize(&parts, &materials);
        assert_eq!(first.placed_parts, second.placed_parts);
        assert_eq!(first.total_savings, second.total_savings);
    }

    #[test]
    fn test_config_serde_defaults() {
        let config: OptimizerConfig = toml::from_str("angle_tolerance = 3.0").unwrap();
        assert_eq!(config.angle_tolerance, 3.0);
        assert_eq!(config.max_chain_size, MAX_CHAIN_SIZE);
        assert!(config.prioritize_mixed_chains);
        assert!(!config.use_result_cache);
    }
}
