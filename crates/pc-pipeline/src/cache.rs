//! Instance-local memoization of optimizer runs.
//!
//! The pipeline is deterministic, so identical inputs may reuse the
//! previous plan. Entries expire after a fixed interval.

use std::collections::HashMap;
use std::fmt::Write;
use std::time::{Duration, Instant};

use pc_core::material::Material;
use pc_core::part::Part;
use pc_place::result::PlacementResult;

use crate::optimizer::OptimizerConfig;

const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// A TTL-bounded result cache.
#[derive(Debug)]
pub struct ResultCache {
    ttl: Duration,
    entries: HashMap<String, (Instant, PlacementResult)>,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical key over everything the pipeline's output depends on.
    pub fn canonical_key(
        parts: &[Part],
        materials: &[Material],
        config: &OptimizerConfig,
    ) -> String {
        let mut key = String::new();
        for p in parts {
            let a = &p.angles;
            let _ = write!(
                key,
                "p:{}:{}:{}:{}:{}:{}:{}:{};",
                p.id,
                p.length,
                p.quantity,
                p.thickness,
                a.top_left,
                a.top_right,
                a.bottom_left,
                a.bottom_right
            );
        }
        for m in materials {
            let _ = write!(key, "m:{}:{}:{};", m.id, m.length, m.quantity);
        }
        let c = &config.constraints;
        let _ = write!(
            key,
            "c:{}:{}:{}:{}:{}:{}:{}:{}",
            config.angle_tolerance,
            config.max_chain_size,
            config.prioritize_mixed_chains,
            c.cutting_loss,
            c.front_end_loss,
            c.back_end_loss,
            c.min_part_spacing,
            c.allow_supply_promotion
        );
        key
    }

    /// Fetch an unexpired entry, pruning anything past its TTL.
    pub fn get(&mut self, key: &str) -> Option<PlacementResult> {
        let ttl = self.ttl;
        self.entries.retain(|_, (at, _)| at.elapsed() <= ttl);
        self.entries.get(key).map(|(_, result)| result.clone())
    }

    pub fn insert(&mut self, key: String, result: PlacementResult) {
        self.entries.insert(key, (Instant::now(), result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_key() -> String {
        ResultCache::canonical_key(
            &[Part::new("a", 1000, 2, 20)],
            &[Material::new("m", 6000, 1)],
            &OptimizerConfig::default(),
        )
    }

    #[test]
    fn test_roundtrip() {
        let mut cache = ResultCache::new();
        let key = sample_key();
        assert!(cache.get(&key).is_none());
        cache.insert(key.clone(), PlacementResult::empty("bfd", vec![]));
        assert!(cache.get(&key).is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expired_entries_pruned() {
        let mut cache = ResultCache::with_ttl(Duration::from_millis(0));
        let key = sample_key();
        cache.insert(key.clone(), PlacementResult::empty("bfd", vec![]));
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_key_distinguishes_inputs() {
        let base = sample_key();
        let longer_part = ResultCache::canonical_key(
            &[Part::new("a", 1001, 2, 20)],
            &[Material::new("m", 6000, 1)],
            &OptimizerConfig::default(),
        );
        let other_tolerance = ResultCache::canonical_key(
            &[Part::new("a", 1000, 2, 20)],
            &[Material::new("m", 6000, 1)],
            &OptimizerConfig {
                angle_tolerance: 2.0,
                ..OptimizerConfig::default()
            },
        );
        assert_ne!(base, longer_part);
        assert_ne!(base, other_tolerance);
    }
}
