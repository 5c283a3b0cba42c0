//! Set-level matching support: angle-group quantization, the pair cache,
//! and stratified sampling for very large catalogs.
//!
//! Quantization buckets parts by `round(angle / tolerance) * tolerance` so
//! candidate pairs are enumerated within a bucket and across adjacent
//! buckets only, instead of over the full quadratic cross product.

use std::collections::{BTreeMap, HashMap, VecDeque};

use pc_core::part::Part;

use crate::matcher::{AngleMatch, AngleMatcher};

/// Default pair-cache capacity.
const CACHE_CAPACITY: usize = 10_000;

/// Parts bucketed by quantized average bevel angle.
#[derive(Debug)]
pub struct AngleGroups {
    groups: BTreeMap<i64, Vec<usize>>,
}

impl AngleGroups {
    /// Bucket the beveled parts of a catalog. Square-cut parts are left
    /// out; they cannot match anything.
    pub fn build(parts: &[Part], tolerance: f64) -> Self {
        let step = tolerance.max(1e-6);
        let mut groups: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (i, part) in parts.iter().enumerate() {
            if !part.has_bevel() {
                continue;
            }
            let key = (part.angles.average_bevel() / step).round() as i64;
            groups.entry(key).or_default().push(i);
        }
        Self { groups }
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Candidate part-index pairs: every pair within a bucket, then every
    /// cross pair between adjacent buckets (whose centers differ by one
    /// tolerance step).
    pub fn candidate_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();

        for members in self.groups.values() {
            for a in 0..members.len() {
                for b in (a + 1)..members.len() {
                    pairs.push((members[a], members[b]));
                }
            }
        }

        let keys: Vec<i64> = self.groups.keys().copied().collect();
        for window in keys.windows(2) {
            if window[1] - window[0] != 1 {
                continue;
            }
            let left = &self.groups[&window[0]];
            let right = &self.groups[&window[1]];
            for &a in left {
                for &b in right {
                    pairs.push((a, b));
                }
            }
        }

        pairs
    }
}

/// Evenly spaced sample of `n` parts, stratified by average bevel angle.
///
/// Deterministic: sorting plus fixed stride, no randomness, so repeated
/// runs see the same sample.
pub fn stratified_sample(parts: &[Part], n: usize) -> Vec<Part> {
    if parts.len() <= n {
        return parts.to_vec();
    }

    let mut order: Vec<usize> = (0..parts.len()).collect();
    order.sort_by(|&a, &b| {
        parts[a]
            .angles
            .average_bevel()
            .partial_cmp(&parts[b].angles.average_bevel())
            .unwrap()
    });

    let stride = parts.len() as f64 / n as f64;
    (0..n)
        .map(|k| parts[order[(k as f64 * stride) as usize]].clone())
        .collect()
}

/// Read-through cache of pairwise match computations.
///
/// Keyed by the lexicographically ordered id pair; results are stored in
/// canonical orientation (smaller id first) and mirrored on reversed
/// lookups, which is sound because matching is symmetric. On overflow the
/// oldest half of the entries is evicted.
#[derive(Debug)]
pub struct PairCache {
    capacity: usize,
    map: HashMap<(String, String), Vec<AngleMatch>>,
    order: VecDeque<(String, String)>,
}

impl Default for PairCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PairCache {
    pub fn new() -> Self {
        Self::with_capacity(CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(2),
            map: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The matches for a part pair, computing and caching on miss.
    /// Results are identical to `matcher.find_matches(p1, p2)`.
    pub fn matches(&mut self, matcher: &AngleMatcher, p1: &Part, p2: &Part) -> Vec<AngleMatch> {
        let reversed = p1.id > p2.id;
        let (first, second) = if reversed { (p2, p1) } else { (p1, p2) };
        let key = (first.id.clone(), second.id.clone());

        if !self.map.contains_key(&key) {
            if self.map.len() >= self.capacity {
                self.evict_oldest_half();
            }
            let computed = matcher.find_matches(first, second);
            self.order.push_back(key.clone());
            self.map.insert(key.clone(), computed);
        }

        let canonical = &self.map[&key];
        if reversed {
            canonical.iter().map(mirror).collect()
        } else {
            canonical.clone()
        }
    }

    fn evict_oldest_half(&mut self) {
        let drop_count = self.map.len() / 2;
        for _ in 0..drop_count {
            if let Some(key) = self.order.pop_front() {
                self.map.remove(&key);
            }
        }
    }
}

/// The same match, seen from the other part's side.
fn mirror(m: &AngleMatch) -> AngleMatch {
    AngleMatch {
        part1_id: m.part2_id.clone(),
        part2_id: m.part1_id.clone(),
        part1_position: m.part2_position,
        part2_position: m.part1_position,
        angle: m.angle,
        angle_difference: m.angle_difference,
        is_exact: m.is_exact,
        savings: m.savings,
        score: m.score,
    }
}
