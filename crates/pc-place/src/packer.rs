//! Placement: chains first, then Best-Fit-Decreasing for loose parts.
//!
//! The run moves through five phases: a feasibility bounds check, chain
//! placement with split-retry, BFD packing of loose parts in adaptive
//! batches, pool growth driven by batch success rates, and a final
//! relaxed pass for anything still unplaced. Nothing here returns errors;
//! every failure lands on the result as an unplaced part with a reason.

use std::collections::HashSet;
use std::time::Instant;

use pc_chain::chain::SharedCutChain;
use pc_core::constraints::PlacementConstraints;
use pc_core::material::Material;
use pc_core::part::{InstanceKey, PartTable};
use pc_core::progress::{ProgressReporter, ProgressUpdate};

use crate::instance::{InstancePool, longest_unlimited};
use crate::result::{
    Orientation, PlacedPart, PlacementReport, PlacementResult, SharedCutInfo, UnplacedPart,
    UsedMaterial,
};

/// Adaptive batch sizing.
const BATCH_INITIAL: usize = 2_000;
const BATCH_MIN: usize = 500;
const BATCH_MAX: usize = 10_000;
const BATCH_GROWTH: f64 = 2.5;
const FAILURE_STREAK_LIMIT: u32 = 3;

/// Fill rate assumed when sizing pool growth.
const ESTIMATED_UTILIZATION: f64 = 0.85;

/// Minimum bar count created by the final relaxed pass.
const AGGRESSIVE_MIN_BLOCK: usize = 100;

/// Near-perfect fits and near-full bars get flat scores well above the
/// proportional tiers.
const SCORE_PERFECT: f64 = 10_000.0;
const SCORE_TIGHT_BASE: f64 = 5_000.0;
const TIGHT_WINDOW: f64 = 500.0;

/// Packs parts and chains onto material instances.
pub struct Placer<'a> {
    table: &'a PartTable,
    materials: &'a [Material],
    constraints: PlacementConstraints,
}

impl<'a> Placer<'a> {
    pub fn new(
        table: &'a PartTable,
        materials: &'a [Material],
        constraints: PlacementConstraints,
    ) -> Self {
        Self {
            table,
            materials,
            constraints,
        }
    }

    /// Pack loose parts only.
    pub fn place_parts(&self, reporter: &dyn ProgressReporter) -> PlacementResult {
        self.place_parts_with_chains(&[], reporter)
    }

    /// Pack chains first, then everything else.
    pub fn place_parts_with_chains(
        &self,
        chains: &[SharedCutChain],
        reporter: &dyn ProgressReporter,
    ) -> PlacementResult {
        let strategy = if chains.is_empty() {
            "bfd"
        } else {
            "shared-cut chains + bfd"
        };
        let mut run = Run::new(self.table, self.materials, self.constraints.clone());
        run.execute(chains, reporter);
        run.assemble(strategy)
    }
}

#[derive(Debug, Clone, Copy)]
struct RawShared {
    partner: InstanceKey,
    angle: f64,
    savings: f64,
}

#[derive(Debug, Clone, Copy)]
struct RawPlacement {
    key: InstanceKey,
    bin: usize,
    position: f64,
    shared: Option<RawShared>,
}

enum Outcome {
    Placed,
    /// Retryable: more bars may fix it.
    NoSpace,
    /// Final: no bar in this catalog can ever take the part.
    Impossible(String),
}

struct Run<'a> {
    table: &'a PartTable,
    materials: &'a [Material],
    constraints: PlacementConstraints,
    pool: InstancePool,
    /// Material spec indices, longest bar first.
    family_order: Vec<u32>,
    max_material_length: f64,
    placed: Vec<RawPlacement>,
    unplaced: Vec<(InstanceKey, String)>,
    resolved: HashSet<InstanceKey>,
    warnings: Vec<String>,
    started: Instant,
}

impl<'a> Run<'a> {
    fn new(table: &'a PartTable, materials: &'a [Material], constraints: PlacementConstraints) -> Self {
        let mut family_order: Vec<u32> = (0..materials.len() as u32).collect();
        family_order.sort_by_key(|&i| std::cmp::Reverse(materials[i as usize].length));
        let max_material_length = materials.iter().map(|m| m.length).max().unwrap_or(0).into();

        Self {
            table,
            materials,
            constraints,
            pool: InstancePool::new(materials.len()),
            family_order,
            max_material_length,
            placed: Vec::new(),
            unplaced: Vec::new(),
            resolved: HashSet::new(),
            warnings: Vec::new(),
            started: Instant::now(),
        }
    }

    fn execute(&mut self, chains: &[SharedCutChain], reporter: &dyn ProgressReporter) {
        reporter.report(ProgressUpdate {
            stage: "placement",
            percent: 0.0,
            details: "bounds check".into(),
        });

        if self.materials.is_empty() {
            self.unplace_all_remaining("no materials provided");
            if self.table.total_instances() > 0 {
                self.warnings.push("no materials provided".into());
            }
            reporter.report(ProgressUpdate {
                stage: "placement",
                percent: 100.0,
                details: "no materials".into(),
            });
            return;
        }

        if !self.bounds_check() {
            reporter.report(ProgressUpdate {
                stage: "placement",
                percent: 100.0,
                details: "infeasible".into(),
            });
            return;
        }
        reporter.report(ProgressUpdate {
            stage: "placement",
            percent: 10.0,
            details: "bounds ok".into(),
        });

        // Seed the pool before any packing so chains see bars too.
        let demand: f64 = self
            .table
            .iter()
            .filter(|(_, p)| f64::from(p.length) <= self.max_material_length)
            .map(|(_, p)| f64::from(p.length) * f64::from(p.quantity))
            .sum();
        self.pool.seed_initial(
            self.materials,
            demand,
            self.table.total_instances() as usize,
        );

        let mut loose_from_chains: Vec<InstanceKey> = Vec::new();
        for (i, chain) in chains.iter().enumerate() {
            self.place_chain(chain, &mut loose_from_chains);
            reporter.report(ProgressUpdate {
                stage: "placement",
                percent: 10.0 + 30.0 * (i + 1) as f64 / chains.len() as f64,
                details: format!("chain {}/{}", i + 1, chains.len()),
            });
        }

        let pending = self.pack_loose(chains, loose_from_chains, reporter);
        if !pending.is_empty() {
            self.aggressive_pass(pending);
        }
        reporter.report(ProgressUpdate {
            stage: "placement",
            percent: 100.0,
            details: "done".into(),
        });
    }

    /// Phase 1: reject oversize parts, then compare finite supply against
    /// remaining demand. Returns false when the whole run is infeasible.
    fn bounds_check(&mut self) -> bool {
        let table = self.table;
        for (part_idx, part) in table.iter() {
            if f64::from(part.length) > self.max_material_length {
                let reason = format!(
                    "part length {} mm exceeds longest material ({} mm)",
                    part.length, self.max_material_length
                );
                for instance in 0..part.quantity {
                    self.mark_unplaced(InstanceKey::new(part_idx, instance), reason.clone());
                }
            }
        }

        if self.materials.iter().any(Material::is_unlimited) {
            return true;
        }

        let demand: f64 = self
            .table
            .iter()
            .filter(|(_, p)| f64::from(p.length) <= self.max_material_length)
            .map(|(_, p)| f64::from(p.length) * f64::from(p.quantity))
            .sum();
        let supply: f64 = self
            .materials
            .iter()
            .map(|m| f64::from(m.length) * f64::from(m.quantity))
            .sum();

        if supply < demand {
            self.warnings.push(format!(
                "total material supply ({supply} mm) is insufficient for requested parts ({demand} mm)"
            ));
            self.unplace_all_remaining("total material supply insufficient");
            return false;
        }
        true
    }

    fn unplace_all_remaining(&mut self, reason: &str) {
        let table = self.table;
        for (part_idx, part) in table.iter() {
            for instance in 0..part.quantity {
                let key = InstanceKey::new(part_idx, instance);
                if !self.resolved.contains(&key) {
                    self.mark_unplaced(key, reason.to_string());
                }
            }
        }
    }

    /// Phase 2: place one chain, splitting into sub-chains when the whole
    /// run does not fit anywhere. Members that end up alone fall back to
    /// loose placement.
    fn place_chain(&mut self, chain: &SharedCutChain, loose: &mut Vec<InstanceKey>) {
        // Runs of members not already resolved (phase 1 may have taken some).
        let mut ranges: Vec<(usize, usize)> = Vec::new();
        let mut start = None;
        for (i, key) in chain.parts.iter().enumerate() {
            if self.resolved.contains(key) {
                if let Some(s) = start.take() {
                    ranges.push((s, i));
                }
            } else if start.is_none() {
                start = Some(i);
            }
        }
        if let Some(s) = start {
            ranges.push((s, chain.parts.len()));
        }

        while let Some((lo, hi)) = ranges.pop() {
            if hi - lo < 2 {
                loose.extend(&chain.parts[lo..hi]);
                continue;
            }

            let mut placed_window = false;
            'search: for size in (2..=(hi - lo)).rev() {
                for ws in lo..=(hi - size) {
                    if let Some(bin) = self.bin_for_window(chain, ws, ws + size) {
                        self.place_window(chain, ws, ws + size, bin);
                        if ws > lo {
                            ranges.push((lo, ws));
                        }
                        if ws + size < hi {
                            ranges.push((ws + size, hi));
                        }
                        placed_window = true;
                        break 'search;
                    }
                }
            }
            if !placed_window {
                loose.extend(&chain.parts[lo..hi]);
            }
        }
    }

    /// Net length of a contiguous chain window: member lengths minus the
    /// savings of the joints inside the window.
    fn window_body(&self, chain: &SharedCutChain, lo: usize, hi: usize) -> f64 {
        let lengths: f64 = chain.parts[lo..hi]
            .iter()
            .map(|k| f64::from(self.table.part(k.part).length))
            .sum();
        let savings: f64 = chain.connections[lo..hi - 1].iter().map(|c| c.savings).sum();
        lengths - savings
    }

    /// Best-fit bin for a chain window: the smallest non-negative residual
    /// wins; a fresh bar is created when nothing fits.
    fn bin_for_window(&mut self, chain: &SharedCutChain, lo: usize, hi: usize) -> Option<usize> {
        let body = self.window_body(chain, lo, hi);

        let mut best: Option<(usize, f64)> = None;
        for i in 0..self.pool.bins.len() {
            let avail = self.bin_available(i);
            let req = self.bin_required(i, body);
            let residual = avail - req;
            if residual >= 0.0 && best.is_none_or(|(_, r)| residual < r) {
                best = Some((i, residual));
            }
        }
        if let Some((i, _)) = best {
            return Some(i);
        }
        self.create_fitting(body)
    }

    fn place_window(&mut self, chain: &SharedCutChain, lo: usize, hi: usize, bin: usize) {
        let mut pos = if self.pool.bins[bin].is_empty() {
            self.constraints.front_end_loss
        } else {
            self.pool.bins[bin].used_length + self.constraints.part_spacing()
        };

        for k in lo..hi {
            let key = chain.parts[k];
            let length = f64::from(self.table.part(key.part).length);
            let shared = (k + 1 < hi).then(|| RawShared {
                partner: chain.parts[k + 1],
                angle: chain.connections[k].angle,
                savings: chain.connections[k].savings,
            });
            self.record_placement(key, bin, pos, shared);
            pos += length;
            if k + 1 < hi {
                pos -= chain.connections[k].savings;
            }
        }

        let bin_ref = &mut self.pool.bins[bin];
        bin_ref.used_length = pos;
        bin_ref.parts_placed += hi - lo;
        let mat_len = f64::from(self.materials[bin_ref.material as usize].length);
        debug_assert!(bin_ref.used_length <= mat_len - self.constraints.back_end_loss + 1e-9);
    }

    /// Phases 3 and 4: Best-Fit-Decreasing over loose parts in adaptive
    /// batches. Returns the items left for the aggressive pass.
    fn pack_loose(
        &mut self,
        chains: &[SharedCutChain],
        extra: Vec<InstanceKey>,
        reporter: &dyn ProgressReporter,
    ) -> Vec<InstanceKey> {
        let chained: HashSet<InstanceKey> = chains
            .iter()
            .flat_map(|c| c.parts.iter().copied())
            .collect();

        let mut items: Vec<InstanceKey> = extra;
        for (part_idx, part) in self.table.iter() {
            for instance in 0..part.quantity {
                let key = InstanceKey::new(part_idx, instance);
                if !chained.contains(&key) && !self.resolved.contains(&key) {
                    items.push(key);
                }
            }
        }
        items.sort_by_key(|k| std::cmp::Reverse(self.table.part(k.part).length));

        let total = items.len();
        let mut batch_size = BATCH_INITIAL;
        let mut failure_streak: u32 = 0;
        let mut pending: Vec<InstanceKey> = Vec::new();
        let mut cursor = 0;

        while cursor < total {
            let end = (cursor + batch_size).min(total);
            let batch = &items[cursor..end];

            let mut placed_count = 0usize;
            let mut failed: Vec<InstanceKey> = Vec::new();
            for &key in batch {
                match self.try_place(key) {
                    Outcome::Placed => placed_count += 1,
                    Outcome::NoSpace => failed.push(key),
                    Outcome::Impossible(reason) => self.mark_unplaced(key, reason),
                }
            }

            let success_rate = placed_count as f64 / batch.len() as f64;
            let mut still_failed = Vec::new();
            if !failed.is_empty() {
                self.grow_pool(&failed, success_rate);
                for key in failed {
                    match self.try_place(key) {
                        Outcome::Placed => placed_count += 1,
                        Outcome::NoSpace => still_failed.push(key),
                        Outcome::Impossible(reason) => self.mark_unplaced(key, reason),
                    }
                }
            }

            if success_rate >= 0.5 && still_failed.is_empty() {
                batch_size = ((batch_size as f64 * BATCH_GROWTH) as usize).min(BATCH_MAX);
                failure_streak = 0;
            } else if success_rate < 0.5 {
                failure_streak += 1;
                if failure_streak >= FAILURE_STREAK_LIMIT {
                    batch_size = (batch_size / 2).max(BATCH_MIN);
                    failure_streak = 0;
                }
            } else {
                failure_streak = 0;
            }
            pending.extend(still_failed);

            cursor = end;
            reporter.report(ProgressUpdate {
                stage: "placement",
                percent: 40.0 + 55.0 * cursor as f64 / total.max(1) as f64,
                details: format!("packed {cursor}/{total} parts"),
            });
        }

        pending
    }

    /// Phase 5: halve the end losses, provision a large block of bars,
    /// and retry. Whatever still fails is final.
    fn aggressive_pass(&mut self, mut pending: Vec<InstanceKey>) {
        self.constraints.front_end_loss /= 2.0;
        self.constraints.cutting_loss /= 2.0;

        if let Some(spec) = self.growable_family(self.longest_pending(&pending)) {
            let target = pending.len().max(AGGRESSIVE_MIN_BLOCK);
            for _ in 0..target {
                self.pool.create(spec);
            }
        }

        pending.sort_by_key(|k| std::cmp::Reverse(self.table.part(k.part).length));
        for key in pending {
            match self.try_place(key) {
                Outcome::Placed => {}
                Outcome::NoSpace => {
                    self.mark_unplaced(key, "no space available after aggressive retries".into())
                }
                Outcome::Impossible(reason) => self.mark_unplaced(key, reason),
            }
        }
    }

    fn longest_pending(&self, pending: &[InstanceKey]) -> f64 {
        pending
            .iter()
            .map(|k| f64::from(self.table.part(k.part).length))
            .fold(0.0, f64::max)
            + self.constraints.front_end_loss
            + self.constraints.back_end_loss
    }

    /// Try to place one loose part: existing bins by score, then a fresh
    /// bar, longest family first.
    fn try_place(&mut self, key: InstanceKey) -> Outcome {
        let length = f64::from(self.table.part(key.part).length);

        if length > self.max_material_length {
            return Outcome::Impossible(format!(
                "part length {} mm exceeds longest material ({} mm)",
                length, self.max_material_length
            ));
        }
        let end_losses = self.constraints.front_end_loss + self.constraints.back_end_loss;
        if length + end_losses > self.max_material_length {
            return Outcome::Impossible(format!(
                "part length {} mm with front-end loss exceeds longest material ({} mm)",
                length, self.max_material_length
            ));
        }

        if let Some(bin) = self.find_bin(length) {
            self.place_item(key, bin);
            return Outcome::Placed;
        }
        if let Some(bin) = self.create_fitting(length) {
            self.place_item(key, bin);
            return Outcome::Placed;
        }
        Outcome::NoSpace
    }

    /// Best bin by score, visiting material families longest bar first.
    /// Tiny parts skip a family when a shorter one could hold them.
    fn find_bin(&self, length: f64) -> Option<usize> {
        let rough_need =
            length + self.constraints.front_end_loss + self.constraints.back_end_loss;

        for (fi, &spec) in self.family_order.iter().enumerate() {
            let mat_len = f64::from(self.materials[spec as usize].length);
            let shorter_family_fits = self.family_order[fi + 1..]
                .iter()
                .any(|&s| f64::from(self.materials[s as usize].length) >= rough_need);
            if length / mat_len < 0.01 && shorter_family_fits {
                continue;
            }

            let mut best: Option<(usize, f64)> = None;
            for (i, bin) in self.pool.bins.iter().enumerate() {
                if bin.material != spec {
                    continue;
                }
                let avail = self.bin_available(i);
                let req = self.bin_required(i, length);
                if let Some(score) = self.score_bin(i, mat_len, req, avail)
                    && best.is_none_or(|(_, s)| score > s)
                {
                    best = Some((i, score));
                }
            }
            if let Some((i, _)) = best {
                return Some(i);
            }
        }
        None
    }

    /// The bin-scoring function: flat scores for perfect and tight fits,
    /// fill-rate-proportional for started bars, residual-proportional for
    /// fresh ones, plus concentration and family-length adjustments.
    fn score_bin(&self, bin: usize, mat_len: f64, req: f64, avail: f64) -> Option<f64> {
        let after = avail - req;
        if after < 0.0 {
            return None;
        }
        let bin_ref = &self.pool.bins[bin];

        let mut score = if after < self.constraints.cutting_loss {
            SCORE_PERFECT
        } else if after < TIGHT_WINDOW {
            SCORE_TIGHT_BASE - after
        } else if !bin_ref.is_empty() {
            ((mat_len - avail) / mat_len) * 1_000.0
        } else {
            100.0 - (after / mat_len) * 100.0
        };

        if !bin_ref.is_empty() {
            score += 20.0;
        }
        if (bin_ref.used_length + req) / mat_len > 0.95 {
            score += 50.0;
        }
        if bin_ref.is_empty() && req / mat_len < 0.5 {
            score -= 30.0;
        }
        score += 500.0 * (mat_len / self.max_material_length);

        Some(score)
    }

    /// Create a bar that can take `body` mm plus end losses, longest
    /// family first; promotes supply as a last resort when allowed.
    fn create_fitting(&mut self, body: f64) -> Option<usize> {
        let needed = body + self.constraints.front_end_loss + self.constraints.back_end_loss;
        for fi in 0..self.family_order.len() {
            let spec = self.family_order[fi];
            if f64::from(self.materials[spec as usize].length) < needed {
                continue;
            }
            if self.pool.can_create(self.materials, spec) {
                return Some(self.pool.create(spec));
            }
        }
        // All fitting families exhausted; promote the longest one that fits.
        if self.constraints.allow_supply_promotion && self.pool.promoted().is_none() {
            let candidate = self
                .family_order
                .iter()
                .copied()
                .find(|&s| f64::from(self.materials[s as usize].length) >= needed);
            if let Some(spec) = candidate {
                self.pool.promote(spec);
                self.warnings.push(format!(
                    "supply of material '{}' exhausted; treating it as unlimited",
                    self.materials[spec as usize].id
                ));
                return Some(self.pool.create(spec));
            }
        }
        None
    }

    /// Grow the pool after a batch left parts without space. The worse
    /// the batch went, the more bars are provisioned.
    fn grow_pool(&mut self, failed: &[InstanceKey], success_rate: f64) {
        let Some(spec) = self.growable_family(self.longest_pending(failed)) else {
            return;
        };
        let factor = if success_rate >= 0.75 {
            2
        } else if success_rate >= 0.5 {
            4
        } else if success_rate >= 0.25 {
            6
        } else {
            10
        };

        let bar = f64::from(self.materials[spec as usize].length);
        let failed_length: f64 = failed
            .iter()
            .map(|k| f64::from(self.table.part(k.part).length))
            .sum();
        let needed = (failed_length / (bar * ESTIMATED_UTILIZATION)).ceil().max(1.0) as usize;
        let count = (needed * factor).min(failed.len().max(1));
        for _ in 0..count {
            self.pool.create(spec);
        }
    }

    /// A family we may freely create bars from: the longest unlimited
    /// one, or the longest fitting finite one after promotion.
    fn growable_family(&mut self, min_length: f64) -> Option<u32> {
        if let Some(spec) = longest_unlimited(self.materials, self.pool.promoted()) {
            return Some(spec);
        }
        if !self.constraints.allow_supply_promotion {
            return None;
        }
        let candidate = self
            .family_order
            .iter()
            .copied()
            .find(|&s| f64::from(self.materials[s as usize].length) >= min_length)?;
        self.pool.promote(candidate);
        self.warnings.push(format!(
            "supply of material '{}' exhausted; treating it as unlimited",
            self.materials[candidate as usize].id
        ));
        Some(candidate)
    }

    fn bin_available(&self, bin: usize) -> f64 {
        let bin_ref = &self.pool.bins[bin];
        let mat_len = f64::from(self.materials[bin_ref.material as usize].length);
        mat_len - self.constraints.back_end_loss - bin_ref.used_length
    }

    fn bin_required(&self, bin: usize, body: f64) -> f64 {
        if self.pool.bins[bin].is_empty() {
            self.constraints.front_end_loss + body
        } else {
            self.constraints.part_spacing() + body
        }
    }

    fn place_item(&mut self, key: InstanceKey, bin: usize) {
        let length = f64::from(self.table.part(key.part).length);
        let position = if self.pool.bins[bin].is_empty() {
            self.constraints.front_end_loss
        } else {
            self.pool.bins[bin].used_length + self.constraints.part_spacing()
        };
        self.record_placement(key, bin, position, None);

        let bin_ref = &mut self.pool.bins[bin];
        bin_ref.used_length = position + length;
        bin_ref.parts_placed += 1;
        let mat_len = f64::from(self.materials[bin_ref.material as usize].length);
        debug_assert!(bin_ref.used_length <= mat_len - self.constraints.back_end_loss + 1e-9);
    }

    fn record_placement(
        &mut self,
        key: InstanceKey,
        bin: usize,
        position: f64,
        shared: Option<RawShared>,
    ) {
        let fresh = self.resolved.insert(key);
        debug_assert!(fresh, "instance placed twice: {key:?}");
        self.placed.push(RawPlacement {
            key,
            bin,
            position,
            shared,
        });
    }

    fn mark_unplaced(&mut self, key: InstanceKey, reason: String) {
        let fresh = self.resolved.insert(key);
        debug_assert!(fresh, "instance resolved twice: {key:?}");
        self.unplaced.push((key, reason));
    }

    fn assemble(mut self, strategy: &str) -> PlacementResult {
        self.placed.sort_by(|a, b| {
            a.bin
                .cmp(&b.bin)
                .then(a.position.partial_cmp(&b.position).unwrap())
        });

        let placed_parts: Vec<PlacedPart> = self
            .placed
            .iter()
            .map(|p| {
                let part = self.table.part(p.key.part);
                let bin = &self.pool.bins[p.bin];
                PlacedPart {
                    part_id: part.id.clone(),
                    part_instance_id: p.key.instance,
                    material_id: self.materials[bin.material as usize].id.clone(),
                    material_instance_id: bin.instance_id(self.materials),
                    position: p.position,
                    length: part.length,
                    orientation: Orientation::Normal,
                    shared_cutting_info: p.shared.map(|s| SharedCutInfo {
                        paired_with_part_id: self.table.part(s.partner.part).id.clone(),
                        paired_with_instance_id: s.partner.instance,
                        shared_angle: s.angle,
                        savings: s.savings,
                    }),
                }
            })
            .collect();

        let mut unplaced_parts: Vec<UnplacedPart> = self
            .unplaced
            .iter()
            .map(|(key, reason)| UnplacedPart {
                part_id: self.table.part(key.part).id.clone(),
                instance_id: key.instance,
                reason: reason.clone(),
            })
            .collect();
        unplaced_parts.sort_by(|a, b| a.part_id.cmp(&b.part_id).then(a.instance_id.cmp(&b.instance_id)));

        let mut used_materials = Vec::new();
        let mut used_sum = 0.0;
        let mut capacity_sum = 0.0;
        for bin in &self.pool.bins {
            if bin.is_empty() {
                continue;
            }
            let material = &self.materials[bin.material as usize];
            let mat_len = f64::from(material.length);
            used_sum += bin.used_length;
            capacity_sum += mat_len;
            used_materials.push(UsedMaterial {
                material: material.clone(),
                instance_id: bin.instance_id(self.materials),
                utilization: bin.used_length / mat_len,
            });
        }

        let total_savings: f64 = self
            .placed
            .iter()
            .filter_map(|p| p.shared.map(|s| s.savings))
            .sum();
        let shared_cut_pairs = self.placed.iter().filter(|p| p.shared.is_some()).count();

        let success = unplaced_parts.is_empty();
        PlacementResult {
            report: PlacementReport {
                total_parts: self.table.total_instances() as usize,
                placed_parts: placed_parts.len(),
                material_utilization: if capacity_sum > 0.0 {
                    used_sum / capacity_sum
                } else {
                    0.0
                },
                shared_cut_pairs,
                processing_ms: self.started.elapsed().as_millis() as u64,
                strategy: strategy.to_string(),
            },
            placed_parts,
            unplaced_parts,
            used_materials,
            total_savings,
            success,
            warnings: self.warnings,
        }
    }
}
