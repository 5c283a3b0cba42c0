//! Chain construction.
//!
//! Two strategies feed one pool of part instances:
//!
//! * **batch**: same-part chains, built arithmetically from each spec's
//!   best bevel, sized to the chain length cap;
//! * **mixed**: greedy growth across specs, extending the chain end with
//!   the best-scoring match the matcher can find.
//!
//! Catalogs with a handful of distinct beveled specs run mixed first
//! (cross-spec joints are rarer and worth reserving instances for);
//! everything else runs batch first. Instances are tracked per spec as a
//! `(cursor, remaining)` record, so a quantity of 100,000 never
//! materializes 100,000 objects.

use std::collections::HashSet;
use std::time::Instant;

use pc_core::part::{AnglePosition, InstanceKey, Part, PartTable};
use pc_core::progress::{NullReporter, ProgressReporter, ProgressUpdate};
use pc_match::groups::PairCache;
use pc_match::matcher::{AngleMatch, AngleMatcher, joint_savings};

use crate::chain::{
    ChainConnection, ChainStructure, MAX_CHAIN_LENGTH, MAX_CHAIN_SIZE, SharedCutChain,
};

/// Hard cap on chains per run.
pub const MAX_TOTAL_CHAINS: usize = 4_500;

/// At most this many distinct part specs are considered per run.
pub const MAX_PART_TYPES: usize = 1_000;

/// Mixed-strategy iteration cap.
pub const MAX_MIXED_ITERATIONS: usize = 500;

/// A mixed chain only grows through matches at least this good.
const MIN_EXTENSION_SCORE: f64 = 10.0;

/// A chain below this total savings is not worth its handling cost.
const MIN_CHAIN_SAVINGS: f64 = 10.0;

/// Non-batch chains must save at least this much per member.
const MIN_SAVINGS_PER_PART: f64 = 5.0;

/// Mixed-first only pays off for small spec counts.
const MIXED_FIRST_MAX_TYPES: usize = 5;

/// Mixed-first also requires per-spec quantities at or below this.
const MODEST_QUANTITY: u32 = 100;

/// Seed selection looks at this many candidates.
const SEED_CANDIDATE_LIMIT: usize = 10;

#[derive(Debug, Clone)]
pub struct ChainBuilderConfig {
    pub angle_tolerance: f64,
    pub max_chain_size: usize,
    pub max_chain_length: f64,
    /// Try cross-spec chains before same-spec chains on small catalogs.
    pub prioritize_mixed_chains: bool,
}

impl Default for ChainBuilderConfig {
    fn default() -> Self {
        Self {
            angle_tolerance: 5.0,
            max_chain_size: MAX_CHAIN_SIZE,
            max_chain_length: MAX_CHAIN_LENGTH,
            prioritize_mixed_chains: true,
        }
    }
}

/// Summary of one chain-building run.
#[derive(Debug, Clone, Default)]
pub struct ChainReport {
    pub total_chains: usize,
    pub total_parts_in_chains: usize,
    pub total_savings: f64,
    pub linear_chains: usize,
    pub batch_chains: usize,
    pub mixed_chains: usize,
    pub complex_chains: usize,
    pub processing_ms: u64,
}

/// Per-spec instance bookkeeping: `cursor` is the next unused instance id,
/// `remaining` how many are still free. This record stands in for the
/// instance list itself.
#[derive(Debug, Clone, Copy)]
struct Supply {
    cursor: u32,
    remaining: u32,
}

impl Supply {
    fn take(&mut self, part: u32) -> InstanceKey {
        debug_assert!(self.remaining > 0);
        let key = InstanceKey::new(part, self.cursor);
        self.cursor += 1;
        self.remaining -= 1;
        key
    }

    fn put_back(&mut self, count: u32) {
        self.cursor -= count;
        self.remaining += count;
    }
}

/// Builds disjoint shared-cut chains over a part catalog.
pub struct ChainBuilder<'a> {
    table: &'a PartTable,
    config: ChainBuilderConfig,
    matcher: AngleMatcher,
    cache: PairCache,
}

impl<'a> ChainBuilder<'a> {
    pub fn new(table: &'a PartTable, config: ChainBuilderConfig) -> Self {
        let matcher = AngleMatcher::new(config.angle_tolerance);
        Self {
            table,
            config,
            matcher,
            cache: PairCache::new(),
        }
    }

    pub fn build_chains(&mut self) -> Vec<SharedCutChain> {
        self.build_chains_with_report(&NullReporter).0
    }

    /// Build chains and a run report, reporting progress at strategy and
    /// spec boundaries.
    pub fn build_chains_with_report(
        &mut self,
        reporter: &dyn ProgressReporter,
    ) -> (Vec<SharedCutChain>, ChainReport) {
        let started = Instant::now();

        let mut supply: Vec<Supply> = self
            .table
            .iter()
            .map(|(_, p)| Supply {
                cursor: 0,
                remaining: p.quantity,
            })
            .collect();

        let beveled: Vec<u32> = self
            .table
            .iter()
            .filter(|(_, p)| p.has_bevel() && p.quantity > 0)
            .map(|(i, _)| i)
            .take(MAX_PART_TYPES)
            .collect();

        let mut chains = Vec::new();

        if beveled.is_empty() {
            reporter.report(ProgressUpdate {
                stage: "chains",
                percent: 100.0,
                details: "no beveled parts".into(),
            });
            return (chains, self.report(&[], started));
        }

        let mixed_first = self.config.prioritize_mixed_chains
            && beveled.len() > 1
            && beveled.len() <= MIXED_FIRST_MAX_TYPES
            && beveled
                .iter()
                .all(|&i| self.table.part(i).quantity <= MODEST_QUANTITY);

        if mixed_first {
            self.build_mixed(&beveled, &mut supply, &mut chains, reporter, 0.0, 60.0);
            self.build_batch(&beveled, &mut supply, &mut chains, reporter, 60.0, 95.0);
        } else {
            self.build_batch(&beveled, &mut supply, &mut chains, reporter, 0.0, 60.0);
            self.build_mixed(&beveled, &mut supply, &mut chains, reporter, 60.0, 95.0);
        }

        reporter.report(ProgressUpdate {
            stage: "chains",
            percent: 100.0,
            details: format!("{} chains", chains.len()),
        });

        let report = self.report(&chains, started);
        (chains, report)
    }

    fn report(&self, chains: &[SharedCutChain], started: Instant) -> ChainReport {
        let mut report = ChainReport {
            total_chains: chains.len(),
            total_parts_in_chains: chains.iter().map(|c| c.len()).sum(),
            total_savings: chains.iter().map(|c| c.total_savings).sum(),
            processing_ms: started.elapsed().as_millis() as u64,
            ..ChainReport::default()
        };
        for chain in chains {
            match chain.structure {
                ChainStructure::Linear => report.linear_chains += 1,
                ChainStructure::Batch => report.batch_chains += 1,
                ChainStructure::Mixed => report.mixed_chains += 1,
                ChainStructure::Complex => report.complex_chains += 1,
            }
        }
        report
    }

    /// Same-part chains: each spec's best bevel decides the per-joint
    /// savings, and chain sizes follow from the length cap.
    fn build_batch(
        &mut self,
        beveled: &[u32],
        supply: &mut [Supply],
        chains: &mut Vec<SharedCutChain>,
        reporter: &dyn ProgressReporter,
        lo: f64,
        hi: f64,
    ) {
        let table = self.table;
        for (done, &part_idx) in beveled.iter().enumerate() {
            let part = table.part(part_idx);
            let Some((position, angle, savings)) = best_shared_angle(part) else {
                continue;
            };
            let length = f64::from(part.length);
            let unit = length - savings;

            while supply[part_idx as usize].remaining >= 2
                && chains.len() < MAX_TOTAL_CHAINS
                && unit > 0.0
            {
                let remaining = supply[part_idx as usize].remaining as usize;
                let mut size = self
                    .config
                    .max_chain_size
                    .min((self.config.max_chain_length / unit) as usize)
                    .min(remaining);
                while size >= 2
                    && size as f64 * length - (size - 1) as f64 * savings
                        > self.config.max_chain_length
                {
                    size -= 1;
                }
                if size < 2 {
                    break;
                }

                let parts: Vec<InstanceKey> = (0..size)
                    .map(|_| supply[part_idx as usize].take(part_idx))
                    .collect();
                let connections: Vec<ChainConnection> = (1..size)
                    .map(|_| ChainConnection {
                        from_position: position,
                        to_position: position,
                        angle,
                        is_exact: true,
                        savings,
                    })
                    .collect();
                let chain = SharedCutChain::assemble(parts, connections, self.table);

                if chain_is_efficient(&chain) {
                    chains.push(chain);
                } else {
                    supply[part_idx as usize].put_back(size as u32);
                    break;
                }
            }

            reporter.report(ProgressUpdate {
                stage: "chains",
                percent: lo + (hi - lo) * (done + 1) as f64 / beveled.len() as f64,
                details: format!("batch {}/{}", done + 1, beveled.len()),
            });
        }
    }

    /// Greedy cross-spec growth: seed with the most-beveled spec, extend
    /// with the best match whose counterpart still has free instances.
    fn build_mixed(
        &mut self,
        beveled: &[u32],
        supply: &mut [Supply],
        chains: &mut Vec<SharedCutChain>,
        reporter: &dyn ProgressReporter,
        lo: f64,
        hi: f64,
    ) {
        let initial: u64 = beveled
            .iter()
            .map(|&i| supply[i as usize].remaining as u64)
            .sum();
        if initial == 0 {
            return;
        }

        let mut stale: HashSet<u32> = HashSet::new();
        let mut iterations = 0;

        while iterations < MAX_MIXED_ITERATIONS && chains.len() < MAX_TOTAL_CHAINS {
            iterations += 1;

            let available: Vec<u32> = beveled
                .iter()
                .copied()
                .filter(|&i| supply[i as usize].remaining >= 1)
                .collect();
            if available.len() < 2 {
                break;
            }

            // Seed choice is bounded: only the first few free specs are
            // even considered, then the most-beveled of those wins.
            let mut seeds: Vec<u32> = available
                .iter()
                .copied()
                .filter(|i| !stale.contains(i))
                .take(SEED_CANDIDATE_LIMIT)
                .collect();
            if seeds.is_empty() {
                break;
            }
            seeds.sort_by_key(|&i| std::cmp::Reverse(self.table.part(i).angles.bevel_count()));
            let seed = seeds[0];

            let mut keys = vec![supply[seed as usize].take(seed)];
            let mut connections: Vec<ChainConnection> = Vec::new();
            let mut total = f64::from(self.table.part(seed).length);
            let mut cur = seed;

            while keys.len() < self.config.max_chain_size {
                let Some((next, m)) = self.best_extension(cur, supply, total) else {
                    break;
                };
                keys.push(supply[next as usize].take(next));
                total += f64::from(self.table.part(next).length) - m.savings;
                connections.push(ChainConnection {
                    from_position: m.part1_position,
                    to_position: m.part2_position,
                    angle: m.angle,
                    is_exact: m.is_exact,
                    savings: m.savings,
                });
                cur = next;
            }

            if keys.len() < 2 {
                rollback(supply, &keys);
                stale.insert(seed);
                continue;
            }

            let chain = SharedCutChain::assemble(keys, connections, self.table);
            if !chain_is_efficient(&chain) {
                rollback(supply, &chain.parts);
                stale.insert(seed);
                continue;
            }

            chains.push(chain);

            let consumed: u64 = initial
                - beveled
                    .iter()
                    .map(|&i| supply[i as usize].remaining as u64)
                    .sum::<u64>();
            reporter.report(ProgressUpdate {
                stage: "chains",
                percent: lo + (hi - lo) * consumed as f64 / initial as f64,
                details: format!("mixed iteration {iterations}"),
            });
        }
    }

    /// The best extension from the chain's current end: highest-scoring
    /// match against a different spec with free instances that keeps the
    /// chain under the length cap.
    fn best_extension(
        &mut self,
        cur: u32,
        supply: &[Supply],
        total: f64,
    ) -> Option<(u32, AngleMatch)> {
        let table = self.table;
        let cur_part = table.part(cur);
        let mut best: Option<(u32, AngleMatch)> = None;

        for (idx, candidate) in table.iter() {
            if idx == cur || supply[idx as usize].remaining == 0 || !candidate.has_bevel() {
                continue;
            }
            for m in self.cache.matches(&self.matcher, cur_part, candidate) {
                if m.score < MIN_EXTENSION_SCORE {
                    continue;
                }
                if total + f64::from(candidate.length) - m.savings > self.config.max_chain_length {
                    continue;
                }
                let better = best.as_ref().is_none_or(|(_, b)| m.score > b.score);
                if better {
                    best = Some((idx, m));
                }
                break; // matches are sorted; the first feasible is the pair's best
            }
        }

        best
    }
}

fn rollback(supply: &mut [Supply], keys: &[InstanceKey]) {
    for key in keys.iter().rev() {
        supply[key.part as usize].put_back(1);
    }
}

/// The bevel position giving the largest per-joint savings for same-part
/// chaining, with the savings clamped into `[5, 2 * thickness]`.
fn best_shared_angle(part: &Part) -> Option<(AnglePosition, f64, f64)> {
    let thickness = f64::from(part.thickness);
    part.angles
        .bevel_positions()
        .into_iter()
        .map(|(pos, angle)| {
            let savings = joint_savings(angle, thickness).clamp(5.0, 2.0 * thickness);
            (pos, angle, savings)
        })
        .max_by(|a, b| a.2.partial_cmp(&b.2).unwrap())
}

/// A chain earns its keep when its savings clear the handling overhead.
fn chain_is_efficient(chain: &SharedCutChain) -> bool {
    chain.total_savings >= MIN_CHAIN_SAVINGS
        && (chain.structure == ChainStructure::Batch
            || chain.savings_per_part() >= MIN_SAVINGS_PER_PART)
}
