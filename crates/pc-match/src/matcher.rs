//! Pairwise bevel matching and scoring.
//!
//! Two parts can share a cut when adjacent corners carry bevels whose
//! angles agree within the matcher's tolerance. A shared cut replaces two
//! kerfs with one, saving `thickness / sin(angle)` millimeters of stock
//! (capped at three thicknesses for very shallow bevels).

use serde::{Deserialize, Serialize};

use pc_core::part::{AnglePosition, CornerAngles, Part};

use crate::groups::{AngleGroups, stratified_sample};

/// Matches below this score are not worth a chain joint; set-level
/// operations drop them.
const MIN_MATCH_SCORE: f64 = 5.0;

/// Potential-evaluation inputs larger than this are sampled.
const SAMPLE_THRESHOLD: usize = 500;

/// Material saved by one shared cut at `angle` degrees between profiles
/// of average thickness `thickness_avg`, in millimeters.
pub fn joint_savings(angle: f64, thickness_avg: f64) -> f64 {
    (thickness_avg / angle.to_radians().sin()).min(3.0 * thickness_avg)
}

/// A candidate shared-cut joint between two parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AngleMatch {
    pub part1_id: String,
    pub part2_id: String,
    pub part1_position: AnglePosition,
    pub part2_position: AnglePosition,
    /// The shared angle: exact value when equal, average otherwise.
    pub angle: f64,
    pub angle_difference: f64,
    pub is_exact: bool,
    /// Millimeters of stock saved by cutting both bevels in one kerf.
    pub savings: f64,
    pub score: f64,
}

/// Summary of how much shared cutting a catalog could save.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedCutPotential {
    pub total_potential_savings: f64,
    pub match_count: usize,
    pub average_savings_per_match: f64,
}

/// Finds and scores shared-cut opportunities between parts.
#[derive(Debug, Clone)]
pub struct AngleMatcher {
    tolerance: f64,
}

impl AngleMatcher {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Whether two angle values can share a cut: both must be bevels and
    /// agree within tolerance.
    pub fn can_share_cut(&self, a1: f64, a2: f64) -> bool {
        CornerAngles::is_bevel(a1) && CornerAngles::is_bevel(a2) && (a1 - a2).abs() <= self.tolerance
    }

    /// All shared-cut matches between two parts, best score first.
    /// Empty when either part lacks bevels or nothing is within tolerance.
    pub fn find_matches(&self, p1: &Part, p2: &Part) -> Vec<AngleMatch> {
        let mut matches = Vec::new();
        let thickness_avg = (p1.thickness as f64 + p2.thickness as f64) / 2.0;

        for pos1 in AnglePosition::ALL {
            let a1 = p1.angles.angle_at(pos1);
            if !CornerAngles::is_bevel(a1) {
                continue;
            }
            for pos2 in AnglePosition::ALL {
                let a2 = p2.angles.angle_at(pos2);
                if !self.can_share_cut(a1, a2) {
                    continue;
                }

                let difference = (a1 - a2).abs();
                let is_exact = a1 == a2;
                let angle = if is_exact { a1 } else { (a1 + a2) / 2.0 };
                let savings = joint_savings(angle, thickness_avg);
                let score = if is_exact {
                    savings * 1.2
                } else {
                    (savings - 2.0 * difference).max(0.5 * savings)
                };

                matches.push(AngleMatch {
                    part1_id: p1.id.clone(),
                    part2_id: p2.id.clone(),
                    part1_position: pos1,
                    part2_position: pos2,
                    angle,
                    angle_difference: difference,
                    is_exact,
                    savings,
                    score,
                });
            }
        }

        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        matches
    }

    /// The single best match between `part` and any candidate, skipping
    /// self-pairs (same part id).
    pub fn find_best_match_for_part(&self, part: &Part, candidates: &[&Part]) -> Option<AngleMatch> {
        let mut best: Option<AngleMatch> = None;
        for candidate in candidates {
            if candidate.id == part.id {
                continue;
            }
            if let Some(m) = self.find_matches(part, candidate).into_iter().next() {
                let better = best.as_ref().is_none_or(|b| m.score > b.score);
                if better {
                    best = Some(m);
                }
            }
        }
        best
    }

    /// A disjoint set of matches over a catalog: each part joins at most
    /// one match, selected greedily by score. Matches below the minimum
    /// score are dropped.
    pub fn find_best_match_combination(&self, parts: &[Part]) -> Vec<AngleMatch> {
        let mut candidates = Vec::new();
        let groups = AngleGroups::build(parts, self.tolerance);
        for (i, j) in groups.candidate_pairs() {
            if let Some(m) = self.find_matches(&parts[i], &parts[j]).into_iter().next()
                && m.score >= MIN_MATCH_SCORE
            {
                candidates.push((i, j, m));
            }
        }

        candidates.sort_by(|a, b| b.2.score.partial_cmp(&a.2.score).unwrap());

        let mut used = vec![false; parts.len()];
        let mut selected = Vec::new();
        for (i, j, m) in candidates {
            if used[i] || used[j] {
                continue;
            }
            used[i] = true;
            used[j] = true;
            selected.push(m);
        }
        selected
    }

    /// Estimate the total shared-cut savings available in a catalog.
    ///
    /// Catalogs larger than 500 parts are sampled (stratified by average
    /// bevel angle) and the totals scaled back up by the population ratio.
    pub fn evaluate_shared_cutting_potential(&self, parts: &[Part]) -> SharedCutPotential {
        if parts.len() <= SAMPLE_THRESHOLD {
            return self.potential_direct(parts);
        }

        let sample = stratified_sample(parts, SAMPLE_THRESHOLD);
        let scale = parts.len() as f64 / sample.len() as f64;
        let sampled = self.potential_direct(&sample);
        SharedCutPotential {
            total_potential_savings: sampled.total_potential_savings * scale,
            match_count: (sampled.match_count as f64 * scale).round() as usize,
            average_savings_per_match: sampled.average_savings_per_match,
        }
    }

    fn potential_direct(&self, parts: &[Part]) -> SharedCutPotential {
        let matches = self.find_best_match_combination(parts);
        let total: f64 = matches.iter().map(|m| m.savings).sum();
        let count = matches.len();
        SharedCutPotential {
            total_potential_savings: total,
            match_count: count,
            average_savings_per_match: if count == 0 { 0.0 } else { total / count as f64 },
        }
    }
}
