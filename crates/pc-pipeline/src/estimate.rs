//! Quick design-time estimation without placement.
//!
//! Gives instant feedback while a cut list is being edited: how much
//! shared cutting could save and roughly how many bars the job needs,
//! without running the full pipeline.

use serde::Serialize;

use pc_core::material::{Material, standard_stock_for};
use pc_core::part::Part;
use pc_match::matcher::AngleMatcher;

/// Fill rate assumed when estimating bar counts.
const ESTIMATED_UTILIZATION: f64 = 0.85;

/// A fast, placement-free estimate of a job.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickEstimate {
    pub total_parts: u64,
    pub total_length_mm: u64,
    /// Shared-cut savings available in the catalog, in millimeters.
    pub potential_savings: f64,
    pub match_count: usize,
    pub average_savings_per_match: f64,
    /// Bar length the estimate assumes: the longest catalog material, or
    /// a standard stock length when no materials are given.
    pub estimated_bar_length: u32,
    pub estimated_bars: u32,
}

/// Estimate a job from its catalogs. `materials` may be empty; standard
/// stock lengths stand in for the bar length then.
pub fn quick_estimate(parts: &[Part], materials: &[Material], tolerance: f64) -> QuickEstimate {
    let total_parts: u64 = parts.iter().map(|p| u64::from(p.quantity)).sum();
    let total_length_mm: u64 = parts
        .iter()
        .map(|p| u64::from(p.length) * u64::from(p.quantity))
        .sum();

    let matcher = AngleMatcher::new(tolerance);
    let potential = matcher.evaluate_shared_cutting_potential(parts);

    let longest_part = parts.iter().map(|p| p.length).max().unwrap_or(0);
    let estimated_bar_length = materials
        .iter()
        .map(|m| m.length)
        .max()
        .unwrap_or_else(|| standard_stock_for(f64::from(longest_part)));

    let net_length = total_length_mm as f64 - potential.total_potential_savings;
    let estimated_bars = if estimated_bar_length == 0 || net_length <= 0.0 {
        0
    } else {
        (net_length / (f64::from(estimated_bar_length) * ESTIMATED_UTILIZATION)).ceil() as u32
    };

    QuickEstimate {
        total_parts,
        total_length_mm,
        potential_savings: potential.total_potential_savings,
        match_count: potential.match_count,
        average_savings_per_match: potential.average_savings_per_match,
        estimated_bar_length,
        estimated_bars,
    }
}
