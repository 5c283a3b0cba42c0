use std::collections::HashSet;

use pc_core::part::{AnglePosition, InstanceKey, PartTable};

/// Hard cap on parts per chain.
pub const MAX_CHAIN_SIZE: usize = 50;

/// Hard cap on a chain's total length in millimeters. Sized so a chain
/// always fits the longest standard stock with room for end losses.
pub const MAX_CHAIN_LENGTH: f64 = 14_950.0;

/// Same-id chains longer than this count as Batch rather than Linear.
const LINEAR_MAX_PARTS: usize = 10;

/// Shape of a chain, by how many distinct part specs it contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainStructure {
    /// One part spec, up to ten parts.
    Linear,
    /// One part spec, more than ten parts.
    Batch,
    /// Exactly two distinct part specs.
    Mixed,
    /// Three or more distinct part specs.
    Complex,
}

/// The shared-cut joint between two consecutive chain members.
#[derive(Debug, Clone)]
pub struct ChainConnection {
    /// Corner on the earlier part.
    pub from_position: AnglePosition,
    /// Corner on the later part.
    pub to_position: AnglePosition,
    /// The shared angle in degrees.
    pub angle: f64,
    /// Whether the two bevels agreed exactly (no tolerance averaging).
    pub is_exact: bool,
    /// Millimeters saved by this joint.
    pub savings: f64,
}

/// An ordered run of part instances connected by shared cuts.
///
/// Parts reference concrete instances via interned keys; there is always
/// exactly one connection between consecutive parts. Chains live only
/// between the chain builder and the placer.
#[derive(Debug, Clone)]
pub struct SharedCutChain {
    pub parts: Vec<InstanceKey>,
    pub connections: Vec<ChainConnection>,
    /// Sum of member lengths minus total savings.
    pub total_length: f64,
    /// Sum of connection savings.
    pub total_savings: f64,
    pub structure: ChainStructure,
}

impl SharedCutChain {
    /// Build a chain from its members, computing the aggregates.
    pub fn assemble(
        parts: Vec<InstanceKey>,
        connections: Vec<ChainConnection>,
        table: &PartTable,
    ) -> Self {
        debug_assert_eq!(connections.len() + 1, parts.len());
        let raw: f64 = parts
            .iter()
            .map(|k| f64::from(table.part(k.part).length))
            .sum();
        let total_savings: f64 = connections.iter().map(|c| c.savings).sum();
        let structure = classify(&parts);
        Self {
            total_length: raw - total_savings,
            total_savings,
            parts,
            connections,
            structure,
        }
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Savings per member part, the builder's efficiency measure.
    pub fn savings_per_part(&self) -> f64 {
        if self.parts.is_empty() {
            return 0.0;
        }
        self.total_savings / self.parts.len() as f64
    }
}

fn classify(parts: &[InstanceKey]) -> ChainStructure {
    let distinct: HashSet<u32> = parts.iter().map(|k| k.part).collect();
    match distinct.len() {
        0 | 1 => {
            if parts.len() <= LINEAR_MAX_PARTS {
                ChainStructure::Linear
            } else {
                ChainStructure::Batch
            }
        }
        2 => ChainStructure::Mixed,
        _ => ChainStructure::Complex,
    }
}
