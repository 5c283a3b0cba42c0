//! The material-instance pool.
//!
//! Bars are created on demand: an initial pool sized by a utilization
//! heuristic, then grown while packing. The placer owns the pool for the
//! whole run.

use pc_core::material::Material;

/// One concrete bar cut from a material spec.
#[derive(Debug, Clone)]
pub struct MaterialInstance {
    /// Index of the spec in the run's material list.
    pub material: u32,
    /// Sequence number within the spec.
    pub index: u32,
    /// Consumption cursor: end position of the last placed part.
    pub used_length: f64,
    pub parts_placed: usize,
}

impl MaterialInstance {
    pub fn new(material: u32, index: u32) -> Self {
        Self {
            material,
            index,
            used_length: 0.0,
            parts_placed: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.parts_placed == 0
    }

    /// Wire identifier, `"{specId}_{index}"`.
    pub fn instance_id(&self, materials: &[Material]) -> String {
        format!("{}_{}", materials[self.material as usize].id, self.index)
    }
}

/// Expected fill rate when estimating how many bars a demand needs.
const ESTIMATED_UTILIZATION: f64 = 0.85;

/// Initial-pool scale factor for large-batch inputs.
const LARGE_BATCH_SCALE: f64 = 2.5;

/// Inputs above this many items count as large batches.
const LARGE_BATCH_ITEMS: usize = 500;

/// All bar instances of one run, with per-spec creation accounting.
#[derive(Debug)]
pub struct InstancePool {
    pub bins: Vec<MaterialInstance>,
    created: Vec<u32>,
    promoted: Option<u32>,
}

impl InstancePool {
    pub fn new(material_count: usize) -> Self {
        Self {
            bins: Vec::new(),
            created: vec![0; material_count],
            promoted: None,
        }
    }

    pub fn is_unlimited(&self, materials: &[Material], spec: u32) -> bool {
        materials[spec as usize].is_unlimited() || self.promoted == Some(spec)
    }

    /// Whether another bar of this spec can be created.
    pub fn can_create(&self, materials: &[Material], spec: u32) -> bool {
        self.is_unlimited(materials, spec)
            || self.created[spec as usize] < materials[spec as usize].quantity
    }

    /// Create one bar; the caller must have checked `can_create`.
    pub fn create(&mut self, spec: u32) -> usize {
        let index = self.created[spec as usize];
        self.created[spec as usize] += 1;
        self.bins.push(MaterialInstance::new(spec, index));
        self.bins.len() - 1
    }

    /// Treat a finite spec as unlimited from now on.
    pub fn promote(&mut self, spec: u32) {
        self.promoted = Some(spec);
    }

    pub fn promoted(&self) -> Option<u32> {
        self.promoted
    }

    pub fn created_count(&self, spec: u32) -> u32 {
        self.created[spec as usize]
    }

    /// Seed the pool for a fresh run: roughly
    /// `ceil(total_required / (longest unlimited length * 0.85))` bars of
    /// the longest unlimited family, scaled up for large batches. No-op
    /// when nothing is unlimited.
    pub fn seed_initial(
        &mut self,
        materials: &[Material],
        total_required: f64,
        item_count: usize,
    ) -> usize {
        let Some(spec) = longest_unlimited(materials, self.promoted) else {
            return 0;
        };
        let bar = f64::from(materials[spec as usize].length);
        let mut count = (total_required / (bar * ESTIMATED_UTILIZATION)).ceil() as usize;
        if item_count > LARGE_BATCH_ITEMS {
            count = (count as f64 * LARGE_BATCH_SCALE).ceil() as usize;
        }
        let count = count.clamp(1, item_count.max(1));
        for _ in 0..count {
            self.create(spec);
        }
        count
    }
}

/// The longest spec with unlimited supply, if any.
pub fn longest_unlimited(materials: &[Material], promoted: Option<u32>) -> Option<u32> {
    materials
        .iter()
        .enumerate()
        .filter(|(i, m)| m.is_unlimited() || promoted == Some(*i as u32))
        .max_by_key(|(_, m)| m.length)
        .map(|(i, _)| i as u32)
}
