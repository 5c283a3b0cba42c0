use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The four corners of a profile where a bevel can be cut.
///
/// Looking at the profile from the side, with its length running left to
/// right: top-left and bottom-left are the leading end, top-right and
/// bottom-right the trailing end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnglePosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl AnglePosition {
    pub const ALL: [AnglePosition; 4] = [
        AnglePosition::TopLeft,
        AnglePosition::TopRight,
        AnglePosition::BottomLeft,
        AnglePosition::BottomRight,
    ];

    /// Whether this corner sits on the left (leading) end of the profile.
    pub fn is_left(self) -> bool {
        matches!(self, AnglePosition::TopLeft | AnglePosition::BottomLeft)
    }

    pub fn is_right(self) -> bool {
        !self.is_left()
    }
}

/// The four corner angles of a part, in degrees.
///
/// A value of 0 means a square cut; values strictly between 0 and 90 are
/// bevels. 90 is rejected by validation and never reaches the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CornerAngles {
    #[serde(alias = "top_left")]
    pub top_left: f64,
    #[serde(alias = "top_right")]
    pub top_right: f64,
    #[serde(alias = "bottom_left")]
    pub bottom_left: f64,
    #[serde(alias = "bottom_right")]
    pub bottom_right: f64,
}

impl CornerAngles {
    pub fn new(top_left: f64, top_right: f64, bottom_left: f64, bottom_right: f64) -> Self {
        Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
        }
    }

    /// All four angles square (no bevels).
    pub fn square() -> Self {
        Self::default()
    }

    /// Whether a single angle value counts as a bevel.
    pub fn is_bevel(angle: f64) -> bool {
        angle > 0.0 && angle < 90.0
    }

    pub fn angle_at(&self, position: AnglePosition) -> f64 {
        match position {
            AnglePosition::TopLeft => self.top_left,
            AnglePosition::TopRight => self.top_right,
            AnglePosition::BottomLeft => self.bottom_left,
            AnglePosition::BottomRight => self.bottom_right,
        }
    }

    /// Number of corners carrying a bevel.
    pub fn bevel_count(&self) -> usize {
        AnglePosition::ALL
            .iter()
            .filter(|p| Self::is_bevel(self.angle_at(**p)))
            .count()
    }

    pub fn has_bevel(&self) -> bool {
        self.bevel_count() > 0
    }

    /// The beveled corners with their angle values.
    pub fn bevel_positions(&self) -> Vec<(AnglePosition, f64)> {
        AnglePosition::ALL
            .iter()
            .map(|p| (*p, self.angle_at(*p)))
            .filter(|(_, a)| Self::is_bevel(*a))
            .collect()
    }

    /// Mean of the beveled angles, or 0 when there are none.
    /// Used to stratify parts when sampling large catalogs.
    pub fn average_bevel(&self) -> f64 {
        let bevels = self.bevel_positions();
        if bevels.is_empty() {
            return 0.0;
        }
        bevels.iter().map(|(_, a)| a).sum::<f64>() / bevels.len() as f64
    }
}

/// A part specification from the cut list.
///
/// Expands into `quantity` part instances, each identified by
/// `(id, instance)` with instance in `0..quantity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    /// Stable identifier (e.g., "frame_rail").
    pub id: String,

    /// Length in millimeters.
    pub length: u32,

    /// How many of this part are needed.
    pub quantity: u32,

    /// Profile thickness in millimeters; drives shared-cut savings.
    pub thickness: u32,

    /// The four corner angles.
    #[serde(default)]
    pub angles: CornerAngles,
}

impl Part {
    pub fn new(id: impl Into<String>, length: u32, quantity: u32, thickness: u32) -> Self {
        Self {
            id: id.into(),
            length,
            quantity,
            thickness,
            angles: CornerAngles::square(),
        }
    }

    pub fn with_angles(mut self, angles: CornerAngles) -> Self {
        self.angles = angles;
        self
    }

    pub fn has_bevel(&self) -> bool {
        self.angles.has_bevel()
    }
}

/// Identity of one concrete part instance, using dense interned indices.
///
/// `part` indexes into the run's [`PartTable`]; `instance` is the zero-based
/// copy number within that spec. This is the only key the optimizer uses in
/// hot paths; string ids reappear at result assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceKey {
    pub part: u32,
    pub instance: u32,
}

impl InstanceKey {
    pub fn new(part: u32, instance: u32) -> Self {
        Self { part, instance }
    }
}

/// Dense interning of part specs for one optimizer run.
///
/// Built once from the catalog; maps part ids to contiguous indices so the
/// matcher, chain builder, and placer can key everything by [`InstanceKey`]
/// instead of hashing strings.
#[derive(Debug, Clone)]
pub struct PartTable {
    parts: Vec<Part>,
    index: HashMap<String, u32>,
}

impl PartTable {
    pub fn new(parts: &[Part]) -> Self {
        let mut index = HashMap::with_capacity(parts.len());
        for (i, part) in parts.iter().enumerate() {
            index.insert(part.id.clone(), i as u32);
        }
        Self {
            parts: parts.to_vec(),
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn part(&self, idx: u32) -> &Part {
        &self.parts[idx as usize]
    }

    pub fn index_of(&self, id: &str) -> Option<u32> {
        self.index.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &Part)> {
        self.parts.iter().enumerate().map(|(i, p)| (i as u32, p))
    }

    /// Total number of part instances across all specs.
    pub fn total_instances(&self) -> u64 {
        self.parts.iter().map(|p| p.quantity as u64).sum()
    }

    /// Total required length in millimeters, ignoring shared-cut savings.
    pub fn total_length(&self) -> u64 {
        self.parts
            .iter()
            .map(|p| p.length as u64 * p.quantity as u64)
            .sum()
    }
}
