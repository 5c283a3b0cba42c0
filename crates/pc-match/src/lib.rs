pub mod groups;
pub mod matcher;

pub use groups::{AngleGroups, PairCache, stratified_sample};
pub use matcher::{AngleMatch, AngleMatcher, SharedCutPotential, joint_savings};
