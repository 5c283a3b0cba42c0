pub mod instance;
pub mod packer;
pub mod result;

pub use instance::{InstancePool, MaterialInstance};
pub use packer::Placer;
pub use result::{
    Orientation, PlacedPart, PlacementReport, PlacementResult, SharedCutInfo, UnplacedPart,
    UsedMaterial,
};
