pub mod constraints;
pub mod error;
pub mod material;
pub mod part;
pub mod progress;
pub mod validate;

pub use constraints::PlacementConstraints;
pub use error::Error;
pub use material::{Material, STANDARD_STOCK_LENGTHS, standard_stock_for};
pub use part::{AnglePosition, CornerAngles, InstanceKey, Part, PartTable};
pub use progress::{NullReporter, ProgressReporter, ProgressUpdate};
pub use validate::{Severity, ValidationIssue, has_errors, validate_catalog};
