pub mod cache;
pub mod error;
pub mod estimate;
pub mod optimizer;
pub mod project;

pub use cache::ResultCache;
pub use error::PipelineError;
pub use estimate::{QuickEstimate, quick_estimate};
pub use optimizer::{Optimizer, OptimizerConfig};
pub use project::Project;
