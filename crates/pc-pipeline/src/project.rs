//! TOML project files: a part catalog, a material rack, and optimizer
//! settings in one document.

use serde::{Deserialize, Serialize};

use pc_core::material::Material;
use pc_core::part::Part;
use pc_core::validate::{ValidationIssue, has_errors, validate_catalog};

use crate::error::PipelineError;
use crate::optimizer::OptimizerConfig;

/// A complete job description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Optional display name.
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub optimizer: OptimizerConfig,

    pub parts: Vec<Part>,
    pub materials: Vec<Material>,
}

impl Project {
    pub fn from_toml(input: &str) -> Result<Self, PipelineError> {
        Ok(toml::from_str(input)?)
    }

    pub fn validate(&self) -> Vec<ValidationIssue> {
        validate_catalog(&self.parts, &self.materials)
    }

    /// Validate and fail on any error-severity issue, so callers can gate
    /// the pipeline on a clean catalog.
    pub fn ensure_valid(&self) -> Result<Vec<ValidationIssue>, PipelineError> {
        let issues = self.validate();
        if has_errors(&issues) {
            let messages: Vec<String> = issues
                .iter()
                .filter(|i| i.severity == pc_core::validate::Severity::Error)
                .map(|i| format!("{}: {}", i.subject, i.message))
                .collect();
            return Err(PipelineError::Validation(messages.join("; ")));
        }
        Ok(issues)
    }
}
