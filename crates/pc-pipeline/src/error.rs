use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("catalog validation failed: {0}")]
    Validation(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] pc_core::Error),
}
