use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid part: {0}")]
    InvalidPart(String),

    #[error("invalid material: {0}")]
    InvalidMaterial(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}
