pub mod builder;
pub mod chain;

pub use builder::{ChainBuilder, ChainBuilderConfig, ChainReport};
pub use chain::{
    ChainConnection, ChainStructure, MAX_CHAIN_LENGTH, MAX_CHAIN_SIZE, SharedCutChain,
};
