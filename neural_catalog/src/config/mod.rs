//! Configuration types for neural_catalog.
//!
//! Burn-style configuration structs for every catalog architecture. Required
//! fields go through `new(...)`, defaulted ones through `with_*` builders, and
//! every config can be written to and read back from JSON.

mod architecture;
mod network;

use std::path::Path;

use burn::config::Config;

pub use architecture::Architecture;
pub use network::{
    DenseConfig, PointNetConfig, SequenceConfig, TemporalAggregation, VoxNetConfig,
    VoxelStageConfig,
};

use crate::error::{CatalogError, Result};

/// Write a configuration to a JSON file.
pub fn save_config<C: Config>(config: &C, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    config
        .save(path)
        .map_err(|e| CatalogError::ConfigIo(format!("{}: {e}", path.display())))?;
    log::debug!("saved config to {}", path.display());
    Ok(())
}

/// Read a configuration from a JSON file.
pub fn load_config<C: Config>(path: impl AsRef<Path>) -> Result<C> {
    let path = path.as_ref();
    C::load(path).map_err(|e| CatalogError::ConfigIo(format!("{}: {e}", path.display())))
}
