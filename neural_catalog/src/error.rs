//! Error types for neural_catalog.

use thiserror::Error;

/// Errors that can occur while assembling a catalog model.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Input shape is empty or contains a zero-sized dimension.
    #[error("invalid input shape {shape:?}: {message}")]
    InvalidInputShape {
        /// The offending shape.
        shape: Vec<usize>,
        /// Description of the problem.
        message: String,
    },

    /// Input shape has the wrong number of dimensions for the architecture.
    #[error("{architecture} expects a rank-{expected} input shape, got {shape:?}")]
    RankMismatch {
        /// Architecture name.
        architecture: String,
        /// Expected rank.
        expected: usize,
        /// Actual shape.
        shape: Vec<usize>,
    },

    /// A convolution or pooling stage reduced a spatial axis to nothing.
    #[error("layer {layer} cannot be applied to spatial shape {spatial:?}")]
    ShapeTooSmall {
        /// Name of the layer that failed.
        layer: String,
        /// Spatial shape entering the layer.
        spatial: Vec<usize>,
    },

    /// Architecture name not present in the catalog.
    #[error("unknown architecture '{0}'")]
    UnknownArchitecture(String),

    /// Invalid configuration.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// Configuration could not be read or written.
    #[error("config I/O error: {0}")]
    ConfigIo(String),
}

impl CatalogError {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Result type for neural_catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
