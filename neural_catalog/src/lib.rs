//! # neural_catalog
//!
//! A catalog of neural architectures for 3D perception, built with Burn.
//!
//! Every model is created from a per-sample input shape and an output size,
//! validates that shape up front, and maps a batch to `[batch, output_size]`
//! with a linear output (regression or logits).
//!
//! ## Features
//!
//! - **Dense baseline**: flatten, Dense 128, Dense 64, linear output
//! - **VoxNet**: 3D convolutions over occupancy grids, in small, big and
//!   homepage variants
//! - **PointNet**: input and feature alignment networks, shared pointwise
//!   convolutions and a symmetric max over points
//! - **Sequence wrapper**: any of the above applied to every frame, aggregated
//!   with an LSTM or by averaging over time
//! - **Summaries**: Keras-style per-layer tables with parameter counts
//!
//! ## Quick Start
//!
//! ```ignore
//! use burn::backend::NdArray;
//! use neural_catalog::prelude::*;
//!
//! let device = Default::default();
//!
//! // Classify 32^3 voxel grids into 10 classes
//! let model = create_voxnet_model_homepage::<NdArray>(&[32, 32, 32], 10, &device)?;
//! println!("{}", model.summary());
//!
//! // PointNet over 1024 points, time-distributed over 8 frames
//! let sequence = create_sequence_model::<NdArray>("pointnet", 8, &[1024, 3], 2, true, &device)?;
//! let output = sequence.forward(Tensor::<NdArray, 4>::zeros([4, 8, 1024, 3], &device));
//! assert_eq!(output.dims(), [4, 2]);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! shape (validation, layer arithmetic)
//!     │
//!     ▼
//! nn (pooling, pointwise blocks, alignment, LSTM) ──► models ──► summary
//!     ▲                                                  │
//!     └────────────── config (JSON save/load) ◄──────────┘
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Standard library support
//! - `ndarray` (default): CPU backend using ndarray
//! - `wgpu`: GPU acceleration via WebGPU

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod models;
pub mod nn;
pub mod shape;
pub mod summary;

// Re-export key types for convenience
pub use config::{
    Architecture, DenseConfig, PointNetConfig, SequenceConfig, TemporalAggregation, VoxNetConfig,
};
pub use error::{CatalogError, Result};
pub use models::{
    create_dense_model, create_model, create_point_net, create_sequence_model,
    create_voxnet_model_big, create_voxnet_model_homepage, create_voxnet_model_small,
    CatalogModel, DenseModel, PointNet, SequenceModel, VoxNet,
};
pub use summary::{LayerSummary, ModelSummary};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{
        load_config, save_config, Architecture, DenseConfig, PointNetConfig, SequenceConfig,
        TemporalAggregation, VoxNetConfig, VoxelStageConfig,
    };
    pub use crate::error::{CatalogError, Result};
    pub use crate::models::{
        create_dense_model, create_model, create_point_net, create_sequence_model,
        create_voxnet_model_big, create_voxnet_model_homepage, create_voxnet_model_small,
        CatalogModel, DenseModel, PointNet, SequenceModel, VoxNet,
    };
    pub use crate::nn::{
        Lstm, LstmConfig, MaxPool3d, MaxPool3dConfig, Mlp, MlpConfig, TransformNet,
        TransformNetConfig,
    };
    pub use crate::shape::{conv_output_len, pool_output_len, validate_input_shape, volume};
    pub use crate::summary::{LayerSummary, ModelSummary};

    pub use burn::tensor::Tensor;
}
