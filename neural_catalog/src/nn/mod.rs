//! Neural network building blocks for the catalog architectures.
//!
//! This module provides:
//! - MLP stacks for dense heads and the dense baseline
//! - 3D max pooling for volumetric inputs
//! - Pointwise convolution and dense blocks with batch normalization
//! - The PointNet alignment network
//! - An LSTM for temporal aggregation

pub mod mlp;
pub mod pointwise;
pub mod pool;
pub mod recurrent;
pub mod transform;

pub use mlp::{Mlp, MlpConfig};
pub use pointwise::{batch_norm, DenseBlock, PointwiseConv};
pub use pool::{MaxPool3d, MaxPool3dConfig};
pub use recurrent::{Lstm, LstmConfig, RecurrentActivation};
pub use transform::{TransformNet, TransformNetConfig};
