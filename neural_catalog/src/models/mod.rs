//! Catalog architectures.
//!
//! - [`DenseModel`]: flatten plus dense layers, a baseline
//! - [`VoxNet`]: 3D convolutions over voxel grids, in three variants
//! - [`PointNet`]: aligned point features with symmetric max pooling
//! - [`SequenceModel`]: any of the above applied per frame, aggregated over time
//!
//! The `create_*` functions are the entry points; each validates the input
//! shape and returns a freshly initialized model.

mod catalog;
mod dense;
mod pointnet;
mod sequence;
mod voxnet;

pub use catalog::{
    create_dense_model, create_model, create_point_net, create_sequence_model,
    create_voxnet_model_big, create_voxnet_model_homepage, create_voxnet_model_small,
    CatalogModel,
};
pub use dense::DenseModel;
pub use pointnet::PointNet;
pub use sequence::SequenceModel;
pub use voxnet::{VoxNet, VoxelStage};
