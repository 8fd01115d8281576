//! Catalog entry points.
//!
//! One constructor per architecture, plus [`create_model`] which builds any
//! non-sequence architecture by identifier and wraps it in a [`CatalogModel`].

use burn::module::{Ignored, Module};
use burn::prelude::*;

use super::{DenseModel, PointNet, SequenceModel, VoxNet};
use crate::config::{
    Architecture, DenseConfig, PointNetConfig, SequenceConfig, TemporalAggregation, VoxNetConfig,
};
use crate::error::Result;
use crate::summary::ModelSummary;

/// Dense baseline: Flatten, Dense 128 ReLU, Dense 64 ReLU, Dense `output_size`.
pub fn create_dense_model<B: Backend>(
    input_shape: &[usize],
    output_size: usize,
    device: &B::Device,
) -> Result<DenseModel<B>> {
    DenseConfig::new(input_shape.to_vec(), output_size).init(device)
}

/// Small VoxNet, `C7-F32-P2-C5-F64-P2-D512`.
pub fn create_voxnet_model_small<B: Backend>(
    input_shape: &[usize],
    output_size: usize,
    device: &B::Device,
) -> Result<VoxNet<B>> {
    VoxNetConfig::small(input_shape.to_vec(), output_size).init(device)
}

/// Big VoxNet, `C7-F64-P4-D512`.
pub fn create_voxnet_model_big<B: Backend>(
    input_shape: &[usize],
    output_size: usize,
    device: &B::Device,
) -> Result<VoxNet<B>> {
    VoxNetConfig::big(input_shape.to_vec(), output_size).init(device)
}

/// VoxNet as published on the authors' project page.
pub fn create_voxnet_model_homepage<B: Backend>(
    input_shape: &[usize],
    output_size: usize,
    device: &B::Device,
) -> Result<VoxNet<B>> {
    VoxNetConfig::homepage(input_shape.to_vec(), output_size).init(device)
}

/// PointNet over `[num_points, coord_dim]` point sets.
pub fn create_point_net<B: Backend>(
    input_shape: &[usize],
    output_size: usize,
    device: &B::Device,
) -> Result<PointNet<B>> {
    PointNetConfig::new(input_shape.to_vec(), output_size).init(device)
}

/// Time-distributed `base_model` followed by temporal aggregation.
///
/// `base_model` is an architecture identifier (`"voxnet"`, `"pointnet"`, ...),
/// `input_shape` the per-frame shape. Aggregates with an 8-unit ReLU LSTM when
/// `use_lstm` is set, otherwise with the mean over the sequence.
pub fn create_sequence_model<B: Backend>(
    base_model: &str,
    sequence_length: usize,
    input_shape: &[usize],
    output_size: usize,
    use_lstm: bool,
    device: &B::Device,
) -> Result<SequenceModel<B>> {
    let base: Architecture = base_model.parse()?;
    let aggregation = if use_lstm {
        TemporalAggregation::Lstm
    } else {
        TemporalAggregation::AveragePooling
    };
    SequenceConfig::new(
        base,
        sequence_length,
        input_shape.to_vec(),
        output_size,
        aggregation,
    )
    .init(device)
}

/// Build any non-sequence architecture.
pub fn create_model<B: Backend>(
    architecture: Architecture,
    input_shape: &[usize],
    output_size: usize,
    device: &B::Device,
) -> Result<CatalogModel<B>> {
    let mut model = CatalogModel {
        architecture: Ignored(architecture.clone()),
        dense: None,
        voxnet: None,
        pointnet: None,
    };
    match architecture {
        Architecture::Dense => {
            model.dense = Some(create_dense_model(input_shape, output_size, device)?);
        }
        Architecture::VoxNetSmall => {
            model.voxnet = Some(create_voxnet_model_small(input_shape, output_size, device)?);
        }
        Architecture::VoxNetBig => {
            model.voxnet = Some(create_voxnet_model_big(input_shape, output_size, device)?);
        }
        Architecture::VoxNetHomepage => {
            model.voxnet = Some(create_voxnet_model_homepage(
                input_shape,
                output_size,
                device,
            )?);
        }
        Architecture::PointNet => {
            model.pointnet = Some(create_point_net(input_shape, output_size, device)?);
        }
    }
    Ok(model)
}

/// Any non-sequence catalog model.
///
/// Exactly one of the network slots is populated; [`create_model`] is the
/// only way to build one.
#[derive(Module, Debug)]
pub struct CatalogModel<B: Backend> {
    architecture: Ignored<Architecture>,
    dense: Option<DenseModel<B>>,
    voxnet: Option<VoxNet<B>>,
    pointnet: Option<PointNet<B>>,
}

enum Net<'a, B: Backend> {
    Dense(&'a DenseModel<B>),
    VoxNet(&'a VoxNet<B>),
    PointNet(&'a PointNet<B>),
}

impl<B: Backend> CatalogModel<B> {
    /// The populated slot, chosen by the architecture tag.
    fn net(&self) -> Net<'_, B> {
        let net = match *self.architecture {
            Architecture::Dense => self.dense.as_ref().map(Net::Dense),
            Architecture::VoxNetSmall | Architecture::VoxNetBig | Architecture::VoxNetHomepage => {
                self.voxnet.as_ref().map(Net::VoxNet)
            }
            Architecture::PointNet => self.pointnet.as_ref().map(Net::PointNet),
        };
        match net {
            Some(net) => net,
            // create_model fills the slot matching the tag; records never add or drop slots
            None => unreachable!("{:?} model without its network", *self.architecture),
        }
    }

    /// Which architecture this is.
    pub fn architecture(&self) -> &Architecture {
        &self.architecture
    }

    /// Model name.
    pub fn name(&self) -> &str {
        match self.net() {
            Net::Dense(model) => model.name(),
            Net::VoxNet(model) => model.name(),
            Net::PointNet(model) => model.name(),
        }
    }

    /// Per-sample input shape.
    pub fn input_shape(&self) -> &[usize] {
        match self.net() {
            Net::Dense(model) => model.input_shape(),
            Net::VoxNet(model) => model.input_shape(),
            Net::PointNet(model) => model.input_shape(),
        }
    }

    /// Output dimension.
    pub fn output_size(&self) -> usize {
        match self.net() {
            Net::Dense(model) => model.output_size(),
            Net::VoxNet(model) => model.output_size(),
            Net::PointNet(model) => model.output_size(),
        }
    }

    /// Forward pass.
    ///
    /// Input: [batch, ...] with `volume(input_shape)` elements per sample
    /// Output: [batch, output_size]
    pub fn forward<const D: usize>(&self, input: Tensor<B, D>) -> Tensor<B, 2> {
        match self.net() {
            Net::Dense(model) => model.forward(input),
            Net::VoxNet(model) => model.forward(input),
            Net::PointNet(model) => model.forward(input),
        }
    }

    /// Layer-by-layer summary.
    pub fn summary(&self) -> ModelSummary {
        match self.net() {
            Net::Dense(model) => model.summary(),
            Net::VoxNet(model) => model.summary(),
            Net::PointNet(model) => model.summary(),
        }
    }
}
