//! VoxNet 3D convolutional networks.
//!
//! See Maturana & Scherer, "VoxNet: A 3D Convolutional Neural Network for
//! Real-Time Object Recognition", IROS 2015.

use burn::module::{Ignored, Module};
use burn::nn::conv::{Conv3d, Conv3dConfig};
use burn::nn::Relu;
use burn::prelude::*;

use crate::config::{VoxNetConfig, VoxelStageConfig};
use crate::error::{CatalogError, Result};
use crate::nn::{MaxPool3d, MaxPool3dConfig, Mlp, MlpConfig};
use crate::shape::{conv3d_shape, pool3d_shape, volume};
use crate::summary::{conv3d_params, LayerSummary, ModelSummary};

/// Spatial bookkeeping for a VoxNet built from a config.
struct VoxelPlan {
    layers: Vec<LayerSummary>,
    flat_features: usize,
}

impl VoxNetConfig {
    fn grid_shape(&self) -> [usize; 3] {
        [self.input_shape[0], self.input_shape[1], self.input_shape[2]]
    }

    /// Walk the stages and record every intermediate shape.
    fn plan(&self) -> Result<VoxelPlan> {
        let mut layers = vec![LayerSummary::stateless("reshape", {
            let mut shape = self.input_shape.clone();
            shape.push(1);
            shape
        })];

        let mut spatial = self.grid_shape();
        let mut channels = 1;
        for (i, stage) in self.stages.iter().enumerate() {
            let conv_name = format!("conv3d_{}", i + 1);
            spatial = conv3d_shape(&conv_name, spatial, stage.kernel_size, stage.stride)?;
            layers.push(LayerSummary::trainable(
                format!("{conv_name} (relu)"),
                vec![spatial[0], spatial[1], spatial[2], stage.filters],
                conv3d_params(channels, stage.filters, stage.kernel_size),
            ));
            channels = stage.filters;

            if let Some(pool) = stage.pool {
                let pool_name = format!("max_pool3d_{}", i + 1);
                spatial = pool3d_shape(&pool_name, spatial, pool)?;
                layers.push(LayerSummary::stateless(
                    pool_name,
                    vec![spatial[0], spatial[1], spatial[2], channels],
                ));
            }
        }

        let flat_features = volume(&spatial).checked_mul(channels).ok_or_else(|| {
            CatalogError::InvalidInputShape {
                shape: self.input_shape.clone(),
                message: format!("{channels} channels over {spatial:?} overflows usize"),
            }
        })?;
        layers.push(LayerSummary::stateless("flatten", vec![flat_features]));
        layers.extend(self.head_config(flat_features).summary_layers(""));

        Ok(VoxelPlan {
            layers,
            flat_features,
        })
    }

    fn head_config(&self, flat_features: usize) -> MlpConfig {
        MlpConfig::new(flat_features, self.output_size).with_hidden_dims(vec![self.dense_units])
    }

    /// Build the network.
    ///
    /// Fails if the voxel grid is too small for the convolution and pooling
    /// stages.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<VoxNet<B>> {
        self.validate()?;
        let plan = self.plan()?;
        log::debug!(
            "{}: {} stages, {} features after flatten",
            self.name,
            self.stages.len(),
            plan.flat_features
        );

        let mut stages = Vec::with_capacity(self.stages.len());
        let mut channels = 1;
        for stage in &self.stages {
            stages.push(VoxelStage::new(channels, stage, device));
            channels = stage.filters;
        }

        let model = VoxNet {
            stages,
            head: self.head_config(plan.flat_features).init(device),
            config: Ignored(self.clone()),
        };
        log::info!(
            "built {} with {} parameters",
            model.name(),
            model.num_params()
        );
        Ok(model)
    }
}

/// Convolution, ReLU and optional max pooling.
#[derive(Module, Debug)]
pub struct VoxelStage<B: Backend> {
    conv: Conv3d<B>,
    activation: Relu,
    pool: Option<MaxPool3d>,
}

impl<B: Backend> VoxelStage<B> {
    fn new(in_channels: usize, config: &VoxelStageConfig, device: &B::Device) -> Self {
        let kernel = config.kernel_size;
        let stride = config.stride;
        Self {
            conv: Conv3dConfig::new([in_channels, config.filters], [kernel; 3])
                .with_stride([stride; 3])
                .init(device),
            activation: Relu::new(),
            pool: config.pool.map(|size| MaxPool3dConfig::cubic(size).init()),
        }
    }

    /// Forward pass on `[batch, channels, x, y, z]`.
    pub fn forward(&self, x: Tensor<B, 5>) -> Tensor<B, 5> {
        let x = self.activation.forward(self.conv.forward(x));
        match &self.pool {
            Some(pool) => pool.forward(x),
            None => x,
        }
    }
}

/// VoxNet: stacked 3D convolutions over a single-channel occupancy grid,
/// followed by a dense head.
#[derive(Module, Debug)]
pub struct VoxNet<B: Backend> {
    stages: Vec<VoxelStage<B>>,
    head: Mlp<B>,
    config: Ignored<VoxNetConfig>,
}

impl<B: Backend> VoxNet<B> {
    /// Model name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Per-sample voxel grid shape.
    pub fn input_shape(&self) -> &[usize] {
        &self.config.input_shape
    }

    /// Output dimension.
    pub fn output_size(&self) -> usize {
        self.config.output_size
    }

    /// Convolutional features before the dense head.
    ///
    /// Input: [batch, x, y, z] or any tensor with `x * y * z` elements per sample
    /// Output: [batch, channels, x', y', z']
    pub fn features<const D: usize>(&self, input: Tensor<B, D>) -> Tensor<B, 5> {
        let batch = input.dims()[0];
        let [x, y, z] = self.config.grid_shape();

        // Single occupancy channel
        let mut h: Tensor<B, 5> = input.reshape([batch, 1, x, y, z]);
        for stage in &self.stages {
            h = stage.forward(h);
        }
        h
    }

    /// Forward pass.
    ///
    /// Output: [batch, output_size]
    pub fn forward<const D: usize>(&self, input: Tensor<B, D>) -> Tensor<B, 2> {
        let features = self.features(input).flatten::<2>(1, 4);
        self.head.forward(features)
    }

    /// Layer-by-layer summary.
    pub fn summary(&self) -> ModelSummary {
        let mut summary = ModelSummary::new(self.name(), self.config.input_shape.clone());
        // The plan was already checked when the model was built
        if let Ok(plan) = self.config.plan() {
            summary.extend(plan.layers);
        }
        summary
    }
}
