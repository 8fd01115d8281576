//! PointNet classification/regression network.
//!
//! See Qi et al., "PointNet: Deep Learning on Point Sets for 3D Classification
//! and Segmentation", CVPR 2017.

use burn::module::{Ignored, Module};
use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig};
use burn::prelude::*;

use crate::config::{Architecture, PointNetConfig};
use crate::error::Result;
use crate::nn::{DenseBlock, PointwiseConv, TransformNet, TransformNetConfig};
use crate::summary::{conv1d_params, linear_params, LayerSummary, ModelSummary};

impl PointNetConfig {
    fn input_transform_config(&self) -> TransformNetConfig {
        TransformNetConfig::new(self.coord_dim(), self.coord_dim())
    }

    fn feature_dim(&self) -> usize {
        self.feature_channels.last().copied().unwrap_or(self.coord_dim())
    }

    fn feature_transform_config(&self) -> TransformNetConfig {
        TransformNetConfig::new(self.feature_dim(), self.feature_dim())
    }

    fn global_dim(&self) -> usize {
        self.global_channels.last().copied().unwrap_or(self.feature_dim())
    }

    /// Build the network.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<PointNet<B>> {
        self.validate()?;

        let input_transform = self.input_transform_config().init(device)?;
        let feature_transform = self.feature_transform_config().init(device)?;

        let mut channels = self.coord_dim();
        let feature_convs = self
            .feature_channels
            .iter()
            .map(|&out| {
                let conv = PointwiseConv::new(channels, out, device);
                channels = out;
                conv
            })
            .collect();
        let global_convs = self
            .global_channels
            .iter()
            .map(|&out| {
                let conv = PointwiseConv::new(channels, out, device);
                channels = out;
                conv
            })
            .collect();

        let head = self
            .head_units
            .iter()
            .map(|&out| {
                let block = DenseBlock::new(channels, out, device);
                channels = out;
                block
            })
            .collect();

        log::debug!(
            "PointNet: {} points x {} coords, feature transform {}x{}, global features {}",
            self.num_points(),
            self.coord_dim(),
            self.feature_dim(),
            self.feature_dim(),
            self.global_dim()
        );

        let model = PointNet {
            input_transform,
            feature_convs,
            feature_transform,
            global_convs,
            head,
            dropout: DropoutConfig::new(self.dropout).init(),
            output: LinearConfig::new(channels, self.output_size).init(device),
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

/// PointNet with learned input and feature alignment.
///
/// Per-point features are aggregated with a max over points, so the output
/// does not depend on the order of the points.
#[derive(Module, Debug)]
pub struct PointNet<B: Backend> {
    input_transform: TransformNet<B>,
    feature_convs: Vec<PointwiseConv<B>>,
    feature_transform: TransformNet<B>,
    global_convs: Vec<PointwiseConv<B>>,
    head: Vec<DenseBlock<B>>,
    dropout: Dropout,
    output: Linear<B>,
    config: Ignored<PointNetConfig>,
}

impl<B: Backend> PointNet<B> {
    /// Model name.
    pub fn name(&self) -> &str {
        Architecture::PointNet.model_name()
    }

    /// Per-sample input shape `[num_points, coord_dim]`.
    pub fn input_shape(&self) -> &[usize] {
        &self.config.input_shape
    }

    /// Output dimension.
    pub fn output_size(&self) -> usize {
        self.config.output_size
    }

    /// Global feature vector after symmetric max pooling.
    ///
    /// Input: [batch, num_points, coord_dim] or any tensor with
    /// `num_points * coord_dim` elements per sample
    /// Output: [batch, global_dim]
    pub fn global_features<const D: usize>(&self, input: Tensor<B, D>) -> Tensor<B, 2> {
        let batch = input.dims()[0];
        let points: Tensor<B, 3> =
            input.reshape([batch, self.config.num_points(), self.config.coord_dim()]);

        // Input alignment, channels-last
        let aligned = self.input_transform.align(points);

        let mut x = aligned.swap_dims(1, 2);
        for conv in &self.feature_convs {
            x = conv.forward(x);
        }

        // Feature alignment
        let mut x = self.feature_transform.align(x.swap_dims(1, 2)).swap_dims(1, 2);
        for conv in &self.global_convs {
            x = conv.forward(x);
        }

        let [_, channels, _] = x.dims();
        x.max_dim(2).reshape([batch, channels])
    }

    /// Forward pass.
    ///
    /// Output: [batch, output_size], linear activation
    pub fn forward<const D: usize>(&self, input: Tensor<B, D>) -> Tensor<B, 2> {
        let mut x = self.global_features(input);
        for block in &self.head {
            x = block.forward(x);
            x = self.dropout.forward(x);
        }
        self.output.forward(x)
    }

    /// Layer-by-layer summary.
    pub fn summary(&self) -> ModelSummary {
        let config = &*self.config;
        let num_points = config.num_points();
        let mut summary = ModelSummary::new(self.name(), config.input_shape.clone());

        summary.extend(
            config
                .input_transform_config()
                .summary_layers("input_transform/", num_points),
        );
        summary.push(LayerSummary::stateless(
            "input_alignment",
            vec![num_points, config.coord_dim()],
        ));

        let mut channels = config.coord_dim();
        for (i, &out) in config.feature_channels.iter().enumerate() {
            summary.push(LayerSummary::trainable(
                format!("feature_conv1d_{} (relu)", i + 1),
                vec![num_points, out],
                conv1d_params(channels, out, 1),
            ));
            summary.push(LayerSummary::batch_norm(
                format!("feature_norm_{}", i + 1),
                vec![num_points, out],
                out,
            ));
            channels = out;
        }

        summary.extend(
            config
                .feature_transform_config()
                .summary_layers("feature_transform/", num_points),
        );
        summary.push(LayerSummary::stateless(
            "feature_alignment",
            vec![num_points, channels],
        ));

        for (i, &out) in config.global_channels.iter().enumerate() {
            summary.push(LayerSummary::trainable(
                format!("global_conv1d_{} (relu)", i + 1),
                vec![num_points, out],
                conv1d_params(channels, out, 1),
            ));
            summary.push(LayerSummary::batch_norm(
                format!("global_norm_{}", i + 1),
                vec![num_points, out],
                out,
            ));
            channels = out;
        }
        summary.push(LayerSummary::stateless("global_max_pool", vec![1, channels]));

        for (i, &out) in config.head_units.iter().enumerate() {
            summary.push(LayerSummary::trainable(
                format!("head_dense_{} (relu)", i + 1),
                vec![1, out],
                linear_params(channels, out),
            ));
            summary.push(LayerSummary::batch_norm(
                format!("head_norm_{}", i + 1),
                vec![1, out],
                out,
            ));
            summary.push(LayerSummary::stateless(
                format!("head_dropout_{}", i + 1),
                vec![1, out],
            ));
            channels = out;
        }
        summary.push(LayerSummary::trainable(
            "output",
            vec![1, config.output_size],
            linear_params(channels, config.output_size),
        ));
        summary.push(LayerSummary::stateless("flatten", vec![config.output_size]));
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Distribution;

    type TestBackend = NdArray;

    fn small_config(num_points: usize, output_size: usize) -> PointNetConfig {
        PointNetConfig::new(vec![num_points, 3], output_size)
            .with_feature_channels(vec![16, 16])
            .with_global_channels(vec![16, 32])
            .with_head_units(vec![16, 8])
    }

    #[test]
    fn test_pointnet_forward_shape() {
        let device = Default::default();
        let model = small_config(50, 4).init::<TestBackend>(&device).unwrap();

        let input = Tensor::<TestBackend, 3>::random(
            [2, 50, 3],
            Distribution::Uniform(-1.0, 1.0),
            &device,
        );
        let global = model.global_features(input.clone());
        let output = model.forward(input);

        assert_eq!(global.dims(), [2, 32]);
        assert_eq!(output.dims(), [2, 4]);
    }

    #[test]
    fn test_pointnet_permutation_invariance() {
        let device = Default::default();
        let model = small_config(4, 3).init::<TestBackend>(&device).unwrap();

        let points: Vec<f32> = vec![
            0.1, 0.2, 0.3, //
            -0.5, 0.0, 0.9, //
            0.7, -0.4, 0.2, //
            0.0, 0.0, -1.0,
        ];
        // Same points, reversed order
        let permuted: Vec<f32> = points
            .chunks(3)
            .rev()
            .flat_map(|p| p.iter().copied())
            .collect();

        let output1 = model.forward(Tensor::<TestBackend, 3>::from_data(
            TensorData::new(points, [1, 4, 3]),
            &device,
        ));
        let output2 = model.forward(Tensor::<TestBackend, 3>::from_data(
            TensorData::new(permuted, [1, 4, 3]),
            &device,
        ));

        let max_diff: f32 = (output1 - output2).abs().max().into_scalar();
        assert!(max_diff < 1e-4, "Max diff: {}", max_diff);
    }

    #[test]
    fn test_pointnet_default_widths() {
        let device = Default::default();
        let model = PointNetConfig::new(vec![32, 3], 2)
            .init::<TestBackend>(&device)
            .unwrap();

        let global = model.global_features(Tensor::<TestBackend, 3>::zeros([1, 32, 3], &device));

        assert_eq!(global.dims(), [1, 1024]);
        assert_eq!(model.name(), "PointNet");
    }

    #[test]
    fn test_pointnet_summary() {
        let device = Default::default();
        let model = small_config(10, 2).init::<TestBackend>(&device).unwrap();
        let summary = model.summary();

        assert_eq!(summary.output_shape(), &[2]);
        assert_eq!(summary.input_shape, vec![10, 3]);
        assert!(summary.non_trainable_params() > 0);
        assert!(summary
            .layers
            .iter()
            .any(|l| l.name == "feature_transform/projection"
                && l.trainable_params == 256 * 16 * 16 + 16 * 16));
    }

    #[test]
    fn test_pointnet_rejects_flat_input_shape() {
        let device = Default::default();
        assert!(PointNetConfig::new(vec![1024 * 3], 2)
            .init::<TestBackend>(&device)
            .is_err());
    }
}
