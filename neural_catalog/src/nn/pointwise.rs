//! Shared per-point and per-feature blocks used by PointNet.
//!
//! Both blocks follow the layer order `layer -> ReLU -> BatchNorm`.

use burn::module::Module;
use burn::nn::conv::{Conv1d, Conv1dConfig};
use burn::nn::{BatchNorm, BatchNormConfig, Linear, LinearConfig, Relu};
use burn::prelude::*;

/// Weight of the newest batch in the running statistics.
///
/// Burn weights the new batch by `momentum`, so this is `1 - 0.99`.
pub const BATCH_NORM_MOMENTUM: f64 = 0.01;

/// Variance epsilon for batch normalization.
pub const BATCH_NORM_EPSILON: f64 = 1e-3;

/// Batch normalization over the channel axis of `[batch, channels, length]`.
pub fn batch_norm<B: Backend>(features: usize, device: &B::Device) -> BatchNorm<B, 1> {
    BatchNormConfig::new(features)
        .with_momentum(BATCH_NORM_MOMENTUM)
        .with_epsilon(BATCH_NORM_EPSILON)
        .init(device)
}

/// Kernel-size-1 convolution applied independently to every point.
#[derive(Module, Debug)]
pub struct PointwiseConv<B: Backend> {
    conv: Conv1d<B>,
    activation: Relu,
    norm: BatchNorm<B, 1>,
}

impl<B: Backend> PointwiseConv<B> {
    /// Create a block mapping `in_channels` to `out_channels` per point.
    pub fn new(in_channels: usize, out_channels: usize, device: &B::Device) -> Self {
        Self {
            conv: Conv1dConfig::new(in_channels, out_channels, 1).init(device),
            activation: Relu::new(),
            norm: batch_norm(out_channels, device),
        }
    }

    /// Forward pass.
    ///
    /// Input: [batch, in_channels, num_points]
    /// Output: [batch, out_channels, num_points]
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let x = self.conv.forward(x);
        let x = self.activation.forward(x);
        self.norm.forward(x)
    }
}

/// Dense layer followed by ReLU and batch normalization.
#[derive(Module, Debug)]
pub struct DenseBlock<B: Backend> {
    linear: Linear<B>,
    activation: Relu,
    norm: BatchNorm<B, 1>,
}

impl<B: Backend> DenseBlock<B> {
    /// Create a block mapping `input_dim` features to `output_dim`.
    pub fn new(input_dim: usize, output_dim: usize, device: &B::Device) -> Self {
        Self {
            linear: LinearConfig::new(input_dim, output_dim).init(device),
            activation: Relu::new(),
            norm: batch_norm(output_dim, device),
        }
    }

    /// Forward pass.
    ///
    /// Input: [batch, input_dim]
    /// Output: [batch, output_dim]
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.activation.forward(self.linear.forward(x));
        let [batch, features] = x.dims();

        // BatchNorm expects a trailing length axis
        self.norm
            .forward(x.reshape([batch, features, 1]))
            .reshape([batch, features])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Distribution;

    type TestBackend = NdArray;

    #[test]
    fn test_pointwise_conv_shape() {
        let device = Default::default();
        let block = PointwiseConv::<TestBackend>::new(3, 64, &device);

        let output = block.forward(Tensor::zeros([2, 3, 100], &device));

        assert_eq!(output.dims(), [2, 64, 100]);
    }

    #[test]
    fn test_pointwise_conv_is_per_point() {
        let device = Default::default();
        let block = PointwiseConv::<TestBackend>::new(3, 8, &device);

        let input = Tensor::<TestBackend, 3>::random(
            [1, 3, 4],
            Distribution::Normal(0.0, 1.0),
            &device,
        );
        let full = block.forward(input.clone());
        let first = block.forward(input.narrow(2, 0, 1));

        let diff: f32 = (full.narrow(2, 0, 1) - first).abs().max().into_scalar();
        assert!(diff < 1e-5, "Max diff: {}", diff);
    }

    #[test]
    fn test_batch_norm_constants() {
        let device = Default::default();
        let norm = batch_norm::<TestBackend>(8, &device);

        assert_eq!(norm.momentum, 0.01);
        assert_eq!(norm.epsilon, 1e-3);
        assert_eq!(norm.gamma.val().dims(), [8]);
    }

    #[test]
    fn test_dense_block_shape() {
        let device = Default::default();
        let block = DenseBlock::<TestBackend>::new(1024, 512, &device);

        let output = block.forward(Tensor::ones([3, 1024], &device));

        assert_eq!(output.dims(), [3, 512]);
    }
}
