//! PointNet alignment network (T-Net).

use burn::config::Config;
use burn::module::{Module, Param};
use burn::nn::{Initializer, Linear, LinearConfig};
use burn::prelude::*;

use super::pointwise::{DenseBlock, PointwiseConv};
use crate::error::{CatalogError, Result as CatalogResult};
use crate::summary::{conv1d_params, linear_params, LayerSummary};

/// Configuration for a [`TransformNet`].
#[derive(Config, Debug)]
pub struct TransformNetConfig {
    /// Channels of the per-point features entering the network.
    pub in_channels: usize,
    /// Size of the predicted `k x k` transform.
    pub k: usize,
    /// Per-point convolution widths before global pooling.
    #[config(default = "vec![64, 128, 1024]")]
    pub conv_channels: Vec<usize>,
    /// Dense widths after global pooling.
    #[config(default = "vec![512, 256]")]
    pub dense_units: Vec<usize>,
}

impl TransformNetConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> CatalogResult<()> {
        if self.in_channels == 0 || self.k == 0 {
            return Err(CatalogError::invalid_config(
                "transform net channels and k must be positive",
            ));
        }
        if self.conv_channels.is_empty() {
            return Err(CatalogError::invalid_config(
                "transform net needs at least one pointwise convolution",
            ));
        }
        if self.conv_channels.contains(&0) || self.dense_units.contains(&0) {
            return Err(CatalogError::invalid_config(
                "transform net layer widths must be positive",
            ));
        }
        Ok(())
    }

    /// Initialize the network with an identity starting transform.
    pub fn init<B: Backend>(&self, device: &B::Device) -> CatalogResult<TransformNet<B>> {
        self.validate()?;

        let mut convs = Vec::with_capacity(self.conv_channels.len());
        let mut channels = self.in_channels;
        for &out in &self.conv_channels {
            convs.push(PointwiseConv::new(channels, out, device));
            channels = out;
        }

        let mut dense = Vec::with_capacity(self.dense_units.len());
        let mut features = channels;
        for &out in &self.dense_units {
            dense.push(DenseBlock::new(features, out, device));
            features = out;
        }

        let mut projection = LinearConfig::new(features, self.k * self.k)
            .with_initializer(Initializer::Zeros)
            .init(device);
        projection.bias = Some(Param::from_tensor(identity_flat(self.k, device)));

        Ok(TransformNet {
            convs,
            dense,
            projection,
            k: self.k,
        })
    }

    /// Per-layer summary rows for `num_points` points.
    pub fn summary_layers(&self, prefix: &str, num_points: usize) -> Vec<LayerSummary> {
        let mut rows = Vec::new();
        let mut channels = self.in_channels;
        for (i, &out) in self.conv_channels.iter().enumerate() {
            rows.push(LayerSummary::trainable(
                format!("{prefix}conv1d_{} (relu)", i + 1),
                vec![num_points, out],
                conv1d_params(channels, out, 1),
            ));
            rows.push(LayerSummary::batch_norm(
                format!("{prefix}batch_norm_{}", i + 1),
                vec![num_points, out],
                out,
            ));
            channels = out;
        }
        rows.push(LayerSummary::stateless(
            format!("{prefix}max_pool1d"),
            vec![1, channels],
        ));

        let mut features = channels;
        for (i, &out) in self.dense_units.iter().enumerate() {
            rows.push(LayerSummary::trainable(
                format!("{prefix}dense_{} (relu)", i + 1),
                vec![1, out],
                linear_params(features, out),
            ));
            rows.push(LayerSummary::batch_norm(
                format!("{prefix}dense_norm_{}", i + 1),
                vec![1, out],
                out,
            ));
            features = out;
        }
        rows.push(LayerSummary::trainable(
            format!("{prefix}projection"),
            vec![1, self.k * self.k],
            linear_params(features, self.k * self.k),
        ));
        rows.push(LayerSummary::stateless(
            format!("{prefix}reshape"),
            vec![self.k, self.k],
        ));
        rows
    }
}

/// Flattened `k x k` identity matrix.
fn identity_flat<B: Backend>(k: usize, device: &B::Device) -> Tensor<B, 1> {
    let mut values = vec![0.0f32; k * k];
    for i in 0..k {
        values[i * k + i] = 1.0;
    }
    Tensor::from_data(TensorData::new(values, [k * k]), device)
}

/// Predicts a `k x k` alignment matrix from a set of per-point features.
///
/// The projection weights start at zero and its bias at the identity, so an
/// untrained network leaves its input unchanged.
#[derive(Module, Debug)]
pub struct TransformNet<B: Backend> {
    convs: Vec<PointwiseConv<B>>,
    dense: Vec<DenseBlock<B>>,
    projection: Linear<B>,
    k: usize,
}

impl<B: Backend> TransformNet<B> {
    /// Size of the predicted transform.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Predict the transform.
    ///
    /// Input: [batch, in_channels, num_points]
    /// Output: [batch, k, k]
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let mut x = x;
        for conv in &self.convs {
            x = conv.forward(x);
        }

        // Symmetric aggregation over points
        let [batch, channels, _] = x.dims();
        let mut global: Tensor<B, 2> = x.max_dim(2).reshape([batch, channels]);

        for block in &self.dense {
            global = block.forward(global);
        }

        self.projection
            .forward(global)
            .reshape([batch, self.k, self.k])
    }

    /// Predict the transform and apply it to channels-last features.
    ///
    /// Input: [batch, num_points, k]
    /// Output: [batch, num_points, k]
    pub fn align(&self, points: Tensor<B, 3>) -> Tensor<B, 3> {
        let transform = self.forward(points.clone().swap_dims(1, 2));
        points.matmul(transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Distribution;

    type TestBackend = NdArray;

    fn small_config(in_channels: usize, k: usize) -> TransformNetConfig {
        TransformNetConfig::new(in_channels, k)
            .with_conv_channels(vec![8, 16])
            .with_dense_units(vec![8])
    }

    #[test]
    fn test_initial_transform_is_identity() {
        let device = Default::default();
        let net = small_config(3, 3).init::<TestBackend>(&device).unwrap();

        let input = Tensor::random([2, 3, 20], Distribution::Normal(0.0, 1.0), &device);
        let transform = net.forward(input);

        let expected = Tensor::<TestBackend, 2>::from_data(
            [[1.0f32, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            &device,
        )
        .unsqueeze_dim::<3>(0)
        .repeat_dim(0, 2);

        let diff: f32 = (transform - expected).abs().max().into_scalar();
        assert!(diff < 1e-6, "Max diff: {}", diff);
    }

    #[test]
    fn test_align_preserves_points_at_init() {
        let device = Default::default();
        let net = small_config(3, 3).init::<TestBackend>(&device).unwrap();

        let points = Tensor::<TestBackend, 3>::random(
            [1, 10, 3],
            Distribution::Uniform(-1.0, 1.0),
            &device,
        );
        let aligned = net.align(points.clone());

        let diff: f32 = (aligned - points).abs().max().into_scalar();
        assert!(diff < 1e-6, "Max diff: {}", diff);
    }

    #[test]
    fn test_feature_transform_shape() {
        let device = Default::default();
        let net = small_config(64, 64).init::<TestBackend>(&device).unwrap();

        let transform = net.forward(Tensor::zeros([2, 64, 5], &device));

        assert_eq!(transform.dims(), [2, 64, 64]);
        assert_eq!(net.k(), 64);
    }

    #[test]
    fn test_invalid_config() {
        let device = Default::default();

        let result = TransformNetConfig::new(3, 0).init::<TestBackend>(&device);
        assert!(matches!(result, Err(CatalogError::InvalidConfig { .. })));

        let result = TransformNetConfig::new(3, 3)
            .with_conv_channels(vec![])
            .init::<TestBackend>(&device);
        assert!(matches!(result, Err(CatalogError::InvalidConfig { .. })));
    }

    #[test]
    fn test_summary_rows() {
        let rows = TransformNetConfig::new(3, 3).summary_layers("t/", 1024);

        // 3 x (conv + norm), pool, 2 x (dense + norm), projection, reshape
        assert_eq!(rows.len(), 13);
        assert_eq!(rows[0].output_shape, vec![1024, 64]);
        assert_eq!(rows.last().unwrap().output_shape, vec![3, 3]);
        assert_eq!(rows[11].trainable_params, 256 * 9 + 9);
    }
}
