//! Dense baseline.

use burn::module::{Ignored, Module};
use burn::prelude::*;

use crate::config::DenseConfig;
use crate::error::Result;
use crate::nn::{Mlp, MlpConfig};
use crate::shape::volume;
use crate::summary::{LayerSummary, ModelSummary};

impl DenseConfig {
    fn mlp_config(&self) -> MlpConfig {
        MlpConfig::new(volume(&self.input_shape), self.output_size)
            .with_hidden_dims(self.hidden_dims.clone())
    }

    /// Build the dense baseline.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<DenseModel<B>> {
        self.validate()?;

        let model = DenseModel {
            mlp: self.mlp_config().init(device),
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

/// Flatten followed by ReLU dense layers and a linear output.
///
/// Only suitable as a baseline: it ignores all spatial structure.
#[derive(Module, Debug)]
pub struct DenseModel<B: Backend> {
    mlp: Mlp<B>,
    config: Ignored<DenseConfig>,
}

impl<B: Backend> DenseModel<B> {
    /// Model name.
    pub fn name(&self) -> &str {
        crate::config::Architecture::Dense.model_name()
    }

    /// Per-sample input shape.
    pub fn input_shape(&self) -> &[usize] {
        &self.config.input_shape
    }

    /// Output dimension.
    pub fn output_size(&self) -> usize {
        self.config.output_size
    }

    /// Forward pass.
    ///
    /// Input: [batch, ...] with `volume(input_shape)` elements per sample
    /// Output: [batch, output_size]
    pub fn forward<const D: usize>(&self, input: Tensor<B, D>) -> Tensor<B, 2> {
        let batch = input.dims()[0];
        let flat = input.reshape([batch, volume(&self.config.input_shape)]);
        self.mlp.forward(flat)
    }

    /// Layer-by-layer summary.
    pub fn summary(&self) -> ModelSummary {
        let mut summary = ModelSummary::new(self.name(), self.config.input_shape.clone());
        summary.push(LayerSummary::stateless(
            "flatten",
            vec![volume(&self.config.input_shape)],
        ));
        summary.extend(self.config.mlp_config().summary_layers(""));
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_dense_forward_any_rank() {
        let device = Default::default();
        let model = DenseConfig::new(vec![4, 5, 6], 3)
            .init::<TestBackend>(&device)
            .unwrap();

        let output = model.forward(Tensor::<TestBackend, 4>::zeros([2, 4, 5, 6], &device));
        assert_eq!(output.dims(), [2, 3]);

        let output = model.forward(Tensor::<TestBackend, 2>::zeros([2, 120], &device));
        assert_eq!(output.dims(), [2, 3]);
    }

    #[test]
    fn test_dense_summary_matches_params() {
        let device = Default::default();
        let model = DenseConfig::new(vec![32, 32, 32], 2)
            .init::<TestBackend>(&device)
            .unwrap();

        let summary = model.summary();

        // 32768*128+128 + 128*64+64 + 64*2+2
        assert_eq!(summary.trainable_params(), 4_202_818);
        assert_eq!(summary.trainable_params(), model.num_params());
        assert_eq!(summary.output_shape(), &[2]);
    }

    #[test]
    fn test_dense_rejects_empty_shape() {
        let device = Default::default();
        assert!(DenseConfig::new(vec![], 2).init::<TestBackend>(&device).is_err());
    }
}
