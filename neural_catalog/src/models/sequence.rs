//! Time-distributed sequence wrapper.

use burn::module::{Ignored, Module};
use burn::nn::{Linear, LinearConfig};
use burn::prelude::*;

use super::{create_model, CatalogModel};
use crate::config::{SequenceConfig, TemporalAggregation};
use crate::error::Result;
use crate::nn::{Lstm, LstmConfig, RecurrentActivation};
use crate::shape::volume;
use crate::summary::{linear_params, LayerSummary, ModelSummary};

impl SequenceConfig {
    fn lstm_config(&self) -> LstmConfig {
        LstmConfig::new(self.output_size, self.lstm_units)
            .with_activation(RecurrentActivation::Relu)
    }

    fn aggregated_dim(&self) -> usize {
        match self.aggregation {
            TemporalAggregation::Lstm => self.lstm_units,
            TemporalAggregation::AveragePooling => self.output_size,
        }
    }

    /// Build the sequence model.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<SequenceModel<B>> {
        self.validate()?;

        let base = create_model(self.base.clone(), &self.frame_shape, self.output_size, device)?;
        let lstm = match self.aggregation {
            TemporalAggregation::Lstm => Some(self.lstm_config().init(device)),
            TemporalAggregation::AveragePooling => None,
        };
        let output = LinearConfig::new(self.aggregated_dim(), self.output_size).init(device);

        let model = SequenceModel {
            base,
            lstm,
            output,
            name: Ignored(format!("Sequence-{}", self.base.model_name())),
            config: Ignored(self.clone()),
        };
        log::info!(
            "built {} over {} frames ({:?}) with {} parameters",
            model.name(),
            self.sequence_length,
            self.aggregation,
            model.num_params()
        );
        Ok(model)
    }
}

/// Applies a catalog model to every frame of a sequence, then aggregates
/// the per-frame outputs over time.
#[derive(Module, Debug)]
pub struct SequenceModel<B: Backend> {
    base: CatalogModel<B>,
    lstm: Option<Lstm<B>>,
    output: Linear<B>,
    name: Ignored<String>,
    config: Ignored<SequenceConfig>,
}

impl<B: Backend> SequenceModel<B> {
    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The per-frame model.
    pub fn base(&self) -> &CatalogModel<B> {
        &self.base
    }

    /// Per-sample input shape `[sequence_length, ...frame_shape]`.
    pub fn input_shape(&self) -> Vec<usize> {
        self.config.input_shape()
    }

    /// Output dimension.
    pub fn output_size(&self) -> usize {
        self.config.output_size
    }

    /// Temporal aggregation in use.
    pub fn aggregation(&self) -> &TemporalAggregation {
        &self.config.aggregation
    }

    /// Run the base model on every frame independently.
    ///
    /// Input: [batch, sequence_length, ...frame_shape]
    /// Output: [batch, sequence_length, output_size]
    pub fn forward_frames<const D: usize>(&self, input: Tensor<B, D>) -> Tensor<B, 3> {
        let batch = input.dims()[0];
        let seq_len = self.config.sequence_length;

        // Fold time into the batch axis
        let frames: Tensor<B, 2> =
            input.reshape([batch * seq_len, volume(&self.config.frame_shape)]);
        let per_frame = self.base.forward(frames);

        per_frame.reshape([batch, seq_len, self.base.output_size()])
    }

    /// Forward pass.
    ///
    /// Input: [batch, sequence_length, ...frame_shape]
    /// Output: [batch, output_size]
    pub fn forward<const D: usize>(&self, input: Tensor<B, D>) -> Tensor<B, 2> {
        let per_frame = self.forward_frames(input);
        let [batch, _, features] = per_frame.dims();

        let aggregated = match &self.lstm {
            Some(lstm) => lstm.forward(per_frame),
            None => per_frame.mean_dim(1).reshape([batch, features]),
        };

        self.output.forward(aggregated)
    }

    /// Layer-by-layer summary. The base model counts as a single layer.
    pub fn summary(&self) -> ModelSummary {
        let config = &*self.config;
        let base = self.base.summary();
        let mut summary = ModelSummary::new(self.name(), config.input_shape());

        summary.push(LayerSummary {
            name: format!("time_distributed ({})", base.name),
            output_shape: vec![config.sequence_length, config.output_size],
            trainable_params: base.trainable_params(),
            non_trainable_params: base.non_trainable_params(),
        });
        match config.aggregation {
            TemporalAggregation::Lstm => summary.push(LayerSummary::trainable(
                "lstm (relu)",
                vec![config.lstm_units],
                config.lstm_config().num_params(),
            )),
            TemporalAggregation::AveragePooling => {
                summary.push(LayerSummary::stateless(
                    "average_pooling1d",
                    vec![1, config.output_size],
                ));
                summary.push(LayerSummary::stateless("flatten", vec![config.output_size]));
            }
        }
        summary.push(LayerSummary::trainable(
            "dense",
            vec![config.output_size],
            linear_params(config.aggregated_dim(), config.output_size),
        ));
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Architecture;
    use burn::backend::NdArray;
    use burn::tensor::Distribution;

    type TestBackend = NdArray;

    fn dense_sequence(aggregation: TemporalAggregation) -> SequenceModel<TestBackend> {
        let device = Default::default();
        SequenceConfig::new(Architecture::Dense, 5, vec![4, 4], 3, aggregation)
            .init(&device)
            .unwrap()
    }

    #[test]
    fn test_forward_frames_matches_base() {
        let device = Default::default();
        let model = dense_sequence(TemporalAggregation::AveragePooling);

        let input = Tensor::<TestBackend, 4>::random(
            [2, 5, 4, 4],
            Distribution::Normal(0.0, 1.0),
            &device,
        );
        let per_frame = model.forward_frames(input.clone());

        // Frame 3 of sample 1 through the base model directly
        let frame = input.narrow(0, 1, 1).narrow(1, 3, 1).reshape([1, 4, 4]);
        let direct = model.base().forward(frame);
        let wrapped = per_frame.narrow(0, 1, 1).narrow(1, 3, 1).reshape([1, 3]);

        let diff: f32 = (direct - wrapped).abs().max().into_scalar();
        assert!(diff < 1e-5, "Max diff: {}", diff);
    }

    #[test]
    fn test_average_pooling_ignores_frame_order() {
        let device = Default::default();
        let model = dense_sequence(TemporalAggregation::AveragePooling);

        let input = Tensor::<TestBackend, 4>::random(
            [1, 5, 4, 4],
            Distribution::Normal(0.0, 1.0),
            &device,
        );
        let reversed = Tensor::cat(
            (0..5).rev().map(|t| input.clone().narrow(1, t, 1)).collect(),
            1,
        );

        let diff: f32 = (model.forward(input) - model.forward(reversed))
            .abs()
            .max()
            .into_scalar();
        assert!(diff < 1e-5, "Max diff: {}", diff);
    }

    #[test]
    fn test_lstm_aggregation_shape() {
        let device = Default::default();
        let model = dense_sequence(TemporalAggregation::Lstm);

        let output = model.forward(Tensor::<TestBackend, 4>::zeros([3, 5, 4, 4], &device));

        assert_eq!(output.dims(), [3, 3]);
        assert_eq!(model.aggregation(), &TemporalAggregation::Lstm);
        assert_eq!(model.input_shape(), vec![5, 4, 4]);
    }

    #[test]
    fn test_summary_matches_params_without_batch_norm() {
        for aggregation in [TemporalAggregation::Lstm, TemporalAggregation::AveragePooling] {
            let model = dense_sequence(aggregation);
            let summary = model.summary();

            assert_eq!(summary.trainable_params(), model.num_params());
            assert_eq!(summary.output_shape(), &[3]);
        }
    }

    #[test]
    fn test_name() {
        let model = dense_sequence(TemporalAggregation::Lstm);
        assert_eq!(model.name(), "Sequence-baseline-dense");
    }
}
