//! MLP (Multi-Layer Perceptron) building blocks.

use burn::config::Config;
use burn::module::Module;
use burn::nn::{Linear, LinearConfig, Relu};
use burn::prelude::*;

use crate::summary::{linear_params, LayerSummary};

/// Configuration for an MLP layer.
#[derive(Config, Debug)]
pub struct MlpConfig {
    /// Input dimension.
    pub input_dim: usize,
    /// Output dimension.
    pub output_dim: usize,
    /// Hidden layer dimensions.
    #[config(default = "vec![]")]
    pub hidden_dims: Vec<usize>,
}

impl MlpConfig {
    /// Initialize the MLP.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Mlp<B> {
        let mut layers = Vec::new();
        let mut in_dim = self.input_dim;

        // Hidden layers
        for &out_dim in &self.hidden_dims {
            layers.push(LinearConfig::new(in_dim, out_dim).init(device));
            in_dim = out_dim;
        }

        // Linear output layer
        let output = LinearConfig::new(in_dim, self.output_dim).init(device);

        Mlp {
            layers,
            output,
            activation: Relu::new(),
        }
    }

    /// Per-layer summary rows, one per Linear layer.
    pub fn summary_layers(&self, prefix: &str) -> Vec<LayerSummary> {
        let mut rows = Vec::with_capacity(self.hidden_dims.len() + 1);
        let mut in_dim = self.input_dim;
        for (i, &out_dim) in self.hidden_dims.iter().enumerate() {
            rows.push(LayerSummary::trainable(
                format!("{prefix}dense_{} (relu)", i + 1),
                vec![out_dim],
                linear_params(in_dim, out_dim),
            ));
            in_dim = out_dim;
        }
        rows.push(LayerSummary::trainable(
            format!("{prefix}dense_{}", self.hidden_dims.len() + 1),
            vec![self.output_dim],
            linear_params(in_dim, self.output_dim),
        ));
        rows
    }
}

/// ReLU hidden layers followed by a linear output layer.
#[derive(Module, Debug)]
pub struct Mlp<B: Backend> {
    layers: Vec<Linear<B>>,
    output: Linear<B>,
    activation: Relu,
}

impl<B: Backend> Mlp<B> {
    /// Forward pass.
    ///
    /// Input shape: [batch, input_dim]
    /// Output shape: [batch, output_dim]
    pub fn forward(&self, mut x: Tensor<B, 2>) -> Tensor<B, 2> {
        for layer in &self.layers {
            x = self.activation.forward(layer.forward(x));
        }
        self.output.forward(x)
    }
}
