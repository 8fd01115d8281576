//! Recurrent temporal aggregation.

use burn::config::Config;
use burn::module::{Ignored, Module, Param};
use burn::nn::{Initializer, Linear, LinearConfig};
use burn::prelude::*;
use burn::tensor::activation::{relu, sigmoid, tanh};

use crate::summary::linear_params;

/// Activation applied to the candidate cell state and the output cell state.
#[derive(Config, Debug, PartialEq)]
pub enum RecurrentActivation {
    /// Rectified linear unit.
    Relu,
    /// Hyperbolic tangent.
    Tanh,
}

/// Configuration for an [`Lstm`].
#[derive(Config, Debug)]
pub struct LstmConfig {
    /// Features per time step.
    pub d_input: usize,
    /// Hidden state size.
    pub units: usize,
    /// Cell and output activation. Gates always use a sigmoid.
    #[config(default = "RecurrentActivation::Tanh")]
    pub activation: RecurrentActivation,
}

impl LstmConfig {
    /// Initialize the LSTM with the forget gate biased open.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Lstm<B> {
        let units = self.units;

        let mut input_gates = LinearConfig::new(self.d_input, 4 * units)
            .with_initializer(Initializer::XavierUniform { gain: 1.0 })
            .init(device);

        let mut bias = vec![0.0f32; 4 * units];
        bias[units..2 * units].fill(1.0);
        input_gates.bias = Some(Param::from_tensor(Tensor::from_data(
            TensorData::new(bias, [4 * units]),
            device,
        )));

        let hidden_gates = LinearConfig::new(units, 4 * units)
            .with_bias(false)
            .init(device);

        Lstm {
            input_gates,
            hidden_gates,
            units,
            activation: Ignored(self.activation.clone()),
        }
    }

    /// Number of trainable parameters.
    pub fn num_params(&self) -> usize {
        linear_params(self.d_input, 4 * self.units) + self.units * 4 * self.units
    }
}

/// Single-layer LSTM returning the last hidden state.
///
/// Gate layout along the feature axis is input, forget, candidate, output.
#[derive(Module, Debug)]
pub struct Lstm<B: Backend> {
    /// Input-to-gates projection (with bias).
    input_gates: Linear<B>,
    /// Hidden-to-gates projection (no bias).
    hidden_gates: Linear<B>,
    units: usize,
    activation: Ignored<RecurrentActivation>,
}

impl<B: Backend> Lstm<B> {
    /// Hidden state size.
    pub fn units(&self) -> usize {
        self.units
    }

    fn activate(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        match *self.activation {
            RecurrentActivation::Relu => relu(x),
            RecurrentActivation::Tanh => tanh(x),
        }
    }

    /// Run the sequence from a zero state.
    ///
    /// Input: [batch, seq_len, d_input]
    /// Output: [batch, units]
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch, seq_len, _] = x.dims();
        let units = self.units;
        let device = x.device();

        // Input contributions for every step at once
        let x_gates = self.input_gates.forward(x);

        let mut hidden = Tensor::zeros([batch, units], &device);
        let mut cell = Tensor::zeros([batch, units], &device);

        for t in 0..seq_len {
            let gates = x_gates
                .clone()
                .narrow(1, t, 1)
                .reshape([batch, 4 * units])
                + self.hidden_gates.forward(hidden);
            let gate = |index: usize| gates.clone().narrow(1, index * units, units);

            let input_gate = sigmoid(gate(0));
            let forget_gate = sigmoid(gate(1));
            let candidate = self.activate(gate(2));
            let output_gate = sigmoid(gate(3));

            cell = forget_gate * cell + input_gate * candidate;
            hidden = output_gate * self.activate(cell.clone());
        }

        hidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Distribution;

    type TestBackend = NdArray;

    #[test]
    fn test_lstm_output_shape() {
        let device = Default::default();
        let lstm = LstmConfig::new(5, 8).init::<TestBackend>(&device);

        let output = lstm.forward(Tensor::zeros([3, 7, 5], &device));

        assert_eq!(output.dims(), [3, 8]);
        assert_eq!(lstm.units(), 8);
    }

    #[test]
    fn test_relu_hidden_state_non_negative() {
        let device = Default::default();
        let lstm = LstmConfig::new(4, 8)
            .with_activation(RecurrentActivation::Relu)
            .init::<TestBackend>(&device);

        let input = Tensor::random([4, 6, 4], Distribution::Normal(0.0, 2.0), &device);
        let min: f32 = lstm.forward(input).min().into_scalar();

        assert!(min >= 0.0, "Min: {}", min);
    }

    #[test]
    fn test_tanh_hidden_state_bounded() {
        let device = Default::default();
        let lstm = LstmConfig::new(4, 8).init::<TestBackend>(&device);

        let input = Tensor::random([4, 6, 4], Distribution::Normal(0.0, 5.0), &device);
        let max: f32 = lstm.forward(input).abs().max().into_scalar();

        assert!(max <= 1.0, "Max: {}", max);
    }

    #[test]
    fn test_zero_input_with_zero_state() {
        let device = Default::default();
        let lstm = LstmConfig::new(2, 4).init::<TestBackend>(&device);

        // Candidate is act(0) = 0 at every step, so the cell never leaves zero
        let output = lstm.forward(Tensor::zeros([1, 5, 2], &device));
        let max: f32 = output.abs().max().into_scalar();

        assert!(max < 1e-6);
    }

    #[test]
    fn test_forget_gate_bias_starts_open() {
        let device = Default::default();
        let units = 4;
        let lstm = LstmConfig::new(3, units).init::<TestBackend>(&device);

        let bias: Vec<f32> = match &lstm.input_gates.bias {
            Some(bias) => bias.val().into_data().to_vec().unwrap(),
            None => panic!("input gates have no bias"),
        };

        assert_eq!(bias.len(), 4 * units);
        for (i, value) in bias.iter().enumerate() {
            let expected = if (units..2 * units).contains(&i) { 1.0 } else { 0.0 };
            assert_eq!(*value, expected, "bias[{}]", i);
        }
        assert!(lstm.hidden_gates.bias.is_none());
    }

    #[test]
    fn test_param_count() {
        let device = Default::default();
        let config = LstmConfig::new(2, 8);
        let lstm = config.init::<TestBackend>(&device);

        // 4 * (2 * 8 + 8 * 8 + 8)
        assert_eq!(config.num_params(), 352);
        assert_eq!(lstm.num_params(), 352);
    }
}
