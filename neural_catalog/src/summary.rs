//! Layer-by-layer model summaries.
//!
//! A [`ModelSummary`] lists every layer of a catalog model with its
//! per-sample output shape and parameter counts, and renders as a table.

use core::fmt;

/// One row of a model summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSummary {
    /// Layer name, including its activation where one is fused in.
    pub name: String,
    /// Per-sample output shape (batch axis omitted).
    pub output_shape: Vec<usize>,
    /// Parameters updated by gradient descent.
    pub trainable_params: usize,
    /// Running statistics and other state not updated by gradients.
    pub non_trainable_params: usize,
}

impl LayerSummary {
    /// A layer with only trainable parameters (or none).
    pub fn trainable(name: impl Into<String>, output_shape: Vec<usize>, params: usize) -> Self {
        Self {
            name: name.into(),
            output_shape,
            trainable_params: params,
            non_trainable_params: 0,
        }
    }

    /// A parameter-free layer such as reshape, pooling or dropout.
    pub fn stateless(name: impl Into<String>, output_shape: Vec<usize>) -> Self {
        Self::trainable(name, output_shape, 0)
    }

    /// A batch normalization layer over `features` channels.
    pub fn batch_norm(name: impl Into<String>, output_shape: Vec<usize>, features: usize) -> Self {
        Self {
            name: name.into(),
            output_shape,
            trainable_params: 2 * features,
            non_trainable_params: 2 * features,
        }
    }
}

/// Summary of a whole model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSummary {
    /// Model name.
    pub name: String,
    /// Per-sample input shape.
    pub input_shape: Vec<usize>,
    /// Layers in execution order.
    pub layers: Vec<LayerSummary>,
}

impl ModelSummary {
    /// Create an empty summary.
    pub fn new(name: impl Into<String>, input_shape: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            input_shape,
            layers: Vec::new(),
        }
    }

    /// Append a layer.
    pub fn push(&mut self, layer: LayerSummary) {
        self.layers.push(layer);
    }

    /// Append several layers.
    pub fn extend(&mut self, layers: impl IntoIterator<Item = LayerSummary>) {
        self.layers.extend(layers);
    }

    /// Total trainable parameters.
    pub fn trainable_params(&self) -> usize {
        self.layers.iter().map(|l| l.trainable_params).sum()
    }

    /// Total non-trainable parameters.
    pub fn non_trainable_params(&self) -> usize {
        self.layers.iter().map(|l| l.non_trainable_params).sum()
    }

    /// Trainable plus non-trainable parameters.
    pub fn total_params(&self) -> usize {
        self.trainable_params() + self.non_trainable_params()
    }

    /// Per-sample output shape of the last layer.
    pub fn output_shape(&self) -> &[usize] {
        self.layers
            .last()
            .map(|l| l.output_shape.as_slice())
            .unwrap_or(&self.input_shape)
    }
}

fn format_shape(shape: &[usize]) -> String {
    let dims: Vec<String> = shape.iter().map(|d| d.to_string()).collect();
    format!("(None, {})", dims.join(", "))
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const RULE: &str =
            "_________________________________________________________________________";
        writeln!(f, "Model: \"{}\"", self.name)?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "{:<36}{:<26}{:>11}", "Layer", "Output Shape", "Param #")?;
        writeln!(f, "{}", "=".repeat(RULE.len()))?;
        writeln!(
            f,
            "{:<36}{:<26}{:>11}",
            "input",
            format_shape(&self.input_shape),
            0
        )?;
        for layer in &self.layers {
            writeln!(
                f,
                "{:<36}{:<26}{:>11}",
                layer.name,
                format_shape(&layer.output_shape),
                layer.trainable_params + layer.non_trainable_params
            )?;
        }
        writeln!(f, "{}", "=".repeat(RULE.len()))?;
        writeln!(f, "Total params: {}", self.total_params())?;
        writeln!(f, "Trainable params: {}", self.trainable_params())?;
        writeln!(f, "Non-trainable params: {}", self.non_trainable_params())?;
        write!(f, "{RULE}")
    }
}

/// Parameters of a dense layer with bias.
pub(crate) fn linear_params(input: usize, output: usize) -> usize {
    input * output + output
}

/// Parameters of a 3D convolution with bias.
pub(crate) fn conv3d_params(in_channels: usize, out_channels: usize, kernel: usize) -> usize {
    in_channels * out_channels * kernel.pow(3) + out_channels
}

/// Parameters of a 1D convolution with bias.
pub(crate) fn conv1d_params(in_channels: usize, out_channels: usize, kernel: usize) -> usize {
    in_channels * out_channels * kernel + out_channels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        let mut summary = ModelSummary::new("test", vec![8]);
        summary.push(LayerSummary::trainable("dense_1", vec![4], linear_params(8, 4)));
        summary.push(LayerSummary::batch_norm("batch_norm_1", vec![4], 4));
        summary.push(LayerSummary::stateless("dropout_1", vec![4]));

        assert_eq!(summary.trainable_params(), 36 + 8);
        assert_eq!(summary.non_trainable_params(), 8);
        assert_eq!(summary.total_params(), 52);
        assert_eq!(summary.output_shape(), &[4]);
    }

    #[test]
    fn test_display_lists_layers() {
        let mut summary = ModelSummary::new("tiny", vec![2, 2]);
        summary.push(LayerSummary::stateless("flatten", vec![4]));
        summary.push(LayerSummary::trainable("dense_1", vec![1], linear_params(4, 1)));

        let text = summary.to_string();

        assert!(text.starts_with("Model: \"tiny\""));
        assert!(text.contains("(None, 2, 2)"));
        assert!(text.contains("dense_1"));
        assert!(text.contains("Total params: 5"));
    }

    #[test]
    fn test_param_formulas() {
        assert_eq!(conv3d_params(1, 32, 7), 11_008);
        assert_eq!(conv3d_params(32, 64, 5), 256_064);
        assert_eq!(conv1d_params(3, 64, 1), 256);
    }
}
