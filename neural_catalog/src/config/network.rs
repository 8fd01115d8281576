//! Model configuration types.

use burn::config::Config;

use super::Architecture;
use crate::error::{CatalogError, Result as CatalogResult};
use crate::shape::validate_input_shape;

fn check_output_size(output_size: usize) -> CatalogResult<()> {
    if output_size == 0 {
        return Err(CatalogError::invalid_config("output_size must be positive"));
    }
    Ok(())
}

/// Configuration for the dense baseline.
#[derive(Config, Debug)]
pub struct DenseConfig {
    /// Per-sample input shape. Any rank.
    pub input_shape: Vec<usize>,
    /// Output dimension.
    pub output_size: usize,
    /// Hidden layer dimensions.
    #[config(default = "vec![128, 64]")]
    pub hidden_dims: Vec<usize>,
}

impl DenseConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> CatalogResult<()> {
        validate_input_shape(Architecture::Dense.model_name(), &self.input_shape, None)?;
        check_output_size(self.output_size)?;
        if self.hidden_dims.contains(&0) {
            return Err(CatalogError::invalid_config("hidden_dims must be positive"));
        }
        Ok(())
    }
}

/// One convolution stage of a VoxNet.
#[derive(Config, Debug, PartialEq)]
pub struct VoxelStageConfig {
    /// Number of output channels.
    pub filters: usize,
    /// Cubic kernel edge length.
    pub kernel_size: usize,
    /// Stride on every axis.
    #[config(default = 1)]
    pub stride: usize,
    /// Cubic max-pooling window applied after the convolution.
    pub pool: Option<usize>,
}

/// Configuration for a VoxNet-style 3D convolutional network.
#[derive(Config, Debug)]
pub struct VoxNetConfig {
    /// Per-sample voxel grid shape `[x, y, z]`.
    pub input_shape: Vec<usize>,
    /// Output dimension.
    pub output_size: usize,
    /// Convolution stages in order.
    pub stages: Vec<VoxelStageConfig>,
    /// Width of the hidden dense layer.
    pub dense_units: usize,
    /// Name reported by the model.
    #[config(default = "String::from(\"VoxNet\")")]
    pub name: String,
}

impl VoxNetConfig {
    /// `C7-F32-P2-C5-F64-P2-D512` from the VoxNet paper.
    pub fn small(input_shape: Vec<usize>, output_size: usize) -> Self {
        Self::new(
            input_shape,
            output_size,
            vec![
                VoxelStageConfig::new(32, 7).with_pool(Some(4)),
                VoxelStageConfig::new(64, 5).with_pool(Some(2)),
            ],
            512,
        )
        .with_name(Architecture::VoxNetSmall.model_name().to_string())
    }

    /// `C7-F64-P4-D512`, a single wide stage.
    pub fn big(input_shape: Vec<usize>, output_size: usize) -> Self {
        Self::new(
            input_shape,
            output_size,
            vec![VoxelStageConfig::new(64, 7).with_pool(Some(4))],
            512,
        )
        .with_name(Architecture::VoxNetBig.model_name().to_string())
    }

    /// The variant published on the VoxNet project page.
    pub fn homepage(input_shape: Vec<usize>, output_size: usize) -> Self {
        Self::new(
            input_shape,
            output_size,
            vec![
                VoxelStageConfig::new(32, 5).with_stride(2),
                VoxelStageConfig::new(32, 3).with_pool(Some(2)),
            ],
            128,
        )
        .with_name(Architecture::VoxNetHomepage.model_name().to_string())
    }

    /// Validate the configuration.
    ///
    /// Spatial shrinkage through the stages is checked when the model is built.
    pub fn validate(&self) -> CatalogResult<()> {
        validate_input_shape(&self.name, &self.input_shape, Some(3))?;
        check_output_size(self.output_size)?;
        if self.stages.is_empty() {
            return Err(CatalogError::invalid_config("VoxNet needs at least one stage"));
        }
        for stage in &self.stages {
            if stage.filters == 0 || stage.kernel_size == 0 || stage.stride == 0 {
                return Err(CatalogError::invalid_config(
                    "stage filters, kernel_size and stride must be positive",
                ));
            }
            if stage.pool == Some(0) {
                return Err(CatalogError::invalid_config("pool size must be positive"));
            }
        }
        if self.dense_units == 0 {
            return Err(CatalogError::invalid_config("dense_units must be positive"));
        }
        Ok(())
    }
}

/// Configuration for PointNet.
#[derive(Config, Debug)]
pub struct PointNetConfig {
    /// Per-sample point set shape `[num_points, coord_dim]`.
    pub input_shape: Vec<usize>,
    /// Output dimension.
    pub output_size: usize,
    /// Pointwise convolutions between the input and feature transforms.
    /// The last width is the size of the feature transform.
    #[config(default = "vec![64, 64]")]
    pub feature_channels: Vec<usize>,
    /// Pointwise convolutions after the feature transform.
    #[config(default = "vec![64, 128, 1024]")]
    pub global_channels: Vec<usize>,
    /// Hidden dense widths of the classification head.
    #[config(default = "vec![512, 256]")]
    pub head_units: Vec<usize>,
    /// Dropout probability in the head.
    #[config(default = 0.7)]
    pub dropout: f64,
}

impl PointNetConfig {
    /// Number of points per sample. Only valid after [`Self::validate`].
    pub(crate) fn num_points(&self) -> usize {
        self.input_shape[0]
    }

    /// Coordinates per point. Only valid after [`Self::validate`].
    pub(crate) fn coord_dim(&self) -> usize {
        self.input_shape[1]
    }

    /// Validate the configuration.
    pub fn validate(&self) -> CatalogResult<()> {
        validate_input_shape(
            Architecture::PointNet.model_name(),
            &self.input_shape,
            Some(2),
        )?;
        check_output_size(self.output_size)?;
        if self.feature_channels.is_empty() || self.global_channels.is_empty() {
            return Err(CatalogError::invalid_config(
                "PointNet needs feature and global convolutions",
            ));
        }
        let mut widths = self
            .feature_channels
            .iter()
            .chain(&self.global_channels)
            .chain(&self.head_units);
        if widths.any(|&w| w == 0) {
            return Err(CatalogError::invalid_config("layer widths must be positive"));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(CatalogError::invalid_config("dropout must be in [0, 1)"));
        }
        Ok(())
    }
}

/// How per-frame outputs are combined over time.
#[derive(Config, Debug, PartialEq, Eq)]
pub enum TemporalAggregation {
    /// LSTM with ReLU activation, last hidden state.
    Lstm,
    /// Mean over the whole sequence.
    AveragePooling,
}

/// Configuration for the time-distributed sequence wrapper.
#[derive(Config, Debug)]
pub struct SequenceConfig {
    /// Architecture applied to every frame.
    pub base: Architecture,
    /// Number of frames per sample.
    pub sequence_length: usize,
    /// Per-frame input shape.
    pub frame_shape: Vec<usize>,
    /// Output dimension of both the base model and the final dense layer.
    pub output_size: usize,
    /// Temporal aggregation.
    pub aggregation: TemporalAggregation,
    /// LSTM hidden size when aggregating with an LSTM.
    #[config(default = 8)]
    pub lstm_units: usize,
}

impl SequenceConfig {
    /// Per-sample input shape `[sequence_length, ...frame_shape]`.
    pub fn input_shape(&self) -> Vec<usize> {
        let mut shape = Vec::with_capacity(self.frame_shape.len() + 1);
        shape.push(self.sequence_length);
        shape.extend_from_slice(&self.frame_shape);
        shape
    }

    /// Validate the configuration.
    pub fn validate(&self) -> CatalogResult<()> {
        if self.sequence_length == 0 {
            return Err(CatalogError::invalid_config("sequence_length must be positive"));
        }
        validate_input_shape(
            self.base.model_name(),
            &self.frame_shape,
            self.base.input_rank(),
        )?;
        // Frames stacked along time must still be addressable
        validate_input_shape(self.base.model_name(), &self.input_shape(), None)?;
        check_output_size(self.output_size)?;
        if self.aggregation == TemporalAggregation::Lstm && self.lstm_units == 0 {
            return Err(CatalogError::invalid_config("lstm_units must be positive"));
        }
        Ok(())
    }
}
