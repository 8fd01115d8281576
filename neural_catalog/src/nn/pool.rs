//! Volumetric max pooling.

use burn::config::Config;
use burn::module::Module;
use burn::prelude::*;

/// Configuration for [`MaxPool3d`].
#[derive(Config, Debug)]
pub struct MaxPool3dConfig {
    /// Window size along depth, height and width. The stride equals the window.
    pub pool_size: [usize; 3],
}

impl MaxPool3dConfig {
    /// Cubic window of the same size on every axis.
    pub fn cubic(size: usize) -> Self {
        Self::new([size; 3])
    }

    /// Initialize the pooling layer.
    pub fn init(&self) -> MaxPool3d {
        MaxPool3d {
            pool_size: self.pool_size,
        }
    }
}

/// Non-overlapping 3D max pooling with valid padding.
///
/// Input: [batch, channels, depth, height, width]
/// Output: [batch, channels, depth / pd, height / ph, width / pw]
///
/// Trailing voxels that do not fill a whole window are dropped. The window
/// maximum is taken one axis at a time, which gives the same result as a
/// joint 3D window and keeps every intermediate tensor at rank 5 or lower.
#[derive(Module, Clone, Debug)]
pub struct MaxPool3d {
    pool_size: [usize; 3],
}

impl MaxPool3d {
    /// Window size along each axis.
    pub fn pool_size(&self) -> [usize; 3] {
        self.pool_size
    }

    /// Forward pass.
    pub fn forward<B: Backend>(&self, x: Tensor<B, 5>) -> Tensor<B, 5> {
        let [batch, channels, depth, height, width] = x.dims();
        let [pd, ph, pw] = self.pool_size;
        let (od, oh, ow) = (depth / pd, height / ph, width / pw);

        // depth
        let x = x
            .narrow(2, 0, od * pd)
            .reshape([batch * channels, od, pd, height * width])
            .max_dim(2)
            .reshape([batch, channels, od, height, width]);

        // height
        let x = x
            .narrow(3, 0, oh * ph)
            .reshape([batch * channels * od, oh, ph, width])
            .max_dim(2)
            .reshape([batch, channels, od, oh, width]);

        // width
        x.narrow(4, 0, ow * pw)
            .reshape([batch * channels * od * oh, ow, pw])
            .max_dim(2)
            .reshape([batch, channels, od, oh, ow])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn arange_volume(n: usize) -> Vec<f32> {
        (0..n * n * n).map(|v| v as f32).collect()
    }

    #[test]
    fn test_output_shape_floors() {
        let device = Default::default();
        let pool = MaxPool3dConfig::cubic(2).init();

        let input = Tensor::<TestBackend, 5>::zeros([2, 3, 5, 6, 7], &device);
        let output = pool.forward(input);

        assert_eq!(output.dims(), [2, 3, 2, 3, 3]);
    }

    #[test]
    fn test_window_maximum() {
        let device = Default::default();
        let n = 4;
        let data = arange_volume(n);
        let input = Tensor::<TestBackend, 5>::from_data(
            TensorData::new(data.clone(), [1, 1, n, n, n]),
            &device,
        );

        let output = MaxPool3dConfig::cubic(2).init().forward(input);
        let values: Vec<f32> = output.into_data().to_vec().unwrap();

        let mut expected = Vec::new();
        for d in 0..2 {
            for h in 0..2 {
                for w in 0..2 {
                    let mut max = f32::MIN;
                    for i in 0..2 {
                        for j in 0..2 {
                            for k in 0..2 {
                                let idx = ((d * 2 + i) * n + (h * 2 + j)) * n + (w * 2 + k);
                                max = max.max(data[idx]);
                            }
                        }
                    }
                    expected.push(max);
                }
            }
        }

        assert_eq!(values, expected);
    }

    #[test]
    fn test_anisotropic_window() {
        let device = Default::default();
        let pool = MaxPool3dConfig::new([1, 2, 4]).init();

        let input = Tensor::<TestBackend, 5>::ones([1, 2, 3, 4, 8], &device);
        let output = pool.forward(input);

        assert_eq!(output.dims(), [1, 2, 3, 2, 2]);
        assert_eq!(pool.pool_size(), [1, 2, 4]);
    }

    #[test]
    fn test_channels_pooled_independently() {
        let device = Default::default();
        let mut data = vec![0.0f32; 2 * 8];
        data[3] = 1.0; // channel 0
        data[8 + 5] = 2.0; // channel 1
        let input =
            Tensor::<TestBackend, 5>::from_data(TensorData::new(data, [1, 2, 2, 2, 2]), &device);

        let output = MaxPool3dConfig::cubic(2).init().forward(input);
        let values: Vec<f32> = output.into_data().to_vec().unwrap();

        assert_eq!(values, vec![1.0, 2.0]);
    }
}
