//! Shape arithmetic for valid-padding convolutions and pooling.
//!
//! All catalog models declare their per-sample input shape up front. The
//! functions here check those shapes and compute what each stage of a model
//! produces, so construction fails early instead of inside a forward pass.

use crate::error::{CatalogError, Result};

/// Output length of a valid-padding convolution along one axis.
///
/// Returns `None` when the kernel does not fit or the stride is zero.
pub fn conv_output_len(input: usize, kernel: usize, stride: usize) -> Option<usize> {
    if stride == 0 || kernel == 0 || kernel > input {
        return None;
    }
    Some((input - kernel) / stride + 1)
}

/// Output length of a non-overlapping pooling window along one axis.
///
/// The trailing remainder is dropped. Returns `None` if nothing is left.
pub fn pool_output_len(input: usize, pool: usize) -> Option<usize> {
    if pool == 0 {
        return None;
    }
    match input / pool {
        0 => None,
        n => Some(n),
    }
}

/// Number of elements in a tensor of the given shape.
///
/// Shapes accepted by [`validate_input_shape`] never overflow here.
pub fn volume(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Number of elements, or `None` if the count overflows `usize`.
pub fn checked_volume(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

/// Check that a per-sample input shape is usable.
///
/// Rejects empty shapes and zero-sized dimensions. When `expected_rank` is
/// given the shape must also have exactly that many dimensions.
pub fn validate_input_shape(
    architecture: &str,
    shape: &[usize],
    expected_rank: Option<usize>,
) -> Result<()> {
    if shape.is_empty() {
        return Err(CatalogError::InvalidInputShape {
            shape: shape.to_vec(),
            message: "shape has no dimensions".to_string(),
        });
    }
    if shape.contains(&0) {
        return Err(CatalogError::InvalidInputShape {
            shape: shape.to_vec(),
            message: "zero-sized dimension".to_string(),
        });
    }
    if checked_volume(shape).is_none() {
        return Err(CatalogError::InvalidInputShape {
            shape: shape.to_vec(),
            message: "element count overflows usize".to_string(),
        });
    }
    if let Some(rank) = expected_rank {
        if shape.len() != rank {
            return Err(CatalogError::RankMismatch {
                architecture: architecture.to_string(),
                expected: rank,
                shape: shape.to_vec(),
            });
        }
    }
    Ok(())
}

/// Apply a valid-padding 3D convolution to a spatial shape.
pub(crate) fn conv3d_shape(
    layer: &str,
    spatial: [usize; 3],
    kernel: usize,
    stride: usize,
) -> Result<[usize; 3]> {
    let mut out = [0; 3];
    for (axis, &len) in spatial.iter().enumerate() {
        out[axis] = conv_output_len(len, kernel, stride).ok_or_else(|| {
            CatalogError::ShapeTooSmall {
                layer: layer.to_string(),
                spatial: spatial.to_vec(),
            }
        })?;
    }
    Ok(out)
}

/// Apply a non-overlapping 3D pooling window to a spatial shape.
pub(crate) fn pool3d_shape(layer: &str, spatial: [usize; 3], pool: usize) -> Result<[usize; 3]> {
    let mut out = [0; 3];
    for (axis, &len) in spatial.iter().enumerate() {
        out[axis] = pool_output_len(len, pool).ok_or_else(|| CatalogError::ShapeTooSmall {
            layer: layer.to_string(),
            spatial: spatial.to_vec(),
        })?;
    }
    Ok(out)
}
