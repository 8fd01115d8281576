//! Catalog architecture identifiers.

use core::str::FromStr;

use burn::config::Config;

use crate::error::CatalogError;

/// A non-sequence architecture in the catalog.
#[derive(Config, Debug, PartialEq, Eq)]
pub enum Architecture {
    /// Flatten followed by two hidden dense layers. Baseline only.
    Dense,
    /// Two convolution stages with pooling, 512-unit head.
    VoxNetSmall,
    /// One wide convolution stage with pooling, 512-unit head.
    VoxNetBig,
    /// Strided and plain convolution, one pooling stage, 128-unit head.
    VoxNetHomepage,
    /// PointNet with input and feature alignment.
    PointNet,
}

impl Architecture {
    /// Every catalog architecture.
    pub const ALL: [Architecture; 5] = [
        Architecture::Dense,
        Architecture::VoxNetSmall,
        Architecture::VoxNetBig,
        Architecture::VoxNetHomepage,
        Architecture::PointNet,
    ];

    /// Short identifier accepted by [`FromStr`].
    pub fn id(&self) -> &'static str {
        match self {
            Architecture::Dense => "dense",
            Architecture::VoxNetSmall => "voxnet-small",
            Architecture::VoxNetBig => "voxnet-big",
            Architecture::VoxNetHomepage => "voxnet",
            Architecture::PointNet => "pointnet",
        }
    }

    /// Name reported by the built model.
    pub fn model_name(&self) -> &'static str {
        match self {
            Architecture::Dense => "baseline-dense",
            Architecture::VoxNetSmall => "C7-F32-P2-C5-F64-P2-D512",
            Architecture::VoxNetBig => "C7-F64-P4-D512",
            Architecture::VoxNetHomepage => "VoxNetHomepage",
            Architecture::PointNet => "PointNet",
        }
    }

    /// Required rank of the per-sample input shape, if any.
    pub fn input_rank(&self) -> Option<usize> {
        match self {
            Architecture::Dense => None,
            Architecture::VoxNetSmall | Architecture::VoxNetBig | Architecture::VoxNetHomepage => {
                Some(3)
            }
            Architecture::PointNet => Some(2),
        }
    }
}

impl FromStr for Architecture {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "dense" | "baseline-dense" => Ok(Architecture::Dense),
            "voxnet-small" | "c7-f32-p2-c5-f64-p2-d512" => Ok(Architecture::VoxNetSmall),
            "voxnet-big" | "c7-f64-p4-d512" => Ok(Architecture::VoxNetBig),
            "voxnet" | "voxnet-homepage" | "voxnethomepage" => Ok(Architecture::VoxNetHomepage),
            "pointnet" | "point-net" => Ok(Architecture::PointNet),
            _ => Err(CatalogError::UnknownArchitecture(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ids_roundtrip() {
        for arch in Architecture::ALL {
            assert_eq!(arch.id().parse::<Architecture>().unwrap(), arch);
        }
    }

    #[test]
    fn test_parse_model_names_roundtrip() {
        for arch in Architecture::ALL {
            assert_eq!(arch.model_name().parse::<Architecture>().unwrap(), arch);
        }
        assert_eq!(
            "C7-F64-P4-D512".parse::<Architecture>().unwrap(),
            Architecture::VoxNetBig
        );
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("VoxNet".parse::<Architecture>().unwrap(), Architecture::VoxNetHomepage);
        assert_eq!("voxnet_small".parse::<Architecture>().unwrap(), Architecture::VoxNetSmall);
        assert_eq!(" PointNet ".parse::<Architecture>().unwrap(), Architecture::PointNet);
        assert_eq!("baseline-dense".parse::<Architecture>().unwrap(), Architecture::Dense);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "resnet".parse::<Architecture>().unwrap_err();
        assert!(matches!(err, CatalogError::UnknownArchitecture(ref name) if name == "resnet"));
    }

    #[test]
    fn test_input_rank() {
        assert_eq!(Architecture::Dense.input_rank(), None);
        assert_eq!(Architecture::VoxNetBig.input_rank(), Some(3));
        assert_eq!(Architecture::PointNet.input_rank(), Some(2));
    }
}
