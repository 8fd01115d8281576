//! Example: Printing the summary of every catalog model.
//!
//! Builds each architecture for a 32^3 voxel grid or a 1024-point cloud,
//! prints its layer table, runs a forward pass on random data, and finishes
//! with the two sequence variants.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=info cargo run -p neural_catalog --example model_summary
//! ```

use burn::backend::NdArray;
use burn::prelude::*;
use burn::tensor::Distribution;

use neural_catalog::{create_model, create_sequence_model, Architecture, Result};

type MyBackend = NdArray;

const VOXEL_SHAPE: [usize; 3] = [32, 32, 32];
const POINT_SHAPE: [usize; 2] = [1024, 3];
const OUTPUT_SIZE: usize = 2;
const SEQUENCE_LENGTH: usize = 4;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let device = burn::backend::ndarray::NdArrayDevice::Cpu;

    println!("═══════════════════════════════════════════════════════════════");
    println!("                  Neural Catalog Model Summary");
    println!("═══════════════════════════════════════════════════════════════");
    println!();

    for arch in Architecture::ALL {
        let shape: &[usize] = match arch.input_rank() {
            Some(2) => &POINT_SHAPE,
            _ => &VOXEL_SHAPE,
        };
        let model = create_model::<MyBackend>(arch.clone(), shape, OUTPUT_SIZE, &device)?;
        println!("{}", model.summary());

        let mut batch_shape = vec![2];
        batch_shape.extend_from_slice(shape);
        let input: Tensor<MyBackend, 2> = Tensor::random(
            [2, shape.iter().product::<usize>()],
            Distribution::Bernoulli(0.1),
            &device,
        );
        let output = model.forward(input);
        println!("  forward {:?} -> {:?}", batch_shape, output.dims());
        println!();
    }

    println!("┌─────────────────────────────────────────────────────────────┐");
    println!("│ Sequence models                                             │");
    println!("└─────────────────────────────────────────────────────────────┘");

    for use_lstm in [true, false] {
        let model = create_sequence_model::<MyBackend>(
            "pointnet",
            SEQUENCE_LENGTH,
            &POINT_SHAPE,
            OUTPUT_SIZE,
            use_lstm,
            &device,
        )?;
        println!("{}", model.summary());

        let input = Tensor::<MyBackend, 4>::random(
            [1, SEQUENCE_LENGTH, POINT_SHAPE[0], POINT_SHAPE[1]],
            Distribution::Uniform(-1.0, 1.0),
            &device,
        );
        println!("  forward -> {:?}", model.forward(input).dims());
        println!();
    }

    Ok(())
}
