//! Integration tests for convolution lowering.

mod common;

use common::{assert_allclose_f32, create_sim_engine, random_values, seeded};
use tilemv::error::Error;
use tilemv::ops::{LoweringParams, conv2d_valid, lower, lower_inputs, lower_weights};
use tilemv::tensor::Tensor;

#[rustfmt::skip]
const INPUT_3X3: [f32; 9] = [
    1.0, 2.0, 3.0,
    4.0, 5.0, 6.0,
    7.0, 8.0, 9.0,
];

// =============================================================================
// Single channel
// =============================================================================

#[test]
fn test_lowered_product_matches_hand_computed() {
    let weights = Tensor::from_slice(&[1.0, 2.0, 3.0, 4.0], &[1, 1, 2, 2]).unwrap();
    let inputs = Tensor::from_slice(&INPUT_3X3, &[1, 3, 3]).unwrap();

    let (w, p) = lower(&weights, &inputs).unwrap();
    assert_eq!(w.shape(), &[1, 4]);
    assert_eq!(p.shape(), &[4, 4]);

    let out = w.matmul(&p).unwrap();
    // 1*1 + 2*2 + 3*4 + 4*5, ...
    assert_eq!(out.data(), &[37.0, 47.0, 67.0, 77.0]);
    assert_eq!(conv2d_valid(&weights, &inputs).unwrap().data(), out.data());
}

#[test]
fn test_patch_columns_follow_window_order() {
    let inputs = Tensor::from_slice(&INPUT_3X3, &[1, 3, 3]).unwrap();
    let p = lower_inputs(&inputs, 2, 2).unwrap();
    // columns are windows at (0,0), (0,1), (1,0), (1,1)
    assert_eq!(p.row(0).unwrap(), &[1.0, 2.0, 4.0, 5.0]);
    assert_eq!(p.row(3).unwrap(), &[5.0, 6.0, 8.0, 9.0]);
}

// =============================================================================
// Multi channel
// =============================================================================

#[test]
fn test_multichannel_ordering_consistency() {
    // channel 1 is channel 0 reversed
    let mut input_data = INPUT_3X3.to_vec();
    input_data.extend(INPUT_3X3.iter().rev());
    let inputs = Tensor::from_vec(input_data, &[2, 3, 3]).unwrap();

    #[rustfmt::skip]
    let weights = Tensor::from_slice(&[
        // oc 0: top-left of ic 0 + bottom-right of ic 1
        1.0, 0.0,  0.0, 0.0,
        0.0, 0.0,  0.0, 1.0,
        // oc 1: window sum of ic 0 + twice window sum of ic 1
        1.0, 1.0,  1.0, 1.0,
        2.0, 2.0,  2.0, 2.0,
    ], &[2, 2, 2, 2]).unwrap();

    let (w, p) = lower(&weights, &inputs).unwrap();
    assert_eq!(w.shape(), &[2, 8]);
    assert_eq!(p.shape(), &[8, 4]);

    let out = w.matmul(&p).unwrap();
    assert_eq!(out.shape(), &[2, 4]);
    assert_eq!(out.row(0).unwrap(), &[6.0, 6.0, 6.0, 6.0]);
    assert_eq!(out.row(1).unwrap(), &[68.0, 64.0, 56.0, 52.0]);
    assert_eq!(conv2d_valid(&weights, &inputs).unwrap(), out);
}

#[test]
fn test_random_lowering_matches_direct_convolution() {
    let mut rng = seeded(11);
    let weights = Tensor::from_vec(random_values(&mut rng, 4 * 3 * 3 * 2), &[4, 3, 3, 2]).unwrap();
    let inputs = Tensor::from_vec(random_values(&mut rng, 3 * 6 * 7), &[3, 6, 7]).unwrap();

    let params = LoweringParams::from_shapes(weights.shape(), inputs.shape()).unwrap();
    let (w, p) = lower(&weights, &inputs).unwrap();
    assert_eq!(p.shape(), &[params.patch_len(), params.num_patches()]);
    assert_eq!(params.num_patches(), 4 * 6);

    let lowered = w.matmul(&p).unwrap();
    let direct = conv2d_valid(&weights, &inputs).unwrap();
    assert_allclose_f32(lowered.data(), direct.data(), 1e-5, 1e-5, "lowered vs direct");
}

// =============================================================================
// Convolution on the block device
// =============================================================================

#[test]
fn test_engine_conv2d_matches_direct() {
    let mut rng = seeded(5);
    let weights = Tensor::from_vec(random_values(&mut rng, 4 * 3 * 2 * 2), &[4, 3, 2, 2]).unwrap();
    let mut input_data = random_values(&mut rng, 3 * 5 * 6);
    // ReLU-style sparsity in the activations
    for v in input_data.iter_mut() {
        if *v < 0.0 {
            *v = 0.0;
        }
    }
    let inputs = Tensor::from_vec(input_data, &[3, 5, 6]).unwrap();

    let mut engine = create_sim_engine(3, 5);
    let on_device = engine.conv2d(&weights, &inputs).unwrap();
    let direct = conv2d_valid(&weights, &inputs).unwrap();

    assert_eq!(on_device.shape(), direct.shape());
    assert_allclose_f32(on_device.data(), direct.data(), 1e-5, 1e-5, "engine conv2d");
    assert!(engine.invocation_count() > 0);
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_kernel_larger_than_input() {
    let inputs = Tensor::from_slice(&INPUT_3X3, &[1, 3, 3]).unwrap();
    assert!(matches!(
        lower_inputs(&inputs, 4, 1),
        Err(Error::InvalidArgument { arg: "kernel", .. })
    ));
}

#[test]
fn test_wrong_ranks() {
    let flat = Tensor::from_slice(&INPUT_3X3, &[9]).unwrap();
    assert!(lower_inputs(&flat, 1, 1).is_err());
    assert!(lower_weights(&flat).is_err());
}

#[test]
fn test_empty_input_plane() {
    let inputs = Tensor::zeros(&[1, 0, 3]);
    assert!(lower_inputs(&inputs, 1, 1).is_err());
    let inputs = Tensor::zeros(&[0, 3, 3]);
    assert!(lower_inputs(&inputs, 1, 1).is_err());
}
