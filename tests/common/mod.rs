//! Common test utilities
#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tilemv::ops::{NonzeroMask, RowBlocks, TileEngine};
use tilemv::runtime::TileShape;
use tilemv::runtime::sim::SimDevice;

/// Create a simulated engine with an `rows x cols` tile
pub fn create_sim_engine(rows: usize, cols: usize) -> TileEngine<SimDevice> {
    TileEngine::new(SimDevice::new(TileShape::new(rows, cols).unwrap()))
}

/// Assert two f32 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f32(a: &[f32], b: &[f32], rtol: f32, atol: f32, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// `matrix * x` accumulated in f64
pub fn reference_matvec(matrix: &[f32], x: &[f32], num_outputs: usize) -> Vec<f32> {
    let num_inputs = x.len();
    (0..num_outputs)
        .map(|r| {
            matrix[r * num_inputs..(r + 1) * num_inputs]
                .iter()
                .zip(x)
                .map(|(&a, &b)| a as f64 * b as f64)
                .sum::<f64>() as f32
        })
        .collect()
}

/// Invocations the engine must issue for `x` on `tile`
pub fn expected_invocations(x: &[f32], num_outputs: usize, tile: TileShape) -> u64 {
    let chunks = NonzeroMask::from_values(x).chunks(tile).count();
    (chunks * RowBlocks::new(num_outputs, tile).len()) as u64
}

/// Deterministic values in [-1, 1)
pub fn random_values(rng: &mut StdRng, len: usize) -> Vec<f32> {
    (0..len).map(|_| rng.random_range(-1.0f32..1.0)).collect()
}

/// Random vector where each entry is zero with probability `1 - density`
pub fn sparse_vector(rng: &mut StdRng, len: usize, density: f64) -> Vec<f32> {
    (0..len)
        .map(|_| {
            if rng.random_bool(density) {
                rng.random_range(-1.0f32..1.0)
            } else {
                0.0
            }
        })
        .collect()
}

/// Seeded RNG
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
