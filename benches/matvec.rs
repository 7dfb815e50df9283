#![allow(dead_code)]

use fluxbench::{Bencher, flux};
use std::hint::black_box;

use tilemv::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn dense_vec(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| ((i * 17 + 3) % 1000) as f32 / 1000.0)
        .collect()
}

/// Every `stride`-th entry nonzero
fn sparse_vec(n: usize, stride: usize) -> Vec<f32> {
    (0..n)
        .map(|i| if i % stride == 0 { 1.0 + i as f32 / n as f32 } else { 0.0 })
        .collect()
}

fn engine(tile: usize) -> TileEngine<SimDevice> {
    TileEngine::new(SimDevice::new(TileShape::new(tile, tile).unwrap()))
}

// ---------------------------------------------------------------------------
// Dense input, square matrices (parameterized)
// ---------------------------------------------------------------------------

#[flux::bench(group = "matvec_dense_tile64", args = [128, 512, 1024])]
fn tiled_matvec_dense(b: &mut Bencher, size: usize) {
    let mut engine = engine(64);
    let a = dense_vec(size * size);
    let x = dense_vec(size);
    let mut y = vec![0.0f32; size];
    b.iter(|| {
        engine.multiply(&a, &x, &mut y, size, size).unwrap();
        black_box(&y);
    });
}

// ---------------------------------------------------------------------------
// Zero skipping: same shape, decreasing density
// ---------------------------------------------------------------------------

#[flux::bench(group = "matvec_sparse_1024", args = [1, 4, 16, 64])]
fn tiled_matvec_sparse(b: &mut Bencher, stride: usize) {
    let size = 1024;
    let mut engine = engine(64);
    let a = dense_vec(size * size);
    let x = sparse_vec(size, stride);
    let mut y = vec![0.0f32; size];
    b.iter(|| {
        engine.multiply(&a, &x, &mut y, size, size).unwrap();
        black_box(&y);
    });
}

fn main() {
    fluxbench_cli::run().unwrap();
}
