//! Tiled, zero-skipping matrix-vector multiply on a block device

use super::tiling::{NonzeroMask, RowBlock, RowBlocks};
use crate::error::{Error, Result};
use crate::runtime::{BlockDevice, TileShape};
use crate::tensor::Tensor;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Drives a [`BlockDevice`] to compute arbitrarily large `y = A x`
///
/// The input is split into column chunks holding at most `V` nonzero entries
/// each; zero entries of `x` are never sent to the device. For every chunk the
/// output rows are visited once in blocks of `M_blk`, and each block costs
/// exactly one device invocation whose results are added into `y`.
///
/// # Example
///
/// ```
/// use tilemv::ops::TileEngine;
/// use tilemv::runtime::TileShape;
/// use tilemv::runtime::sim::SimDevice;
///
/// let mut engine = TileEngine::new(SimDevice::new(TileShape::new(2, 2).unwrap()));
/// let a = [1.0, 2.0, 3.0,
///          4.0, 5.0, 6.0];
/// let x = [1.0, 0.0, 2.0];
/// let mut y = [0.0; 2];
/// engine.multiply(&a, &x, &mut y, 3, 2).unwrap();
/// assert_eq!(y, [7.0, 16.0]);
/// assert_eq!(engine.invocation_count(), 1);
/// ```
#[derive(Debug)]
pub struct TileEngine<D> {
    device: D,
    // per-chunk compaction, reused across calls
    packed_cols: Vec<usize>,
    packed_values: Vec<f32>,
}

impl<D: BlockDevice> TileEngine<D> {
    /// Take ownership of `device`
    pub fn new(device: D) -> Self {
        let cols = device.tile().cols();
        Self {
            device,
            packed_cols: Vec::with_capacity(cols),
            packed_values: Vec::with_capacity(cols),
        }
    }

    /// Native tile of the underlying device
    pub fn tile(&self) -> TileShape {
        self.device.tile()
    }

    /// Borrow the device
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Mutably borrow the device
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Release the device
    pub fn into_device(self) -> D {
        self.device
    }

    /// Zero the device's invocation counter
    pub fn reset(&mut self) {
        self.device.reset();
    }

    /// Device invocations since the last reset
    pub fn invocation_count(&self) -> u64 {
        self.device.invocation_count()
    }

    /// Compute `output[..num_outputs] = matrix * input`
    ///
    /// `matrix` is row-major `num_outputs x num_inputs` and `input` has
    /// `num_inputs` elements; both must match exactly. `output` needs at least
    /// `num_outputs` slots; anything past that is left untouched.
    ///
    /// The first `num_outputs` outputs are zeroed before any device work, so
    /// when either dimension is 0 the call issues no invocations and only
    /// clears them. On a device error the call aborts immediately and the
    /// output contents are unspecified.
    pub fn multiply(
        &mut self,
        matrix: &[f32],
        input: &[f32],
        output: &mut [f32],
        num_inputs: usize,
        num_outputs: usize,
    ) -> Result<()> {
        validate_operands(matrix, input, output, num_inputs, num_outputs)?;

        let output = &mut output[..num_outputs];
        output.fill(0.0);
        if num_inputs == 0 || num_outputs == 0 {
            return Ok(());
        }

        let tile = self.device.tile();
        let mask = NonzeroMask::from_values(input);
        let first_invocation = self.device.invocation_count();

        for chunk in mask.chunks(tile) {
            tracing::trace!(start = chunk.start, len = chunk.len, nnz = chunk.nnz, "column chunk");

            self.packed_cols.clear();
            self.packed_cols.extend(chunk.nonzero_columns(&mask));
            self.packed_values.clear();
            self.packed_values
                .extend(self.packed_cols.iter().map(|&c| input[c]));

            for block in RowBlocks::new(num_outputs, tile) {
                {
                    let (vector, tile_matrix) = self.device.staging();
                    pack_vector(vector, &self.packed_values);
                    pack_matrix(
                        tile_matrix,
                        tile.cols(),
                        matrix,
                        num_inputs,
                        block,
                        &self.packed_cols,
                    );
                }

                let result = self.device.trigger_block_compute()?;
                for (out, &partial) in output[block.start..block.end()].iter_mut().zip(result) {
                    *out += partial;
                }
            }
        }

        tracing::debug!(
            num_inputs,
            num_outputs,
            nnz = mask.nnz(),
            invocations = self.device.invocation_count() - first_invocation,
            device = %self.device.name(),
            "tiled matvec complete"
        );
        Ok(())
    }

    /// Multiply a 2D tensor `[rows, cols]` by `input`, returning a fresh output
    pub fn matvec(&mut self, matrix: &Tensor, input: &[f32]) -> Result<Vec<f32>> {
        let (rows, cols) = matrix.dims2("matvec")?;
        let mut output = vec![0.0; rows];
        self.multiply(matrix.data(), input, &mut output, cols, rows)?;
        Ok(output)
    }
}

/// Copy the compacted nonzero values into the vector slot, zeroing the tail
fn pack_vector(dst: &mut [f32], values: &[f32]) {
    let (head, tail) = dst.split_at_mut(values.len());
    head.copy_from_slice(values);
    tail.fill(0.0);
}

/// Gather the nonzero columns of `block`'s rows into the device matrix
///
/// Columns past the packed width and rows past `block.len` are zeroed so no
/// residue from an earlier tile reaches the unit.
fn pack_matrix(
    dst: &mut [f32],
    width: usize,
    matrix: &[f32],
    num_inputs: usize,
    block: RowBlock,
    cols: &[usize],
) {
    for (r, dst_row) in dst.chunks_exact_mut(width).enumerate() {
        if r >= block.len {
            dst_row.fill(0.0);
            continue;
        }
        let row_start = (block.start + r) * num_inputs;
        let src_row = &matrix[row_start..row_start + num_inputs];
        let (head, tail) = dst_row.split_at_mut(cols.len());
        for (d, &c) in head.iter_mut().zip(cols) {
            *d = src_row[c];
        }
        tail.fill(0.0);
    }
}

fn validate_operands(
    matrix: &[f32],
    input: &[f32],
    output: &[f32],
    num_inputs: usize,
    num_outputs: usize,
) -> Result<()> {
    let matrix_len = num_inputs
        .checked_mul(num_outputs)
        .ok_or_else(|| Error::invalid_argument("matrix", "num_outputs * num_inputs overflows"))?;
    if matrix.len() != matrix_len {
        return Err(Error::shape_mismatch(&[num_outputs, num_inputs], &[matrix.len()]));
    }
    if input.len() != num_inputs {
        return Err(Error::shape_mismatch(&[num_inputs], &[input.len()]));
    }
    if output.len() < num_outputs {
        return Err(Error::invalid_argument(
            "output",
            format!(
                "needs at least {} slots, got {}",
                num_outputs,
                output.len()
            ),
        ));
    }
    Ok(())
}

/// A [`TileEngine`] behind a mutex, cloneable across threads
///
/// Every operation holds the lock for the whole call, so two callers can
/// never interleave buffer writes with each other's in-flight invocation.
#[derive(Debug)]
pub struct SharedEngine<D> {
    inner: Arc<Mutex<TileEngine<D>>>,
}

impl<D> Clone for SharedEngine<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: BlockDevice> SharedEngine<D> {
    /// Wrap `engine`
    pub fn new(engine: TileEngine<D>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Serialized [`TileEngine::multiply`]
    pub fn multiply(
        &self,
        matrix: &[f32],
        input: &[f32],
        output: &mut [f32],
        num_inputs: usize,
        num_outputs: usize,
    ) -> Result<()> {
        self.inner
            .lock()
            .multiply(matrix, input, output, num_inputs, num_outputs)
    }

    /// Serialized [`TileEngine::matvec`]
    pub fn matvec(&self, matrix: &Tensor, input: &[f32]) -> Result<Vec<f32>> {
        self.inner.lock().matvec(matrix, input)
    }

    /// Invocations since the last reset
    pub fn invocation_count(&self) -> u64 {
        self.inner.lock().invocation_count()
    }

    /// Hold the engine for a sequence of operations
    pub fn lock(&self) -> MutexGuard<'_, TileEngine<D>> {
        self.inner.lock()
    }
}
