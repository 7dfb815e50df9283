//! Aliased device data region
//!
//! The block unit reads its operands and writes its results through the same
//! memory. [`TileBuffer`] owns that single region and hands out two kinds of
//! view:
//!
//! ```text
//! storage: [ vector (V) | matrix row 0 (V) | ... | matrix row M_blk-1 (V) ]
//! input phase  -> staging(): (&mut vector, &mut matrix)
//! output phase -> result():  &storage[..M_blk]
//! ```
//!
//! The result view starts at offset 0, so it overlaps the vector slot (and the
//! head of the matrix when `M_blk > V`). Reading a result therefore destroys the
//! packed vector; it must be repacked before the next invocation.

use super::TileShape;
use crate::error::{Error, Result};

/// Single owned storage region with input-phase and output-phase views
#[derive(Debug)]
pub struct TileBuffer<S> {
    tile: TileShape,
    storage: S,
}

impl<S> TileBuffer<S>
where
    S: AsRef<[f32]> + AsMut<[f32]>,
{
    /// Wrap `storage`, which must hold at least `tile.buffer_len()` floats
    pub fn new(tile: TileShape, storage: S) -> Result<Self> {
        let len = storage.as_ref().len();
        if len < tile.buffer_len() {
            return Err(Error::buffer_layout(format!(
                "{:?} needs {} floats, storage holds {}",
                tile,
                tile.buffer_len(),
                len
            )));
        }
        Ok(Self { tile, storage })
    }

    /// Tile dimensions this buffer is laid out for
    #[inline]
    pub fn tile(&self) -> TileShape {
        self.tile
    }

    /// Input-phase views: `(vector slot, matrix region)`
    pub fn staging(&mut self) -> (&mut [f32], &mut [f32]) {
        let cols = self.tile.cols();
        let matrix_len = self.tile.matrix_len();
        let (vector, rest) = self.storage.as_mut()[..self.tile.buffer_len()].split_at_mut(cols);
        (vector, &mut rest[..matrix_len])
    }

    /// Read-only vector slot
    pub fn vector(&self) -> &[f32] {
        &self.storage.as_ref()[..self.tile.cols()]
    }

    /// Read-only matrix region
    pub fn matrix(&self) -> &[f32] {
        let cols = self.tile.cols();
        &self.storage.as_ref()[cols..cols + self.tile.matrix_len()]
    }

    /// Output-phase view: the `M_blk` results at the start of the region
    pub fn result(&self) -> &[f32] {
        &self.storage.as_ref()[..self.tile.rows()]
    }

    /// Mutable output-phase view, used by devices that write results in software
    pub fn result_mut(&mut self) -> &mut [f32] {
        let rows = self.tile.rows();
        &mut self.storage.as_mut()[..rows]
    }
}

impl TileBuffer<Vec<f32>> {
    /// Heap-backed region with every float set to `value`
    pub fn filled(tile: TileShape, value: f32) -> Self {
        Self {
            tile,
            storage: vec![value; tile.buffer_len()],
        }
    }
}
