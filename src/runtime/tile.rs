//! Native tile dimensions of a block compute unit

use crate::error::{Error, Result};
use std::fmt;

/// Fixed block dimensions of the hardware: `rows` (M_blk) x `cols` (V)
///
/// One invocation multiplies a `rows x cols` matrix block by a `cols`-long
/// vector block and produces `rows` results. Both dimensions are positive
/// and never change for the lifetime of a device.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileShape {
    rows: usize,
    cols: usize,
}

impl TileShape {
    /// Create a tile shape, rejecting zero dimensions
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 {
            return Err(Error::invalid_argument("rows", "tile rows must be > 0"));
        }
        if cols == 0 {
            return Err(Error::invalid_argument("cols", "tile cols must be > 0"));
        }
        Ok(Self { rows, cols })
    }

    /// Matrix block height (M_blk)
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Vector block width (V)
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Floats in the matrix region (`rows * cols`)
    #[inline]
    pub fn matrix_len(&self) -> usize {
        self.rows * self.cols
    }

    /// Floats in the whole device data region: vector slot followed by matrix
    #[inline]
    pub fn buffer_len(&self) -> usize {
        (self.rows + 1) * self.cols
    }

    /// Bytes spanned by the device data region
    #[inline]
    pub fn buffer_bytes(&self) -> usize {
        self.buffer_len() * std::mem::size_of::<f32>()
    }
}

impl fmt::Debug for TileShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TileShape({}x{})", self.rows, self.cols)
    }
}
