//! Two-level blocking for tiled matrix-vector products
//!
//! Columns are grouped into [`ColumnChunk`]s that each hold at most `V`
//! nonzero input entries. Zero entries are skipped but still consumed, so a
//! chunk may span many more than `V` raw columns. Rows are cut into
//! [`RowBlock`]s of `M_blk`. Every (chunk, row block) pair is one device
//! invocation.

use crate::runtime::TileShape;

/// Per-element nonzero flags of an input vector
///
/// Rebuilt for every multiplication; an entry is nonzero iff `value != 0.0`
/// (so `-0.0` counts as zero and NaN as nonzero).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NonzeroMask {
    flags: Vec<bool>,
    nnz: usize,
}

impl NonzeroMask {
    /// Classify every element of `values`
    pub fn from_values(values: &[f32]) -> Self {
        let flags: Vec<bool> = values.iter().map(|&v| v != 0.0).collect();
        let nnz = flags.iter().filter(|&&f| f).count();
        Self { flags, nnz }
    }

    /// Number of classified elements
    #[inline]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether the mask covers no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Number of nonzero elements
    #[inline]
    pub fn nnz(&self) -> usize {
        self.nnz
    }

    /// Raw flags
    #[inline]
    pub fn flags(&self) -> &[bool] {
        &self.flags
    }

    /// Whether element `i` is nonzero
    #[inline]
    pub fn is_nonzero(&self, i: usize) -> bool {
        self.flags[i]
    }

    /// Split the columns into chunks of at most `tile.cols()` nonzeros
    pub fn chunks(&self, tile: TileShape) -> ColumnChunks<'_> {
        ColumnChunks {
            mask: self,
            width: tile.cols(),
            pos: 0,
        }
    }
}

/// Contiguous raw column span holding at most `V` nonzero entries
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnChunk {
    /// First raw column
    pub start: usize,
    /// Raw columns consumed, zeros included
    pub len: usize,
    /// Nonzero columns within the span
    pub nnz: usize,
}

impl ColumnChunk {
    /// One past the last raw column
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Indices of the nonzero columns in the span, ascending
    pub fn nonzero_columns(self, mask: &NonzeroMask) -> impl Iterator<Item = usize> + '_ {
        (self.start..self.end()).filter(move |&c| mask.is_nonzero(c))
    }
}

/// Iterator over the [`ColumnChunk`]s of a mask
///
/// Each chunk starts where the previous one ended and extends until it has
/// collected `V` nonzeros (ending right after the last of them) or the input
/// runs out. An all-zero tail therefore becomes a single chunk with `nnz == 0`.
#[derive(Clone, Debug)]
pub struct ColumnChunks<'a> {
    mask: &'a NonzeroMask,
    width: usize,
    pos: usize,
}

impl Iterator for ColumnChunks<'_> {
    type Item = ColumnChunk;

    fn next(&mut self) -> Option<ColumnChunk> {
        let flags = self.mask.flags();
        if self.pos >= flags.len() {
            return None;
        }

        let start = self.pos;
        let mut nnz = 0;
        while self.pos < flags.len() && nnz < self.width {
            if flags[self.pos] {
                nnz += 1;
            }
            self.pos += 1;
        }

        Some(ColumnChunk {
            start,
            len: self.pos - start,
            nnz,
        })
    }
}

/// A run of at most `M_blk` consecutive output rows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowBlock {
    /// First output row
    pub start: usize,
    /// Real rows in the block; less than `M_blk` only for the last block
    pub len: usize,
}

impl RowBlock {
    /// One past the last output row
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Iterator over the [`RowBlock`]s covering `num_rows` output rows
#[derive(Clone, Debug)]
pub struct RowBlocks {
    num_rows: usize,
    height: usize,
    pos: usize,
}

impl RowBlocks {
    /// Cover `num_rows` rows with blocks of `tile.rows()`
    pub fn new(num_rows: usize, tile: TileShape) -> Self {
        Self {
            num_rows,
            height: tile.rows(),
            pos: 0,
        }
    }
}

impl Iterator for RowBlocks {
    type Item = RowBlock;

    fn next(&mut self) -> Option<RowBlock> {
        if self.pos >= self.num_rows {
            return None;
        }
        let block = RowBlock {
            start: self.pos,
            len: self.height.min(self.num_rows - self.pos),
        };
        self.pos += self.height;
        Some(block)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.num_rows.saturating_sub(self.pos).div_ceil(self.height);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RowBlocks {}
