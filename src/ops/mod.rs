//! Operations
//!
//! - [`tiling`]: nonzero mask, column chunks and row blocks
//! - [`TileEngine`]: tiled, zero-skipping matrix-vector multiply on a [`BlockDevice`](crate::runtime::BlockDevice)
//! - [`lowering`]: convolution to matrix product (im2col) and the direct reference convolution

mod conv;
pub mod conv_common;
pub mod lowering;
mod matvec;
pub mod tiling;

pub use conv_common::LoweringParams;
pub use lowering::{conv2d_valid, lower, lower_inputs, lower_weights};
pub use matvec::{SharedEngine, TileEngine};
pub use tiling::{ColumnChunk, ColumnChunks, NonzeroMask, RowBlock, RowBlocks};
