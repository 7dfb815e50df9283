//! # tilemv
//!
//! **Sparsity-aware tiled matrix-vector offload for fixed-tile compute units.**
//!
//! Many accelerators (FPGA matrix engines, systolic blocks) can only multiply
//! one `M_blk x V` matrix block by one `V`-long vector block per invocation.
//! tilemv drives such a unit through products of any size:
//!
//! - **Two-level tiling**: the input is cut into column chunks, the output
//!   into row blocks of `M_blk`; partial sums are accumulated on the host.
//! - **Zero skipping**: zero entries of the input vector are compacted away
//!   before transfer, so each invocation carries up to `V` useful operands.
//! - **Convolution lowering**: weights and activations are rearranged
//!   (im2col) so a convolution becomes a sequence of matrix-vector products.
//! - **Bounded handshake**: every device invocation has a configurable timeout.
//!
//! ## Quick Start
//!
//! ```rust
//! use tilemv::prelude::*;
//!
//! let device = SimDevice::new(TileShape::new(4, 4)?);
//! let mut engine = TileEngine::new(device);
//!
//! let a = Tensor::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3])?;
//! let y = engine.matvec(&a, &[1.0, 0.0, -1.0])?;
//! assert_eq!(y, vec![-2.0, -2.0]);
//! # Ok::<(), tilemv::error::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): parallel patch extraction in the lowering transform
//! - `mmio`: memory-mapped hardware backend (`/dev/mem`), unix only

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod error;
pub mod ops;
pub mod runtime;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::error::{Error, Result};
    pub use crate::ops::{
        SharedEngine, TileEngine, conv2d_valid, lower, lower_inputs, lower_weights,
    };
    pub use crate::runtime::sim::SimDevice;
    pub use crate::runtime::{BlockDevice, TileShape};
    pub use crate::tensor::Tensor;

    #[cfg(all(unix, feature = "mmio"))]
    pub use crate::runtime::mmio::MmioDevice;
}
