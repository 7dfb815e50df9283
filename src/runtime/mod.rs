//! Block compute backends
//!
//! This module defines the [`BlockDevice`] trait, the contract the tile engine
//! needs from a fixed-tile compute unit, and provides implementations for a
//! software model and for memory-mapped hardware.
//!
//! # Architecture
//!
//! ```text
//! BlockDevice (one fixed M_blk x V tile)
//! ├── TileShape   (native block dimensions)
//! ├── TileBuffer  (single data region: staging views in, result view out)
//! └── handshake   (trigger word + bounded completion poll)
//!
//! sim::SimDevice   host-memory model, always available
//! mmio::MmioDevice /dev/mem mapping, `mmio` feature on unix
//! ```

mod buffer;
pub(crate) mod handshake;
mod tile;
pub mod traits;

pub mod sim;

#[cfg(all(unix, feature = "mmio"))]
pub mod mmio;

pub use buffer::TileBuffer;
pub use handshake::{DEFAULT_POLL_TIMEOUT, TRIGGER};
pub use tile::TileShape;
pub use traits::BlockDevice;
