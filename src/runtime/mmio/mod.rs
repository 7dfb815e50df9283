//! Memory-mapped block compute unit
//!
//! Drives a physical unit whose data region and status register are exposed
//! through a memory device file (typically `/dev/mem`). Only built on unix
//! with the `mmio` feature.

mod device;
mod region;

pub use device::MmioDevice;
