//! Software block compute unit
//!
//! Models the hardware data region and status handshake in host memory so the
//! tile engine can run (and be tested) without a physical device.

mod device;

pub use device::SimDevice;
