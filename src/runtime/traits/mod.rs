//! Runtime traits for block compute backends

pub mod device;

pub use device::BlockDevice;
