//! Trait for fixed-tile block compute units

use crate::error::Result;
use crate::runtime::TileShape;

/// A hardware (or simulated) unit that multiplies one `M_blk x V` matrix
/// block by one `V`-long vector block per invocation
///
/// Implementations own the device data region for their whole lifetime.
/// The region is shared between operands and results: the slice returned by
/// [`trigger_block_compute`](BlockDevice::trigger_block_compute) aliases the
/// staging buffers, which the borrow on `&mut self` makes explicit. Callers
/// must repack both staging buffers before every invocation.
///
/// A device is not meant to be shared between threads without external
/// locking; see [`SharedEngine`](crate::ops::SharedEngine).
pub trait BlockDevice {
    /// Native tile dimensions
    fn tile(&self) -> TileShape;

    /// Input-phase views: `(vector slot of V floats, row-major M_blk x V matrix)`
    fn staging(&mut self) -> (&mut [f32], &mut [f32]);

    /// Writable vector slot
    fn vector_buffer(&mut self) -> &mut [f32] {
        self.staging().0
    }

    /// Writable matrix region
    fn matrix_buffer(&mut self) -> &mut [f32] {
        self.staging().1
    }

    /// Run one block compute and return its `M_blk` results
    ///
    /// Blocks until the unit signals completion or the device's poll timeout
    /// elapses (`Error::DeviceTimeout`). The invocation is counted either way.
    fn trigger_block_compute(&mut self) -> Result<&[f32]>;

    /// Zero the invocation counter; buffers are left untouched
    fn reset(&mut self);

    /// Invocations issued since construction or the last [`reset`](BlockDevice::reset)
    fn invocation_count(&self) -> u64;

    /// Human-readable name
    fn name(&self) -> String {
        format!("BlockDevice({:?})", self.tile())
    }
}
