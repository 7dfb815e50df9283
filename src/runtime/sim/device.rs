//! Simulated block device

use crate::config::EngineConfig;
use crate::error::Result;
use crate::runtime::handshake::{self, DEFAULT_POLL_TIMEOUT, TRIGGER};
use crate::runtime::{BlockDevice, TileBuffer, TileShape};
use std::time::Duration;

/// Status value the simulated unit leaves behind after finishing
const DONE: u32 = 0;

/// Host-memory model of a fixed-tile block compute unit
///
/// Computes exactly what the hardware does: the `M_blk` dot products of the
/// matrix rows with the full `V`-wide vector slot, written back over the start
/// of the data region. Nothing is cleared between invocations, so stale data
/// left by a previous tile is visible to the next one unless the caller
/// overwrites it.
///
/// # Example
///
/// ```
/// use tilemv::runtime::{BlockDevice, TileShape};
/// use tilemv::runtime::sim::SimDevice;
///
/// let mut dev = SimDevice::new(TileShape::new(2, 2).unwrap());
/// {
///     let (vector, matrix) = dev.staging();
///     vector.copy_from_slice(&[1.0, 2.0]);
///     matrix.copy_from_slice(&[1.0, 1.0, 3.0, 0.0]);
/// }
/// assert_eq!(dev.trigger_block_compute().unwrap(), &[3.0, 3.0]);
/// assert_eq!(dev.invocation_count(), 1);
/// ```
#[derive(Debug)]
pub struct SimDevice {
    buffer: TileBuffer<Vec<f32>>,
    status: u32,
    stalled: bool,
    poll_timeout: Duration,
    invocations: u64,
    scratch: Vec<f32>,
}

impl SimDevice {
    /// Create a zero-initialized simulated device
    pub fn new(tile: TileShape) -> Self {
        Self::with_fill(tile, 0.0)
    }

    /// Create a device whose data region starts out filled with `value`
    ///
    /// Useful for proving that no uninitialized slot leaks into a result
    /// (e.g. fill with `f32::NAN`).
    pub fn with_fill(tile: TileShape, value: f32) -> Self {
        Self {
            buffer: TileBuffer::filled(tile, value),
            status: DONE,
            stalled: false,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            invocations: 0,
            scratch: vec![0.0; tile.rows()],
        }
    }

    /// Create a device from engine configuration (tile and poll timeout)
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Ok(Self::new(config.tile()?).with_poll_timeout(config.poll_timeout()))
    }

    /// Set how long `trigger_block_compute` waits for completion
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Make the unit stop responding: triggers never complete
    pub fn set_stalled(&mut self, stalled: bool) {
        self.stalled = stalled;
    }

    /// Configured poll timeout
    pub fn poll_timeout(&self) -> Duration {
        self.poll_timeout
    }

    /// Read-only view of the whole data region layout
    pub fn buffer(&self) -> &TileBuffer<Vec<f32>> {
        &self.buffer
    }

    /// The unit's side of the handshake
    fn run_block(&mut self) {
        if self.stalled || self.status != TRIGGER {
            return;
        }
        let cols = self.buffer.tile().cols();
        let vector = self.buffer.vector();
        for (out, row) in self
            .scratch
            .iter_mut()
            .zip(self.buffer.matrix().chunks_exact(cols))
        {
            *out = row.iter().zip(vector).map(|(&m, &v)| m * v).sum();
        }
        self.buffer.result_mut().copy_from_slice(&self.scratch);
        self.status = DONE;
    }
}

impl BlockDevice for SimDevice {
    fn tile(&self) -> TileShape {
        self.buffer.tile()
    }

    fn staging(&mut self) -> (&mut [f32], &mut [f32]) {
        self.buffer.staging()
    }

    fn trigger_block_compute(&mut self) -> Result<&[f32]> {
        self.invocations += 1;
        self.status = TRIGGER;
        self.run_block();

        let status = self.status;
        handshake::wait_for_completion(|| status, self.poll_timeout, self.invocations)?;
        Ok(self.buffer.result())
    }

    fn reset(&mut self) {
        self.invocations = 0;
    }

    fn invocation_count(&self) -> u64 {
        self.invocations
    }

    fn name(&self) -> String {
        format!("sim({}x{})", self.tile().rows(), self.tile().cols())
    }
}
