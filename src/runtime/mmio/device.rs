//! Memory-mapped block device

use super::region::{MappedFloats, StatusRegister};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::runtime::handshake::{self, TRIGGER};
use crate::runtime::{BlockDevice, TileBuffer, TileShape};
use std::fs::OpenOptions;
use std::sync::atomic::{Ordering, fence};
use std::time::Duration;

/// Block compute unit reached through mapped physical memory
///
/// The data region (`(M_blk + 1) * V` floats: vector slot, then matrix) is
/// mapped at `data_addr`, the status register at `status_addr`. Both mappings
/// are released when the device is dropped.
#[derive(Debug)]
pub struct MmioDevice {
    buffer: TileBuffer<MappedFloats>,
    status: StatusRegister,
    poll_timeout: Duration,
    invocations: u64,
}

impl MmioDevice {
    /// Open `config.device_path` and map the data region and status register
    ///
    /// Fails with `Io` if the file cannot be opened or mapped and with
    /// `BufferLayout` if an address is not suitably aligned.
    pub fn open(config: &EngineConfig) -> Result<Self> {
        let tile = config.tile()?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device_path)?;

        let data = MappedFloats::map(&file, config.data_addr, tile.buffer_bytes())?;
        let status = StatusRegister::map(&file, config.status_addr)?;
        tracing::debug!(
            path = %config.device_path.display(),
            data_addr = config.data_addr,
            status_addr = config.status_addr,
            ?tile,
            "opened mmio block device"
        );

        Ok(Self {
            buffer: TileBuffer::new(tile, data)?,
            status,
            poll_timeout: config.poll_timeout(),
            invocations: 0,
        })
    }

    /// Configured poll timeout
    pub fn poll_timeout(&self) -> Duration {
        self.poll_timeout
    }
}

impl BlockDevice for MmioDevice {
    fn tile(&self) -> TileShape {
        self.buffer.tile()
    }

    fn staging(&mut self) -> (&mut [f32], &mut [f32]) {
        self.buffer.staging()
    }

    fn trigger_block_compute(&mut self) -> Result<&[f32]> {
        self.invocations += 1;
        // Volatile accesses are only ordered against each other. The staged
        // operands are plain stores, so they must be published before the
        // trigger, and the result loads must not be served from those stores
        // (the result aliases the vector slot) until completion is observed.
        fence(Ordering::SeqCst);
        self.status.write(TRIGGER);

        let status = &self.status;
        handshake::wait_for_completion(|| status.read(), self.poll_timeout, self.invocations)?;
        fence(Ordering::Acquire);
        Ok(self.buffer.result())
    }

    fn reset(&mut self) {
        self.invocations = 0;
    }

    fn invocation_count(&self) -> u64 {
        self.invocations
    }

    fn name(&self) -> String {
        format!("mmio({}x{})", self.tile().rows(), self.tile().cols())
    }
}
