//! Typed views over mapped device memory

use crate::error::{Error, Result};
use memmap2::{MmapMut, MmapOptions};
use std::fs::File;

/// A mapped region reinterpreted as `f32` slots
#[derive(Debug)]
pub(crate) struct MappedFloats(MmapMut);

impl MappedFloats {
    /// Map `len_bytes` at physical offset `addr` of `file`
    pub(crate) fn map(file: &File, addr: u64, len_bytes: usize) -> Result<Self> {
        let map = map_region(file, addr, len_bytes)?;
        // validate once so the infallible AsRef/AsMut casts below hold
        bytemuck::try_cast_slice::<u8, f32>(&map[..]).map_err(|e| {
            Error::buffer_layout(format!(
                "data region at {:#x} ({} bytes) is not f32-addressable: {}",
                addr, len_bytes, e
            ))
        })?;
        Ok(Self(map))
    }
}

impl AsRef<[f32]> for MappedFloats {
    fn as_ref(&self) -> &[f32] {
        bytemuck::cast_slice(&self.0[..])
    }
}

impl AsMut<[f32]> for MappedFloats {
    fn as_mut(&mut self) -> &mut [f32] {
        bytemuck::cast_slice_mut(&mut self.0[..])
    }
}

/// A mapped 32-bit status register, accessed only with volatile loads/stores
#[derive(Debug)]
pub(crate) struct StatusRegister(MmapMut);

impl StatusRegister {
    pub(crate) fn map(file: &File, addr: u64) -> Result<Self> {
        if addr % std::mem::align_of::<u32>() as u64 != 0 {
            return Err(Error::buffer_layout(format!(
                "status register address {:#x} is not 4-byte aligned",
                addr
            )));
        }
        Ok(Self(map_region(file, addr, std::mem::size_of::<u32>())?))
    }

    pub(crate) fn read(&self) -> u32 {
        // SAFETY: the mapping is at least 4 bytes long and 4-byte aligned (checked in `map`)
        unsafe { std::ptr::read_volatile(self.0.as_ptr().cast::<u32>()) }
    }

    pub(crate) fn write(&mut self, value: u32) {
        // SAFETY: see `read`
        unsafe { std::ptr::write_volatile(self.0.as_mut_ptr().cast::<u32>(), value) }
    }
}

fn map_region(file: &File, addr: u64, len_bytes: usize) -> Result<MmapMut> {
    // SAFETY: device memory is owned by this process for the mapping's lifetime;
    // nothing else in the process maps the same physical range.
    let map = unsafe {
        MmapOptions::new()
            .offset(addr)
            .len(len_bytes)
            .map_mut(file)?
    };
    Ok(map)
}
