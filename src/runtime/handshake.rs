//! Trigger/completion handshake shared by all block devices
//!
//! The host writes [`TRIGGER`] to a status word; the unit overwrites it with
//! any other value once the results are in the data region.

use crate::error::{Error, Result};
use std::time::{Duration, Instant};

/// Value written to the status register to start one block compute
pub const TRIGGER: u32 = 0x5555;

/// Default upper bound on one block compute
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(1);

/// Spin on `read_status` until it no longer reads [`TRIGGER`]
///
/// Fails with `DeviceTimeout` once `timeout` has elapsed. The status word is
/// always sampled at least once, so a zero timeout still succeeds against a
/// device that has already finished.
pub(crate) fn wait_for_completion(
    mut read_status: impl FnMut() -> u32,
    timeout: Duration,
    invocation: u64,
) -> Result<()> {
    let start = Instant::now();
    loop {
        if read_status() != TRIGGER {
            return Ok(());
        }
        let waited = start.elapsed();
        if waited >= timeout {
            tracing::warn!(invocation, ?waited, "block compute did not complete");
            return Err(Error::DeviceTimeout { invocation, waited });
        }
        std::hint::spin_loop();
    }
}
