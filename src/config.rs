//! Engine configuration
//!
//! Configuration can be built in code, deserialized with serde (it is a plain
//! data struct), or read from `TILEMV_*` environment variables:
//!
//! | Variable | Field | Default |
//! |---|---|---|
//! | `TILEMV_TILE_ROWS` | `tile_rows` (M_blk) | 64 |
//! | `TILEMV_TILE_COLS` | `tile_cols` (V) | 64 |
//! | `TILEMV_POLL_TIMEOUT_MS` | `poll_timeout_ms` | 1000 |
//! | `TILEMV_DEVICE_PATH` | `device_path` | `/dev/mem` |
//! | `TILEMV_DATA_ADDR` | `data_addr` | 0 |
//! | `TILEMV_STATUS_ADDR` | `status_addr` | 0 |
//!
//! Addresses accept decimal or `0x`-prefixed hex.

use crate::error::{Error, Result};
use crate::runtime::TileShape;
use crate::runtime::handshake::DEFAULT_POLL_TIMEOUT;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variables understood by [`EngineConfig::from_env`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnvVar {
    /// `TILEMV_TILE_ROWS`
    TileRows,
    /// `TILEMV_TILE_COLS`
    TileCols,
    /// `TILEMV_POLL_TIMEOUT_MS`
    PollTimeoutMs,
    /// `TILEMV_DEVICE_PATH`
    DevicePath,
    /// `TILEMV_DATA_ADDR`
    DataAddr,
    /// `TILEMV_STATUS_ADDR`
    StatusAddr,
}

impl EnvVar {
    /// Every variable, in table order
    pub const ALL: [EnvVar; 6] = [
        EnvVar::TileRows,
        EnvVar::TileCols,
        EnvVar::PollTimeoutMs,
        EnvVar::DevicePath,
        EnvVar::DataAddr,
        EnvVar::StatusAddr,
    ];

    /// Canonical environment variable name
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            EnvVar::TileRows => "TILEMV_TILE_ROWS",
            EnvVar::TileCols => "TILEMV_TILE_COLS",
            EnvVar::PollTimeoutMs => "TILEMV_POLL_TIMEOUT_MS",
            EnvVar::DevicePath => "TILEMV_DEVICE_PATH",
            EnvVar::DataAddr => "TILEMV_DATA_ADDR",
            EnvVar::StatusAddr => "TILEMV_STATUS_ADDR",
        }
    }
}

/// Tile geometry, handshake timeout and device location
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Matrix block height (M_blk)
    pub tile_rows: usize,
    /// Vector block width (V)
    pub tile_cols: usize,
    /// Upper bound on one block compute, in milliseconds
    pub poll_timeout_ms: u64,
    /// Memory device file to map
    pub device_path: PathBuf,
    /// Physical address of the data region
    pub data_addr: u64,
    /// Physical address of the status register
    pub status_addr: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tile_rows: 64,
            tile_cols: 64,
            poll_timeout_ms: DEFAULT_POLL_TIMEOUT.as_millis() as u64,
            device_path: PathBuf::from("/dev/mem"),
            data_addr: 0,
            status_addr: 0,
        }
    }
}

impl EngineConfig {
    /// Load from the process environment, keeping defaults for unset variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (same keys as [`from_env`](Self::from_env))
    pub fn from_lookup(mut lookup: impl FnMut(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        for var in EnvVar::ALL {
            let Some(raw) = lookup(var.key()) else {
                continue;
            };
            let value = raw.trim();
            match var {
                EnvVar::TileRows => config.tile_rows = parse_usize(var, value)?,
                EnvVar::TileCols => config.tile_cols = parse_usize(var, value)?,
                EnvVar::PollTimeoutMs => config.poll_timeout_ms = parse_u64(var, value)?,
                EnvVar::DevicePath => config.device_path = PathBuf::from(value),
                EnvVar::DataAddr => config.data_addr = parse_u64(var, value)?,
                EnvVar::StatusAddr => config.status_addr = parse_u64(var, value)?,
            }
        }
        Ok(config)
    }

    /// Validated tile shape
    pub fn tile(&self) -> Result<TileShape> {
        TileShape::new(self.tile_rows, self.tile_cols)
    }

    /// Poll timeout as a `Duration`
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}

fn parse_u64(var: EnvVar, value: &str) -> Result<u64> {
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse::<u64>(),
    };
    parsed.map_err(|e| Error::Config {
        key: var.key(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_usize(var: EnvVar, value: &str) -> Result<usize> {
    let parsed = parse_u64(var, value)?;
    usize::try_from(parsed).map_err(|e| Error::Config {
        key: var.key(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}
