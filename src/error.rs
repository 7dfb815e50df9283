//! Error types for tilemv

use std::time::Duration;
use thiserror::Error;

/// Result type alias using tilemv's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tilemv operations
#[derive(Error, Debug)]
pub enum Error {
    /// Shape mismatch in an operation
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Device memory region cannot hold the tile layout
    #[error("Invalid buffer layout: {reason}")]
    BufferLayout {
        /// Description of the problem
        reason: String,
    },

    /// The block unit did not signal completion in time
    #[error("Block compute #{invocation} did not complete within {waited:?}")]
    DeviceTimeout {
        /// Invocation number (1-based, since the last reset) that timed out
        invocation: u64,
        /// How long the caller waited
        waited: Duration,
    },

    /// Failure opening or mapping the device
    #[error("Device I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration value
    #[error("Invalid config value {key}={value:?}: {reason}")]
    Config {
        /// The configuration key
        key: &'static str,
        /// The raw value
        value: String,
        /// Reason for rejection
        reason: String,
    },
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create a buffer layout error
    pub fn buffer_layout(reason: impl Into<String>) -> Self {
        Self::BufferLayout {
            reason: reason.into(),
        }
    }

    /// Whether this error came from the device handshake rather than the caller's input
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceTimeout { .. } | Self::Io(_))
    }
}
