//! Error types for the simulator.
//!
//! Everything here is a configuration or input problem detected before (or
//! between) translations. Broken allocator invariants panic instead.

use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Result type alias for simulator operations
pub type Result<T> = std::result::Result<T, VmError>;

#[derive(Error, Debug)]
pub enum VmError {
    /// Backing store could not be opened or mapped
    #[error("Failed to open backing store {path}: {source}")]
    BackingStoreOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backing store does not cover the whole logical address space
    #[error("Backing store holds {len} bytes, expected at least {expected}")]
    BackingStoreTooSmall { len: usize, expected: usize },

    /// Address trace could not be opened
    #[error("Failed to open address trace {path}: {source}")]
    TraceOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Trace line is not a non-negative integer
    #[error("Line {line}: invalid logical address '{text}'")]
    MalformedAddress { line: usize, text: String },

    /// Trace line parses but lies outside the logical address space
    #[error("Line {line}: logical address {value} is outside the address space")]
    AddressOutOfRange { line: usize, value: u64 },

    /// Unknown replacement policy selector
    #[error("Invalid replacement policy '{0}' (expected 0, 1, fifo or lru)")]
    InvalidPolicy(String),

    /// IO error while reading input
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VmError {
    /// Get exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::InvalidPolicy(_) | Self::BackingStoreTooSmall { .. } => ExitCode::from(2),
            Self::BackingStoreOpen { .. } | Self::TraceOpen { .. } => ExitCode::from(3),
            Self::MalformedAddress { .. } | Self::AddressOutOfRange { .. } => ExitCode::from(4),
            Self::Io(_) => ExitCode::from(7),
        }
    }

    /// Whether this error concerns a single trace record rather than the run setup
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedAddress { .. } | Self::AddressOutOfRange { .. }
        )
    }
}
