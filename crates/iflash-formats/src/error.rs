//! Error types for container record operations

use crate::tag::ImageKind;
use thiserror::Error;

/// Errors that can occur when locating, reading or patching container records
#[derive(Debug, Error)]
pub enum IflashError {
    /// The requested record signature is absent from the container
    #[error("{0} signature not found in container")]
    NotFound(ImageKind),

    /// A header or declared payload extends past the end of the container
    #[error(
        "Record at offset {offset:#x} needs {needed} bytes, only {available} available in container"
    )]
    RecordOutOfBounds {
        /// Absolute offset of the record header
        offset: usize,
        /// Bytes required from `offset` onward
        needed: usize,
        /// Bytes actually present from `offset` onward
        available: usize,
    },

    /// Payload length is larger than the record's reserved capacity
    #[error("Payload size {requested} exceeds record capacity {capacity}")]
    CapacityExceeded {
        /// Requested payload length
        requested: usize,
        /// The record's `full_size`
        capacity: u32,
    },

    /// A reader returned fewer bytes than requested
    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead {
        /// Bytes requested
        expected: usize,
        /// Bytes delivered
        actual: usize,
    },

    /// A writer accepted fewer bytes than requested
    #[error("Short write: expected {expected} bytes, wrote {actual}")]
    ShortWrite {
        /// Bytes requested
        expected: usize,
        /// Bytes accepted
        actual: usize,
    },

    /// Degenerate arguments such as an empty search pattern
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Binary header decode/encode error
    #[error("Binary parsing error: {0}")]
    BinRead(String),

    /// IO error from a sink or source
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<binrw::Error> for IflashError {
    fn from(e: binrw::Error) -> Self {
        Self::BinRead(e.to_string())
    }
}

/// Result type alias for container record operations
pub type Result<T> = std::result::Result<T, IflashError>;
