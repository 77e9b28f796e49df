//! Error types for the container tool.
//!
//! All errors use thiserror for consistent error handling across the codebase.

use iflash_formats::{IflashError, ImageKind};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by file-level container operations.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Failed to open a file
    #[error("Failed to open {path}: {source}")]
    Open {
        /// File that failed to open
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to read from a file
    #[error("Failed to read {path}: {source}")]
    Read {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: IflashError,
    },

    /// Failed to write to a file
    #[error("Failed to write {path}: {source}")]
    Write {
        /// File being written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: IflashError,
    },

    /// A record could not be located, extracted or injected
    #[error("{kind} record in {path}: {source}")]
    Record {
        /// Container file
        path: PathBuf,
        /// Record kind being processed
        kind: ImageKind,
        /// Underlying format error
        #[source]
        source: IflashError,
    },

    /// The on-disk header no longer matches the loaded copy
    #[error(
        "{path} changed on disk at offset {offset:#x} since it was loaded; refusing to write"
    )]
    StaleContainer {
        /// Container file
        path: PathBuf,
        /// Offset of the record header that was verified
        offset: usize,
    },

    /// A failed write could not be undone; the file may be corrupt
    #[error(
        "Failed to write {path} at offset {offset:#x} ({source}) and could not restore it: {reason}"
    )]
    RollbackFailed {
        /// File being written
        path: PathBuf,
        /// Start of the region that was being patched
        offset: u64,
        /// Error from the original write
        #[source]
        source: IflashError,
        /// Why the original bytes could not be restored
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Container file is missing
    #[error("Container file not found: {0}")]
    ContainerNotFound(PathBuf),

    /// Inject input file is missing
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    /// Output directory is missing or not a directory
    #[error("Output directory not found: {0}")]
    OutputDirNotFound(PathBuf),

    /// A single output file was given for several record kinds
    #[error("--output requires exactly one --kind, got {0}")]
    OutputNeedsSingleKind(usize),
}

/// Result type alias for tool operations
pub type Result<T> = std::result::Result<T, ToolError>;

impl ToolError {
    /// The underlying format error, if there is one
    pub fn format_error(&self) -> Option<&IflashError> {
        match self {
            Self::Read { source, .. }
            | Self::Write { source, .. }
            | Self::Record { source, .. }
            | Self::RollbackFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_error_message() {
        let err = ToolError::Record {
            path: PathBuf::from("isflash.bin"),
            kind: ImageKind::IniImage,
            source: IflashError::CapacityExceeded {
                requested: 300,
                capacity: 256,
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("$_IFLASH_INI_IMG"));
        assert!(msg.contains("isflash.bin"));
        assert!(msg.contains("300"));
        assert!(matches!(
            err.format_error(),
            Some(IflashError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_config_error_conversion() {
        let err: ToolError = ConfigError::OutputNeedsSingleKind(3).into();
        assert!(err.to_string().contains("exactly one"));
        assert!(err.format_error().is_none());
    }

    #[test]
    fn test_stale_container_message() {
        let err = ToolError::StaleContainer {
            path: PathBuf::from("a.bin"),
            offset: 0x200,
        };
        assert!(err.to_string().contains("0x200"));
    }

    #[test]
    fn test_rollback_failed_message() {
        let err = ToolError::RollbackFailed {
            path: PathBuf::from("isflash.bin"),
            offset: 0x40,
            source: IflashError::ShortWrite {
                expected: 27,
                actual: 24,
            },
            reason: "disk full".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("0x40"));
        assert!(msg.contains("disk full"));
        assert!(matches!(
            err.format_error(),
            Some(IflashError::ShortWrite { .. })
        ));
    }
}
