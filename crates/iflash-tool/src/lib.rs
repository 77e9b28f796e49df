//! InsydeFlash container tool.
//!
//! File-level front end for [`iflash_formats`]: loads an update container
//! from disk, extracts record payloads to standalone files and writes
//! replacement payloads back into the container in place.
//!
//! # Architecture
//!
//! - `io`: whole-file reads and positioned writes
//! - `container_file`: a loaded container bound to its backing file
//! - `config`: command-line and environment configuration
//! - `commands`: `list`, `extract` and `inject` workflows
//!
//! # Example
//!
//! ```no_run
//! use iflash_tool::ContainerFile;
//! use iflash_formats::{ImageKind, TailPolicy};
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut file = ContainerFile::open("isflash.bin")?;
//!     file.extract_to(ImageKind::IniImage, Path::new("platforms.ini"))?;
//!     file.inject_from(
//!         ImageKind::IniImage,
//!         Path::new("platforms.ini"),
//!         TailPolicy::LeaveStale,
//!     )?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

// Module declarations
pub mod commands;
pub mod config;
pub mod container_file;
pub mod error;
pub mod io;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-exports for public API
pub use config::{Cli, Command, LogLevel};
pub use container_file::{ContainerFile, Extracted, Injected};
pub use error::{ConfigError, ToolError};
