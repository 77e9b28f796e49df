//! Record locator and patcher for InsydeFlash firmware update containers
//!
#![allow(clippy::cast_possible_truncation)] // Header fields are u32 by format
#![allow(clippy::doc_markdown)] // Signature names don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::return_self_not_must_use)] // Builder patterns
//! An InsydeFlash update image (`isflash.bin`) is a flat blob carrying
//! several sub-images. Each sub-image is a record: a 16-byte ASCII signature,
//! a little-endian `u32` capacity (`full_size`), a little-endian `u32` valid
//! length (`used_size`), then the payload bytes padded out to capacity.
//! There is no directory table; records are found by scanning for their
//! signature.
//!
//! # Supported Records
//!
//! - **`$_IFLASH_BIOSIMG`**: the BIOS flash image
//! - **`$_IFLASH_INI_IMG`**: `platforms.ini` flash utility configuration
//! - **`$_IFLASH_EC_IMG_`**: embedded controller firmware
//! - **`$_IFLASH_DRV_IMG`**: flash driver image
//! - **`$_IFLASH_BIOSCER`**: BIOS certificate
//!
//! # Operations
//!
//! - **Locate**: Boyer-Moore-Horspool signature search, first match wins
//! - **Extract**: copy `used_size` payload bytes to any [`std::io::Write`]
//! - **Inject**: compute a validated [`Patch`] that rewrites `used_size`
//!   and the payload in place; the caller writes it at `patch.offset`
//!
//! This crate performs no file I/O; it works on borrowed byte slices.
//!
//! # Example
//!
//! ```
//! use iflash_formats::{Container, ContainerBuilder, ImageKind, TailPolicy, plan_injection};
//!
//! let mut image = ContainerBuilder::new()
//!     .filler(64)
//!     .record(ImageKind::IniImage, 10, b"abcde")
//!     .build();
//!
//! let patch = {
//!     let container = Container::new(&image);
//!     let record = container.locate(ImageKind::IniImage)?;
//!     assert_eq!(record.offset, 64);
//!     plan_injection(&container, &record, b"XYZ", TailPolicy::LeaveStale)?
//! };
//! patch.apply(&mut image)?;
//!
//! let container = Container::new(&image);
//! let record = container.locate(ImageKind::IniImage)?;
//! let mut out = Vec::new();
//! container.extract(&record, &mut out)?;
//! assert_eq!(out, b"XYZ");
//! # Ok::<(), iflash_formats::IflashError>(())
//! ```

#![warn(missing_docs)]

pub mod builder;
/// Read-only container view, record location and extraction
pub mod container;
pub mod error;
pub mod header;
pub mod inject;
pub mod search;
pub mod tag;

// Test utilities module
#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
pub(crate) mod test_utils;

pub use builder::ContainerBuilder;
pub use container::{Container, Record, write_fully};
pub use error::{IflashError, Result};
pub use header::{HEADER_SIZE, RecordHeader};
pub use inject::{Patch, TailPolicy, plan_injection};
pub use search::{PatternSearcher, find_pattern};
pub use tag::{ImageKind, SIGNATURE_LENGTH};
