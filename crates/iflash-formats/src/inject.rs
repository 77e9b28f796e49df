//! In-place payload replacement
//!
//! Injection is split into a pure planning step that validates the request
//! and produces the exact bytes to write, and an effect step that writes
//! those bytes at an absolute offset. Nothing is written unless planning
//! succeeds, so a rejected injection leaves the container untouched.

use crate::container::{Container, Record};
use crate::error::{IflashError, Result};
use crate::header::HEADER_SIZE;

/// What happens to capacity bytes past the new payload
///
/// When a payload shrinks, the bytes between the new `used_size` and
/// `full_size` still hold the tail of the previous payload. Firmware flash
/// utilities only read `used_size` bytes, but some consumers hash or sign
/// the whole capacity region, so both behaviors are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TailPolicy {
    /// Leave stale bytes in place
    #[default]
    LeaveStale,
    /// Overwrite the rest of the capacity with zeros
    ZeroFill,
}

/// A validated write against a container: `bytes` go at `offset`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Absolute offset of the record header
    pub offset: usize,
    /// Encoded header followed by payload (and zero fill, if requested)
    pub bytes: Vec<u8>,
}

impl Patch {
    /// Absolute end (exclusive) of the patched region, saturating at
    /// `usize::MAX`
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.bytes.len())
    }

    /// Apply the patch to an in-memory copy of the container
    pub fn apply(&self, image: &mut [u8]) -> Result<()> {
        let image_len = image.len();
        let target = self
            .offset
            .checked_add(self.bytes.len())
            .and_then(|end| image.get_mut(self.offset..end))
            .ok_or_else(|| IflashError::RecordOutOfBounds {
                offset: self.offset,
                needed: self.bytes.len(),
                available: image_len.saturating_sub(self.offset),
            })?;
        target.copy_from_slice(&self.bytes);
        Ok(())
    }
}

/// Compute the write that replaces the payload of `record` with `payload`
///
/// Validates before producing anything:
/// - `payload.len()` must not exceed the record's `full_size`
/// - the record's full capacity must lie within the container
///
/// The new header keeps `full_size` and sets `used_size` to the payload
/// length.
pub fn plan_injection(
    container: &Container<'_>,
    record: &Record,
    payload: &[u8],
    tail: TailPolicy,
) -> Result<Patch> {
    let capacity = record.header.full_size;
    if payload.len() > capacity as usize {
        return Err(IflashError::CapacityExceeded {
            requested: payload.len(),
            capacity,
        });
    }

    let needed = HEADER_SIZE + capacity as usize;
    let in_bounds = record
        .offset
        .checked_add(needed)
        .is_some_and(|end| end <= container.len());
    if !in_bounds {
        return Err(IflashError::RecordOutOfBounds {
            offset: record.offset,
            needed,
            available: container.len().saturating_sub(record.offset),
        });
    }

    let header = record.header.with_used_size(payload.len() as u32);

    let region_len = match tail {
        TailPolicy::LeaveStale => payload.len(),
        TailPolicy::ZeroFill => capacity as usize,
    };
    let mut bytes = Vec::with_capacity(HEADER_SIZE + region_len);
    bytes.extend_from_slice(&header.encode()?);
    bytes.extend_from_slice(payload);
    bytes.resize(HEADER_SIZE + region_len, 0);

    Ok(Patch {
        offset: record.offset,
        bytes,
    })
}
