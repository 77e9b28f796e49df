//! Builder for synthesizing container images

use crate::header::RecordHeader;
use crate::tag::ImageKind;

/// Byte used for filler regions between records
pub const FILLER_BYTE: u8 = 0xFF;

/// Byte used for reserved-but-unused record capacity
pub const PADDING_BYTE: u8 = 0xCC;

/// Builder for container images
///
/// Records are appended back to back, each followed by its full reserved
/// capacity. Useful for fixtures and for producing blank containers to
/// inject into.
#[derive(Debug, Clone, Default)]
pub struct ContainerBuilder {
    data: Vec<u8>,
}

impl ContainerBuilder {
    /// Create an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `len` filler bytes
    #[must_use]
    pub fn filler(mut self, len: usize) -> Self {
        self.data.resize(self.data.len() + len, FILLER_BYTE);
        self
    }

    /// Append raw bytes
    #[must_use]
    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    /// Append a record of `kind` with `full_size` capacity holding `payload`
    ///
    /// `used_size` is set to the payload length and the remaining capacity is
    /// padded. A payload longer than `full_size` is written in full, which
    /// produces a record violating the capacity invariant.
    #[must_use]
    pub fn record(self, kind: ImageKind, full_size: u32, payload: &[u8]) -> Self {
        let header = RecordHeader::new(kind, full_size, payload.len() as u32);
        self.raw_record(header, payload)
    }

    /// Append an arbitrary header followed by `payload`, padded to capacity
    #[must_use]
    pub fn raw_record(mut self, header: RecordHeader, payload: &[u8]) -> Self {
        self.data.extend_from_slice(&header.signature);
        self.data.extend_from_slice(&header.full_size.to_le_bytes());
        self.data.extend_from_slice(&header.used_size.to_le_bytes());
        self.data.extend_from_slice(payload);

        let padding = (header.full_size as usize).saturating_sub(payload.len());
        self.data.resize(self.data.len() + padding, PADDING_BYTE);
        self
    }

    /// Current length, i.e. the offset the next appended item will land at
    pub fn position(&self) -> usize {
        self.data.len()
    }

    /// Finish the image
    pub fn build(self) -> Vec<u8> {
        self.data
    }
}
