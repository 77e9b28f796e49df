//! Record header parsing and building
//!
//! Every record starts with a 24-byte little-endian header:
//!
//! ```text
//! offset  size  field
//! 0       16    signature
//! 16      4     full_size  (reserved payload capacity)
//! 20      4     used_size  (valid payload bytes)
//! ```

use crate::error::{IflashError, Result};
use crate::tag::{ImageKind, SIGNATURE_LENGTH};
use binrw::io::Cursor;
use binrw::{BinRead, BinWrite};

/// Size of the encoded header in bytes
pub const HEADER_SIZE: usize = SIGNATURE_LENGTH + 4 + 4;

/// Decoded record header
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct RecordHeader {
    /// Record signature, one of the known [`ImageKind`] signatures
    pub signature: [u8; SIGNATURE_LENGTH],

    /// Payload capacity reserved when the container was built
    pub full_size: u32,

    /// Number of payload bytes currently valid
    pub used_size: u32,
}

impl RecordHeader {
    /// Create a header for `kind`
    pub fn new(kind: ImageKind, full_size: u32, used_size: u32) -> Self {
        Self {
            signature: *kind.signature(),
            full_size,
            used_size,
        }
    }

    /// Decode a header from the first [`HEADER_SIZE`] bytes of `bytes`
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(IflashError::RecordOutOfBounds {
                offset: 0,
                needed: HEADER_SIZE,
                available: bytes.len(),
            });
        }

        let mut cursor = Cursor::new(&bytes[..HEADER_SIZE]);
        Ok(Self::read(&mut cursor)?)
    }

    /// Encode the header to its on-disk representation
    pub fn encode(&self) -> Result<[u8; HEADER_SIZE]> {
        let mut out = [0u8; HEADER_SIZE];
        let mut cursor = Cursor::new(&mut out[..]);
        self.write(&mut cursor)?;
        Ok(out)
    }

    /// Copy of this header with only `used_size` replaced
    #[must_use]
    pub fn with_used_size(self, used_size: u32) -> Self {
        Self { used_size, ..self }
    }

    /// The kind named by the signature, if it is a known one
    pub fn kind(&self) -> Option<ImageKind> {
        ImageKind::from_signature(&self.signature)
    }

    /// Check the capacity invariant `used_size <= full_size`
    pub fn validate(&self) -> Result<()> {
        if self.used_size > self.full_size {
            return Err(IflashError::CapacityExceeded {
                requested: self.used_size as usize,
                capacity: self.full_size,
            });
        }
        Ok(())
    }
}
