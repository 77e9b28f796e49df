//! Read-only view over a loaded container image

use crate::error::{IflashError, Result};
use crate::header::{HEADER_SIZE, RecordHeader};
use crate::search::PatternSearcher;
use crate::tag::ImageKind;
use std::io::{ErrorKind, Write};

/// Borrowed view of a whole container image
///
/// The view never allocates or copies the image; records located through it
/// carry absolute offsets into the borrowed bytes.
#[derive(Debug, Clone, Copy)]
pub struct Container<'a> {
    data: &'a [u8],
}

/// A record located inside a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    /// Kind whose signature was matched
    pub kind: ImageKind,
    /// Absolute offset of the header
    pub offset: usize,
    /// Header decoded at `offset`
    pub header: RecordHeader,
}

impl Record {
    /// Absolute offset of the first payload byte
    pub const fn payload_offset(&self) -> usize {
        self.offset + HEADER_SIZE
    }

    /// Absolute end (exclusive) of the valid payload
    pub const fn payload_end(&self) -> usize {
        self.payload_offset() + self.header.used_size as usize
    }

    /// Absolute end (exclusive) of the reserved capacity
    pub const fn capacity_end(&self) -> usize {
        self.payload_offset() + self.header.full_size as usize
    }

    /// Valid payload bytes of this record
    ///
    /// Fails if `used_size` reaches past the end of the container, including
    /// when the record starts past the end of a shorter image.
    pub fn payload<'a>(&self, container: &Container<'a>) -> Result<&'a [u8]> {
        let needed = HEADER_SIZE + self.header.used_size as usize;
        let out_of_bounds = || IflashError::RecordOutOfBounds {
            offset: self.offset,
            needed,
            available: container.len().saturating_sub(self.offset),
        };

        let end = self.offset.checked_add(needed).ok_or_else(out_of_bounds)?;
        if end > container.len() {
            return Err(out_of_bounds());
        }
        Ok(&container.data[self.offset + HEADER_SIZE..end])
    }
}

impl<'a> Container<'a> {
    /// Wrap loaded container bytes
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Total image size
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the image is empty
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The underlying bytes
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Locate the first record of `kind` and decode its header
    pub fn locate(&self, kind: ImageKind) -> Result<Record> {
        let searcher = PatternSearcher::new(kind.signature())?;
        let offset = searcher
            .find(self.data)
            .ok_or(IflashError::NotFound(kind))?;
        self.record_at(kind, offset)
    }

    /// Decode the header of a `kind` record known to start at `offset`
    pub fn record_at(&self, kind: ImageKind, offset: usize) -> Result<Record> {
        let available = self.data.len().saturating_sub(offset);
        if available < HEADER_SIZE {
            return Err(IflashError::RecordOutOfBounds {
                offset,
                needed: HEADER_SIZE,
                available,
            });
        }

        let header = RecordHeader::decode(&self.data[offset..])?;
        if header.signature != *kind.signature() {
            return Err(IflashError::NotFound(kind));
        }

        Ok(Record {
            kind,
            offset,
            header,
        })
    }

    /// Locate every known record kind present in the image
    ///
    /// Kinds that are absent are skipped. Any other error, such as a
    /// truncated header, is returned for that kind. Results are ordered by
    /// offset.
    pub fn records(&self) -> Vec<(ImageKind, Result<Record>)> {
        let mut found: Vec<_> = ImageKind::ALL
            .into_iter()
            .map(|kind| (kind, self.locate(kind)))
            .filter(|(_, result)| !matches!(result, Err(IflashError::NotFound(_))))
            .collect();
        found.sort_by_key(|(kind, result)| {
            (result.as_ref().map_or(usize::MAX, |r| r.offset), *kind)
        });
        found
    }

    /// Number of times the signature of `kind` occurs in the image
    ///
    /// Only the first occurrence is ever used; more than one usually means
    /// the image embeds another container or a payload happens to contain
    /// the signature.
    pub fn occurrences(&self, kind: ImageKind) -> usize {
        PatternSearcher::new(kind.signature())
            .map(|s| s.find_iter(self.data).count())
            .unwrap_or(0)
    }

    /// Copy the valid payload of `record` into `sink`
    ///
    /// Returns the number of bytes written, always `used_size` on success.
    pub fn extract<W: Write>(&self, record: &Record, sink: &mut W) -> Result<usize> {
        let payload = record.payload(self)?;
        write_fully(sink, payload)?;
        sink.flush()?;
        Ok(payload.len())
    }
}

/// Write all of `bytes`, reporting a sink that stops accepting data as
/// [`IflashError::ShortWrite`]
pub fn write_fully<W: Write>(sink: &mut W, bytes: &[u8]) -> Result<()> {
    let mut written = 0;
    while written < bytes.len() {
        match sink.write(&bytes[written..]) {
            Ok(0) => {
                return Err(IflashError::ShortWrite {
                    expected: bytes.len(),
                    actual: written,
                });
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
