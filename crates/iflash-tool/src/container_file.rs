//! A container image backed by a file on disk

use crate::error::{Result, ToolError};
use crate::io::{self, PatchTarget};
use iflash_formats::{
    Container, HEADER_SIZE, IflashError, ImageKind, Record, TailPolicy, plan_injection,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of a single extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// Record kind
    pub kind: ImageKind,
    /// Offset of the record header in the container
    pub offset: usize,
    /// File the payload was written to
    pub path: PathBuf,
    /// Payload bytes written
    pub size: usize,
}

/// Outcome of a single injection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Injected {
    /// Record kind
    pub kind: ImageKind,
    /// Offset of the record header in the container
    pub offset: usize,
    /// `used_size` before the injection
    pub previous_size: u32,
    /// `used_size` after the injection
    pub new_size: u32,
    /// Record capacity
    pub capacity: u32,
    /// Bytes written to the container file, header included
    pub written: usize,
}

/// Container file loaded into memory
///
/// Extraction reads from the loaded copy. Injection validates against the
/// loaded copy, writes one contiguous patch into the file, then applies the
/// same patch to the copy so both stay identical. Injection takes `&mut self`,
/// so no extraction can observe a half-applied patch.
#[derive(Debug)]
pub struct ContainerFile {
    path: PathBuf,
    data: Vec<u8>,
}

impl ContainerFile {
    /// Load the container at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = io::load_bytes(&path)?;
        info!("Loaded container {} ({} bytes)", path.display(), data.len());
        Ok(Self { path, data })
    }

    /// Path the container was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read-only view over the loaded bytes
    pub fn container(&self) -> Container<'_> {
        Container::new(&self.data)
    }

    fn record_error(&self, kind: ImageKind, source: IflashError) -> ToolError {
        ToolError::Record {
            path: self.path.clone(),
            kind,
            source,
        }
    }

    /// Locate the record of `kind`
    pub fn locate(&self, kind: ImageKind) -> Result<Record> {
        self.container()
            .locate(kind)
            .map_err(|e| self.record_error(kind, e))
    }

    /// Write the payload of `kind` to `output`
    pub fn extract_to(&self, kind: ImageKind, output: &Path) -> Result<Extracted> {
        let container = self.container();
        let record = container
            .locate(kind)
            .map_err(|e| self.record_error(kind, e))?;
        debug!(
            "Found {} at {:#x}: full_size={}, used_size={}",
            kind, record.offset, record.header.full_size, record.header.used_size
        );

        let payload = record
            .payload(&container)
            .map_err(|e| self.record_error(kind, e))?;
        let size = io::create_and_write(output, payload)?;

        info!("File {} successfully extracted", output.display());
        Ok(Extracted {
            kind,
            offset: record.offset,
            path: output.to_path_buf(),
            size,
        })
    }

    /// Replace the payload of `kind` with the contents of `input`
    pub fn inject_from(
        &mut self,
        kind: ImageKind,
        input: &Path,
        tail: TailPolicy,
    ) -> Result<Injected> {
        let payload = io::load_bytes(input)?;
        self.inject(kind, &payload, tail)
    }

    /// Replace the payload of `kind` with `payload`
    ///
    /// Capacity and bounds are checked before anything is written, and the
    /// header on disk is compared with the loaded header so a file modified
    /// since loading is never patched at a stale offset. A rejected
    /// injection leaves the file byte-identical, and so does a write that
    /// fails part way: the original bytes are written back and verified.
    pub fn inject(
        &mut self,
        kind: ImageKind,
        payload: &[u8],
        tail: TailPolicy,
    ) -> Result<Injected> {
        let mut file = io::open_existing(&self.path)?;
        self.inject_into(&mut file, kind, payload, tail)
    }

    /// Inject through an already open `target` holding this container
    pub(crate) fn inject_into<T: PatchTarget>(
        &mut self,
        target: &mut T,
        kind: ImageKind,
        payload: &[u8],
        tail: TailPolicy,
    ) -> Result<Injected> {
        let (record, patch) = {
            let container = self.container();
            let record = container
                .locate(kind)
                .map_err(|e| self.record_error(kind, e))?;
            let patch = plan_injection(&container, &record, payload, tail)
                .map_err(|e| self.record_error(kind, e))?;
            (record, patch)
        };

        let loaded_header = &self.data[record.offset..record.offset + HEADER_SIZE];
        let on_disk = io::read_region(target, &self.path, record.offset as u64, HEADER_SIZE)?;
        if on_disk != loaded_header {
            return Err(ToolError::StaleContainer {
                path: self.path.clone(),
                offset: record.offset,
            });
        }

        if tail == TailPolicy::LeaveStale && payload.len() < record.header.used_size as usize {
            warn!(
                "{} shrinks from {} to {} bytes; {} stale bytes remain in reserved capacity",
                kind,
                record.header.used_size,
                payload.len(),
                record.header.used_size as usize - payload.len()
            );
        }

        let original = &self.data[patch.offset..patch.offset + patch.bytes.len()];
        let written = io::write_patch(
            target,
            &self.path,
            patch.offset as u64,
            &patch.bytes,
            original,
        )?;
        info!(
            "Wrote {} byte header and {} byte payload to {} at {:#x}",
            HEADER_SIZE,
            payload.len(),
            self.path.display(),
            patch.offset
        );

        patch
            .apply(&mut self.data)
            .map_err(|e| self.record_error(kind, e))?;

        Ok(Injected {
            kind,
            offset: record.offset,
            previous_size: record.header.used_size,
            new_size: payload.len() as u32,
            capacity: record.header.full_size,
            written,
        })
    }
}
