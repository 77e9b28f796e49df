//! Whole-file and positioned file access
//!
//! These are the only functions that touch the filesystem. Each either
//! completes fully or reports how far it got. Patches written through
//! [`write_patch`] are rolled back when the write fails part way.

use crate::error::{Result, ToolError};
use iflash_formats::{IflashError, write_fully};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, error, warn};

/// Seekable storage that a patch can be written to and read back from
pub trait PatchTarget: Read + Write + Seek {
    /// Push written data down to stable storage
    fn sync(&mut self) -> std::io::Result<()>;
}

impl PatchTarget for File {
    fn sync(&mut self) -> std::io::Result<()> {
        self.sync_data()
    }
}

fn open_error(path: &Path, source: std::io::Error) -> ToolError {
    ToolError::Open {
        path: path.to_path_buf(),
        source,
    }
}

fn read_error(path: &Path, source: impl Into<IflashError>) -> ToolError {
    ToolError::Read {
        path: path.to_path_buf(),
        source: source.into(),
    }
}

fn write_error(path: &Path, source: impl Into<IflashError>) -> ToolError {
    ToolError::Write {
        path: path.to_path_buf(),
        source: source.into(),
    }
}

/// Read up to `len` bytes, stopping early only at end of file
fn read_up_to<R: Read>(reader: &mut R, len: usize) -> std::io::Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    let mut filled = 0;
    while filled < len {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    buf.truncate(filled);
    Ok(buf)
}

/// Read a whole file into memory
///
/// Fails with `ShortRead` if fewer bytes arrive than the file's size.
pub fn load_bytes(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path).map_err(|e| open_error(path, e))?;
    let expected = file.metadata().map_err(|e| read_error(path, e))?.len() as usize;

    let data = read_up_to(&mut file, expected).map_err(|e| read_error(path, e))?;
    if data.len() != expected {
        return Err(read_error(
            path,
            IflashError::ShortRead {
                expected,
                actual: data.len(),
            },
        ));
    }

    debug!("Loaded {} bytes from {}", data.len(), path.display());
    Ok(data)
}

/// Read exactly `len` bytes starting at `offset`
pub fn read_at(path: &Path, offset: u64, len: usize) -> Result<Vec<u8>> {
    let mut file = File::open(path).map_err(|e| open_error(path, e))?;
    read_region(&mut file, path, offset, len)
}

/// Read exactly `len` bytes at `offset` from an already open `reader`
///
/// `path` only labels errors.
pub fn read_region<R: Read + Seek>(
    reader: &mut R,
    path: &Path,
    offset: u64,
    len: usize,
) -> Result<Vec<u8>> {
    reader
        .seek(SeekFrom::Start(offset))
        .map_err(|e| read_error(path, e))?;

    let data = read_up_to(reader, len).map_err(|e| read_error(path, e))?;
    if data.len() != len {
        return Err(read_error(
            path,
            IflashError::ShortRead {
                expected: len,
                actual: data.len(),
            },
        ));
    }
    Ok(data)
}

/// Open an existing file for positioned reads and writes
///
/// The file is neither created nor truncated.
pub fn open_existing(path: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| open_error(path, e))
}

fn write_region<T: PatchTarget>(
    target: &mut T,
    offset: u64,
    bytes: &[u8],
) -> iflash_formats::Result<()> {
    target.seek(SeekFrom::Start(offset))?;
    write_fully(target, bytes)?;
    target.flush()?;
    target.sync()?;
    Ok(())
}

/// Overwrite `bytes` at `offset` in an existing file
///
/// The file is neither created nor truncated. Returns the number of bytes
/// written, which is always `bytes.len()` on success.
pub fn write_at(path: &Path, offset: u64, bytes: &[u8]) -> Result<usize> {
    let mut file = open_existing(path)?;
    write_region(&mut file, offset, bytes).map_err(|e| write_error(path, e))?;

    debug!(
        "Wrote {} bytes to {} at offset {:#x}",
        bytes.len(),
        path.display(),
        offset
    );
    Ok(bytes.len())
}

/// Overwrite `bytes` at `offset`, restoring `original` if the write fails
///
/// `original` must hold the current contents of the region and have the
/// same length as `bytes`. When the write fails, `original` is written back
/// and read again to confirm the region is byte-identical; the write error
/// is then returned. If the region cannot be restored the result is
/// [`ToolError::RollbackFailed`]. `path` only labels errors and logs.
pub fn write_patch<T: PatchTarget>(
    target: &mut T,
    path: &Path,
    offset: u64,
    bytes: &[u8],
    original: &[u8],
) -> Result<usize> {
    if bytes.len() != original.len() {
        return Err(write_error(
            path,
            IflashError::InvalidArgument(format!(
                "patch of {} bytes cannot be rolled back from {} original bytes",
                bytes.len(),
                original.len()
            )),
        ));
    }

    let Err(source) = write_region(target, offset, bytes) else {
        debug!(
            "Wrote {} bytes to {} at offset {:#x}",
            bytes.len(),
            path.display(),
            offset
        );
        return Ok(bytes.len());
    };

    warn!(
        "Write to {} at {:#x} failed ({}); restoring {} original bytes",
        path.display(),
        offset,
        source,
        original.len()
    );

    let rollback = match write_region(target, offset, original) {
        Ok(()) => match read_region(target, path, offset, original.len()) {
            Ok(readback) if readback == original => None,
            Ok(_) => Some("region read back differs from the original bytes".to_string()),
            Err(e) => Some(e.to_string()),
        },
        Err(e) => Some(e.to_string()),
    };

    match rollback {
        None => {
            debug!("Restored {} at {:#x}", path.display(), offset);
            Err(write_error(path, source))
        }
        Some(reason) => {
            error!(
                "{} may be corrupt at {:#x}: rollback failed: {}",
                path.display(),
                offset,
                reason
            );
            Err(ToolError::RollbackFailed {
                path: path.to_path_buf(),
                offset,
                source,
                reason,
            })
        }
    }
}

/// Create (or truncate) `path` and write `bytes` to it
pub fn create_and_write(path: &Path, bytes: &[u8]) -> Result<usize> {
    let mut file = File::create(path).map_err(|e| open_error(path, e))?;
    write_fully(&mut file, bytes).map_err(|e| write_error(path, e))?;
    file.flush().map_err(|e| write_error(path, e))?;

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(bytes.len())
}
