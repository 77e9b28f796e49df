//! Test helpers for file-level operations

use crate::io::PatchTarget;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

/// In-memory patch target that fails on demand
///
/// Accepts `budget` bytes, then fails the next `failures` writes before
/// accepting writes again. Syncs can be failed the same way.
#[derive(Debug)]
pub struct FlakyTarget {
    inner: Cursor<Vec<u8>>,
    budget: Option<usize>,
    failures: usize,
    sync_failures: usize,
}

impl FlakyTarget {
    /// Target that never fails
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            inner: Cursor::new(data),
            budget: None,
            failures: 0,
            sync_failures: 0,
        }
    }

    /// Fail `failures` writes once `budget` bytes have been accepted
    #[must_use]
    pub fn fail_writes_after(mut self, budget: usize, failures: usize) -> Self {
        self.budget = Some(budget);
        self.failures = failures;
        self
    }

    /// Fail the next `failures` syncs
    #[must_use]
    pub fn fail_syncs(mut self, failures: usize) -> Self {
        self.sync_failures = failures;
        self
    }

    /// Current contents
    pub fn bytes(&self) -> &[u8] {
        self.inner.get_ref()
    }
}

impl Read for FlakyTarget {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for FlakyTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.budget == Some(0) {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(io::Error::other("simulated write failure"));
            }
            self.budget = None;
        }

        let len = self.budget.map_or(buf.len(), |budget| budget.min(buf.len()));
        let n = self.inner.write(&buf[..len])?;
        if let Some(budget) = self.budget.as_mut() {
            *budget -= n;
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl Seek for FlakyTarget {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl PatchTarget for FlakyTarget {
    fn sync(&mut self) -> io::Result<()> {
        if self.sync_failures > 0 {
            self.sync_failures -= 1;
            return Err(io::Error::other("simulated sync failure"));
        }
        Ok(())
    }
}
