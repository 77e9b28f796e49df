//! Test utilities shared across module tests

pub use crate::builder::ContainerBuilder;
use std::io::{self, Write};

/// Sink that stops accepting bytes after `limit`
///
/// Once full it reports `Ok(0)`, the way a device out of space or a closed
/// pipe shows up to a plain `write` loop.
pub struct LimitedSink {
    pub data: Vec<u8>,
    limit: usize,
}

impl LimitedSink {
    pub fn new(limit: usize) -> Self {
        Self {
            data: Vec::new(),
            limit,
        }
    }
}

impl Write for LimitedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.limit - self.data.len();
        let n = room.min(buf.len());
        self.data.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
