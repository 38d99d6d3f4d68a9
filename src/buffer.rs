//! Append-only output buffer, flushed in one write to avoid flicker
//! (spec §4.2).

use std::os::fd::RawFd;

use crate::term;

#[derive(Default)]
pub struct OutputBuffer {
    bytes: Vec<u8>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, s: &str) {
        self.bytes.extend_from_slice(s.as_bytes());
    }

    pub fn append_bytes(&mut self, b: &[u8]) {
        self.bytes.extend_from_slice(b);
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Emit the whole buffer in one write. Errors are logged and
    /// swallowed: display is best-effort (spec §4.2/§7).
    pub fn flush_to(&mut self, fd: RawFd) {
        if self.bytes.is_empty() {
            return;
        }
        if let Err(e) = term::write_raw(fd, &self.bytes) {
            log::warn!("refresh write failed: {e}");
        }
        self.bytes.clear();
    }
}
