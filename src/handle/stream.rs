//! Buffered native stream
//!
//! Sits between a handle and its [`Endpoint`]. Reads go through a read-ahead
//! buffer that also accepts pushed-back bytes, so scanners can look ahead and
//! give input back. Writes are coalesced according to the [`BufferMode`].
//!
//! Read-side I/O errors are recorded in a sticky error slot instead of being
//! returned, the way a C stream sets its error indicator. Dispatchers clear
//! the slot when they start and inspect it when they finish.

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::process::Child;
use std::str::FromStr;

use crate::error::IoError;
use crate::handle::endpoint::{Endpoint, bad_descriptor};

// ============================================================================
// Buffering Modes
// ============================================================================

/// Output buffering policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferMode {
    /// Every write goes straight to the OS
    No,
    /// Output is held until the buffer fills
    Full,
    /// Output is held until a newline is written or the buffer fills
    Line,
}

impl FromStr for BufferMode {
    type Err = IoError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "no" => Ok(BufferMode::No),
            "full" => Ok(BufferMode::Full),
            "line" => Ok(BufferMode::Line),
            other => Err(IoError::bad_argument(
                2,
                format!("invalid option '{other}'"),
            )),
        }
    }
}

// ============================================================================
// Native Stream
// ============================================================================

pub(crate) struct NativeStream {
    endpoint: Endpoint,
    /// Child process behind a pipe endpoint, waited for on close
    child: Option<Child>,
    input: Vec<u8>,
    cursor: usize,
    output: Vec<u8>,
    mode: BufferMode,
    capacity: usize,
    error: Option<io::Error>,
}

impl NativeStream {
    pub(crate) fn new(
        endpoint: Endpoint,
        child: Option<Child>,
        mode: BufferMode,
        capacity: usize,
    ) -> Self {
        Self {
            endpoint,
            child,
            input: Vec::new(),
            cursor: 0,
            output: Vec::new(),
            mode,
            capacity: capacity.max(1),
            error: None,
        }
    }

    // ------------------------------------------------------------------------
    // Error indicator
    // ------------------------------------------------------------------------

    pub(crate) fn clear_error(&mut self) {
        self.error = None;
    }

    pub(crate) fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    fn record(&mut self, err: io::Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    // ------------------------------------------------------------------------
    // Reading
    // ------------------------------------------------------------------------

    /// Make unread input available; false at end-of-stream or on error
    fn fill(&mut self) -> bool {
        if self.cursor < self.input.len() {
            return true;
        }
        if !self.endpoint.is_readable() {
            self.record(bad_descriptor());
            return false;
        }
        if let Err(err) = self.drain_output() {
            self.record(err);
            return false;
        }

        self.input.clear();
        self.input.resize(self.capacity, 0);
        self.cursor = 0;
        loop {
            match self.endpoint.read(&mut self.input) {
                Ok(n) => {
                    self.input.truncate(n);
                    return n > 0;
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.input.clear();
                    self.record(err);
                    return false;
                }
            }
        }
    }

    /// Next byte without consuming it
    pub(crate) fn peek_byte(&mut self) -> Option<u8> {
        if self.fill() {
            Some(self.input[self.cursor])
        } else {
            None
        }
    }

    /// Consume one previously peeked byte
    pub(crate) fn bump(&mut self) {
        if self.cursor < self.input.len() {
            self.cursor += 1;
        }
    }

    /// Push `bytes` back so the next read returns them first
    pub(crate) fn unread(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        self.input.splice(..self.cursor, bytes.iter().copied());
        self.cursor = 0;
    }

    /// Append bytes up to the next newline to `line`, consuming the newline
    ///
    /// Returns whether a newline was found.
    pub(crate) fn read_line(&mut self, line: &mut Vec<u8>) -> bool {
        while self.fill() {
            let available = &self.input[self.cursor..];
            match memchr::memchr(b'\n', available) {
                Some(idx) => {
                    line.extend_from_slice(&available[..idx]);
                    self.cursor += idx + 1;
                    return true;
                }
                None => {
                    line.extend_from_slice(available);
                    self.cursor = self.input.len();
                }
            }
        }
        false
    }

    /// Append at most `limit` bytes to `out`, stopping early at end-of-stream
    pub(crate) fn read_up_to(&mut self, limit: usize, out: &mut Vec<u8>) {
        let mut remaining = limit;
        while remaining > 0 && self.fill() {
            let available = &self.input[self.cursor..];
            let take = available.len().min(remaining);
            out.extend_from_slice(&available[..take]);
            self.cursor += take;
            remaining -= take;
        }
    }

    pub(crate) fn read_to_end(&mut self, out: &mut Vec<u8>) {
        self.read_up_to(usize::MAX, out);
    }

    /// Give read-ahead back to the OS position before switching to writing
    fn discard_input(&mut self) -> io::Result<()> {
        let unread = self.input.len() - self.cursor;
        self.input.clear();
        self.cursor = 0;
        if unread > 0 && self.endpoint.is_seekable() {
            self.endpoint.seek(SeekFrom::Current(-(unread as i64)))?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Writing
    // ------------------------------------------------------------------------

    /// Queue or write `data` per the buffering mode
    ///
    /// A handle without write access fails here, leaving both buffers alone.
    pub(crate) fn write_bytes(&mut self, data: &[u8]) -> io::Result<()> {
        if !self.endpoint.is_writable() {
            return Err(bad_descriptor());
        }
        self.discard_input()?;
        match self.mode {
            BufferMode::No => {
                self.drain_output()?;
                self.endpoint.write_all(data)
            }
            BufferMode::Full => {
                self.output.extend_from_slice(data);
                if self.output.len() >= self.capacity {
                    self.drain_output()?;
                }
                Ok(())
            }
            BufferMode::Line => {
                self.output.extend_from_slice(data);
                if self.output.len() >= self.capacity || memchr::memchr(b'\n', data).is_some() {
                    self.drain_output()?;
                }
                Ok(())
            }
        }
    }

    /// Hand buffered output to the endpoint without flushing the endpoint
    fn drain_output(&mut self) -> io::Result<()> {
        if self.output.is_empty() {
            return Ok(());
        }
        let result = self.endpoint.write_all(&self.output);
        self.output.clear();
        result
    }

    pub(crate) fn flush(&mut self) -> io::Result<()> {
        self.drain_output()?;
        self.endpoint.flush()
    }

    pub(crate) fn set_buffering(&mut self, mode: BufferMode, capacity: usize) -> io::Result<()> {
        self.flush()?;
        self.mode = mode;
        self.capacity = capacity.max(1);
        Ok(())
    }

    pub(crate) fn buffering(&self) -> (BufferMode, usize) {
        (self.mode, self.capacity)
    }

    #[cfg(test)]
    pub(crate) fn pending_output(&self) -> usize {
        self.output.len()
    }

    // ------------------------------------------------------------------------
    // Positioning
    // ------------------------------------------------------------------------

    /// Seek relative to the logical position and return the new absolute one
    pub(crate) fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.drain_output()?;
        let unread = (self.input.len() - self.cursor) as i64;
        let target = match pos {
            SeekFrom::Current(offset) => offset
                .checked_sub(unread)
                .map(SeekFrom::Current)
                .ok_or_else(|| io::Error::from_raw_os_error(libc::EINVAL))?,
            other => other,
        };
        let position = self.endpoint.seek(target)?;
        self.input.clear();
        self.cursor = 0;
        Ok(position)
    }

    // ------------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------------

    /// Flush and release the endpoint, handing back any child to wait for
    pub(crate) fn release(mut self) -> (io::Result<()>, Option<Child>) {
        let flushed = self.flush();
        let child = self.child.take();
        drop(self);
        (flushed, child)
    }
}
