//! Line iteration
//!
//! [`Lines`] performs one line read per step against a captured handle. On
//! ordinary end-of-stream it reports exhaustion once, closing the handle first
//! if it owns it, and afterwards neither reads nor closes again.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::{IoError, Result};
use crate::handle::FileHandle;
use crate::outcome::{Failure, describe};
use crate::read::read_line;

/// Lazy sequence of lines from a handle
#[derive(Debug)]
pub struct Lines {
    handle: FileHandle,
    close_on_exhaustion: bool,
    exhausted: bool,
}

impl Lines {
    /// Iterate `handle`; with `close_on_exhaustion` it is closed at the end
    pub fn new(handle: FileHandle, close_on_exhaustion: bool) -> Self {
        Self {
            handle,
            close_on_exhaustion,
            exhausted: false,
        }
    }

    /// The captured handle
    pub fn handle(&self) -> &FileHandle {
        &self.handle
    }

    /// Read the next line
    ///
    /// `Ok(None)` signals exhaustion. A handle closed by someone else before
    /// this step is a fatal condition, as is a hard I/O error.
    pub fn advance(&mut self) -> Result<Option<Vec<u8>>> {
        if self.exhausted {
            return Ok(None);
        }

        let step = self
            .handle
            .try_with_stream(|stream| {
                stream.clear_error();
                let line = read_line(stream);
                (line, stream.take_error())
            })
            .ok_or(IoError::AlreadyClosed)?;

        match step {
            (_, Some(err)) => Err(IoError::Stream {
                message: describe(&err),
                code: err.raw_os_error(),
            }),
            (Some(line), None) => Ok(Some(line)),
            (None, None) => {
                self.exhausted = true;
                if self.close_on_exhaustion {
                    self.close_owned();
                }
                Ok(None)
            }
        }
    }

    fn close_owned(&self) {
        match self.handle.close() {
            Ok(Ok(())) => debug!("Closed handle after last line"),
            Ok(Err(failure)) => warn!("Closing exhausted handle failed: {}", failure),
            Err(err) => warn!("Closing exhausted handle failed: {}", err),
        }
    }
}

impl Iterator for Lines {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().transpose()
    }
}

impl FileHandle {
    /// Iterate the lines of this handle without taking ownership of it
    pub fn lines(&self) -> Result<Lines> {
        if !self.is_open() {
            return Err(IoError::ClosedFile);
        }
        Ok(Lines::new(self.clone(), false))
    }
}

/// Open `path` for reading and iterate its lines, closing it at the end
///
/// Failing to open the file is an argument error naming the path.
pub fn lines_path(path: impl AsRef<Path>) -> Result<Lines> {
    let path = path.as_ref();
    let handle = FileHandle::open(path, "r")?.map_err(|failure: Failure| {
        IoError::bad_argument(1, failure.message())
    })?;
    Ok(Lines::new(handle, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::HandleState;
    use crate::test_utils::fixtures::Scratch;

    fn collect(lines: Lines) -> Vec<String> {
        lines
            .map(|line| String::from_utf8(line.unwrap()).unwrap())
            .collect()
    }

    #[test]
    fn test_owned_iteration_closes_handle() {
        let scratch = Scratch::new();
        let path = scratch.file("owned.txt", "one\ntwo\n\nfour");

        let lines = lines_path(&path).unwrap();
        let handle = lines.handle().clone();
        assert_eq!(collect(lines), vec!["one", "two", "", "four"]);
        assert_eq!(handle.state(), HandleState::Closed);
    }

    #[test]
    fn test_borrowed_iteration_leaves_handle_open() {
        let scratch = Scratch::new();
        let path = scratch.file("borrowed.txt", "a\nb\n");

        let handle = FileHandle::open(&path, "r").unwrap().unwrap();
        assert_eq!(collect(handle.lines().unwrap()), vec!["a", "b"]);
        assert_eq!(handle.state(), HandleState::Open);
    }

    #[test]
    fn test_exhaustion_is_reported_once_without_reclosing() {
        let scratch = Scratch::new();
        let path = scratch.file("once.txt", "only\n");

        let mut lines = lines_path(&path).unwrap();
        assert_eq!(lines.advance().unwrap(), Some(b"only".to_vec()));
        assert_eq!(lines.advance().unwrap(), None);
        assert_eq!(lines.advance().unwrap(), None);
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_handle_closed_elsewhere_is_fatal() {
        let scratch = Scratch::new();
        let path = scratch.file("elsewhere.txt", "x\n");

        let handle = FileHandle::open(&path, "r").unwrap().unwrap();
        let mut lines = handle.lines().unwrap();
        handle.close().unwrap().unwrap();

        assert_eq!(lines.advance().unwrap_err(), IoError::AlreadyClosed);
    }

    #[test]
    fn test_hard_error_is_fatal() {
        let scratch = Scratch::new();
        let handle = FileHandle::open(scratch.path("out.txt"), "w")
            .unwrap()
            .unwrap();

        let err = handle.lines().unwrap().advance().unwrap_err();
        assert!(matches!(err, IoError::Stream { .. }));
        assert_eq!(err.code(), Some(libc::EBADF));
    }

    #[test]
    fn test_missing_path_is_argument_error() {
        let scratch = Scratch::new();
        let path = scratch.path("missing.txt");

        match lines_path(&path).unwrap_err() {
            IoError::BadArgument { position, message } => {
                assert_eq!(position, 1);
                assert!(message.contains("missing.txt"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_lines_on_closed_handle() {
        let scratch = Scratch::new();
        let handle = FileHandle::open(scratch.path("c.txt"), "w")
            .unwrap()
            .unwrap();
        handle.close().unwrap().unwrap();

        assert_eq!(handle.lines().unwrap_err(), IoError::ClosedFile);
    }
}
