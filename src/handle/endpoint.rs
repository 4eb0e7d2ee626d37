//! OS endpoints a handle can be attached to
//!
//! Each endpoint supports only the directions its origin allows. Operations in
//! the other direction fail the way the OS would for a descriptor opened
//! without that access (`EBADF`), and seeking anything but a regular file
//! fails with `ESPIPE`. Files carry the access their open mode granted, so the
//! check happens before any buffering.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::process::{ChildStdin, ChildStdout};

/// The three always-present process streams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardStream {
    Input,
    Output,
    Error,
}

pub(crate) enum Endpoint {
    File {
        file: File,
        readable: bool,
        writable: bool,
    },
    ChildStdout(ChildStdout),
    ChildStdin(ChildStdin),
    Stdin(io::Stdin),
    Stdout(io::Stdout),
    Stderr(io::Stderr),
    #[cfg(test)]
    Capped(tests::CappedSink),
}

impl Endpoint {
    pub(crate) fn file(file: File, readable: bool, writable: bool) -> Self {
        Endpoint::File {
            file,
            readable,
            writable,
        }
    }

    pub(crate) fn standard(stream: StandardStream) -> Self {
        match stream {
            StandardStream::Input => Endpoint::Stdin(io::stdin()),
            StandardStream::Output => Endpoint::Stdout(io::stdout()),
            StandardStream::Error => Endpoint::Stderr(io::stderr()),
        }
    }

    pub(crate) fn is_seekable(&self) -> bool {
        matches!(self, Endpoint::File { .. })
    }

    pub(crate) fn is_readable(&self) -> bool {
        match self {
            Endpoint::File { readable, .. } => *readable,
            Endpoint::ChildStdout(_) | Endpoint::Stdin(_) => true,
            _ => false,
        }
    }

    pub(crate) fn is_writable(&self) -> bool {
        match self {
            Endpoint::File { writable, .. } => *writable,
            Endpoint::ChildStdout(_) | Endpoint::Stdin(_) => false,
            _ => true,
        }
    }
}

pub(crate) fn bad_descriptor() -> io::Error {
    io::Error::from_raw_os_error(libc::EBADF)
}

impl Read for Endpoint {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Endpoint::File { file, .. } => file.read(buf),
            Endpoint::ChildStdout(pipe) => pipe.read(buf),
            Endpoint::Stdin(stdin) => {
                // A pending prompt must be visible before blocking on input.
                let _ = io::stdout().flush();
                stdin.read(buf)
            }
            _ => Err(bad_descriptor()),
        }
    }
}

impl Write for Endpoint {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Endpoint::File { file, .. } => file.write(buf),
            Endpoint::ChildStdin(pipe) => pipe.write(buf),
            Endpoint::Stdout(stdout) => stdout.write(buf),
            Endpoint::Stderr(stderr) => stderr.write(buf),
            #[cfg(test)]
            Endpoint::Capped(sink) => sink.write(buf),
            _ => Err(bad_descriptor()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Endpoint::File { file, .. } => file.flush(),
            Endpoint::ChildStdin(pipe) => pipe.flush(),
            Endpoint::Stdout(stdout) => stdout.flush(),
            Endpoint::Stderr(stderr) => stderr.flush(),
            _ => Ok(()),
        }
    }
}

impl Seek for Endpoint {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Endpoint::File { file, .. } => file.seek(pos),
            _ => Err(io::Error::from_raw_os_error(libc::ESPIPE)),
        }
    }
}
