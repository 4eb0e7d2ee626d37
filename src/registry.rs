//! Default stream registry
//!
//! Two reassignable slots, input and output, name the handles used when a
//! call does not supply one. The error stream is a fixed third entry. The
//! process-wide instance is built once on first use with the standard
//! streams bound and lives until the process exits; [`Registry::shutdown`]
//! flushes and releases what it holds.

use std::fmt;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use tracing::{debug, warn};

use crate::error::{IoError, Result};
use crate::handle::{FileHandle, StandardStream};
use crate::lines::Lines;
use crate::outcome::{Failure, Outcome};
use crate::read::{ReadRequest, ReadResults, read_requests};
use crate::value::Value;
use crate::write::write_values;

/// A reassignable registry slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Input,
    Output,
}

impl Slot {
    /// Mode used when the slot is rebound to a path
    pub fn default_mode(self) -> &'static str {
        match self {
            Slot::Input => "r",
            Slot::Output => "w",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Input => f.write_str("input"),
            Slot::Output => f.write_str("output"),
        }
    }
}

/// New target for a slot
#[derive(Debug, Clone, Copy)]
pub enum Rebind<'a> {
    /// Open this path with the slot's default mode
    Path(&'a Path),
    /// Use an already-open handle
    Handle(&'a FileHandle),
}

impl<'a> From<&'a Path> for Rebind<'a> {
    fn from(path: &'a Path) -> Self {
        Rebind::Path(path)
    }
}

impl<'a> From<&'a str> for Rebind<'a> {
    fn from(path: &'a str) -> Self {
        Rebind::Path(Path::new(path))
    }
}

impl<'a> From<&'a FileHandle> for Rebind<'a> {
    fn from(handle: &'a FileHandle) -> Self {
        Rebind::Handle(handle)
    }
}

struct Slots {
    input: FileHandle,
    output: FileHandle,
}

/// Default input/output slots plus the error stream
pub struct Registry {
    slots: Mutex<Slots>,
    stdin: FileHandle,
    stdout: FileHandle,
    stderr: FileHandle,
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

impl Registry {
    /// Build a registry bound to the standard streams
    pub fn new() -> Self {
        let stdin = FileHandle::wrap_standard(StandardStream::Input);
        let stdout = FileHandle::wrap_standard(StandardStream::Output);
        let stderr = FileHandle::wrap_standard(StandardStream::Error);
        Self {
            slots: Mutex::new(Slots {
                input: stdin.clone(),
                output: stdout.clone(),
            }),
            stdin,
            stdout,
            stderr,
        }
    }

    /// The process-wide registry
    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(Registry::new)
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ------------------------------------------------------------------------
    // Slot access
    // ------------------------------------------------------------------------

    pub fn input(&self) -> FileHandle {
        self.lock().input.clone()
    }

    pub fn output(&self) -> FileHandle {
        self.lock().output.clone()
    }

    /// The error stream; never reassignable
    pub fn error(&self) -> FileHandle {
        self.stderr.clone()
    }

    pub fn get(&self, slot: Slot) -> FileHandle {
        match slot {
            Slot::Input => self.input(),
            Slot::Output => self.output(),
        }
    }

    pub fn set_input<'a>(&self, target: impl Into<Rebind<'a>>) -> Result<FileHandle> {
        self.rebind(Slot::Input, target.into())
    }

    pub fn set_output<'a>(&self, target: impl Into<Rebind<'a>>) -> Result<FileHandle> {
        self.rebind(Slot::Output, target.into())
    }

    /// Point `slot` at `target` and return the new binding
    ///
    /// A path is opened as a fresh Regular handle; failing to open it is an
    /// argument error. A handle must still be open.
    pub fn rebind(&self, slot: Slot, target: Rebind<'_>) -> Result<FileHandle> {
        let handle = match target {
            Rebind::Path(path) => FileHandle::open(path, slot.default_mode())?
                .map_err(|failure: Failure| IoError::bad_argument(1, failure.message()))?,
            Rebind::Handle(handle) => {
                if !handle.is_open() {
                    return Err(IoError::ClosedFile);
                }
                handle.clone()
            }
        };

        let previous = {
            let mut slots = self.lock();
            let entry = match slot {
                Slot::Input => &mut slots.input,
                Slot::Output => &mut slots.output,
            };
            std::mem::replace(entry, handle.clone())
        };
        debug!("Rebound default {} to {}", slot, handle);
        // Dropped outside the lock; this may close the previous handle.
        drop(previous);
        Ok(handle)
    }

    // ------------------------------------------------------------------------
    // Operations on the default slots
    // ------------------------------------------------------------------------

    /// Read from the default input
    pub fn read(&self, requests: &[ReadRequest]) -> Result<Outcome<ReadResults>> {
        self.input()
            .try_with_stream(|stream| read_requests(stream, requests))
            .ok_or(IoError::StandardFileClosed(Slot::Input))
    }

    /// Write to the default output
    pub fn write(&self, values: &[Value]) -> Result<Outcome<()>> {
        self.output()
            .try_with_stream(|stream| write_values(stream, values))
            .ok_or(IoError::StandardFileClosed(Slot::Output))
    }

    /// Flush the default output
    pub fn flush(&self) -> Result<Outcome<()>> {
        self.output()
            .try_with_stream(|stream| stream.flush().map_err(|err| Failure::from_io(&err, None)))
            .ok_or(IoError::StandardFileClosed(Slot::Output))
    }

    /// Close the default output
    pub fn close_output(&self) -> Result<Outcome<()>> {
        self.output().close()
    }

    /// Iterate the default input without taking ownership of it
    pub fn lines(&self) -> Result<Lines> {
        self.input().lines()
    }

    // ------------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------------

    /// Flush everything and rebind both slots to the standard streams
    ///
    /// Handles only the registry still referenced are closed as they drop.
    pub fn shutdown(&self) {
        let previous = {
            let mut slots = self.lock();
            (
                std::mem::replace(&mut slots.input, self.stdin.clone()),
                std::mem::replace(&mut slots.output, self.stdout.clone()),
            )
        };
        for handle in [&previous.0, &previous.1, &self.stdout, &self.stderr] {
            if let Some(Err(err)) = handle.try_with_stream(|stream| stream.flush()) {
                warn!("Flush during shutdown failed: {}", err);
            }
        }
        drop(previous);
        debug!("Registry shut down");
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
