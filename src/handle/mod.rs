//! File handles and their close strategies
//!
//! A [`FileHandle`] is a shared reference to one handle record. The record
//! holds at most one native stream plus the [`CloseStrategy`] chosen when the
//! handle was built. Handles are always created closed and only then
//! attached to a stream, so a failed open leaves a valid closed record behind.
//!
//! Once closed, a record never reopens; every open produces a new handle.

pub mod endpoint;
pub mod mode;
pub mod stream;

use std::any::Any;
use std::fmt;
use std::io::{self, SeekFrom};
use std::path::Path;
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace, warn};

use crate::config::{self, IoConfig};
use crate::error::{IoError, Result};
use crate::outcome::{Failure, Outcome};

pub use endpoint::StandardStream;
pub use mode::{OpenMode, ParseModeError, PipeMode};
pub use stream::BufferMode;

use endpoint::Endpoint;
use stream::NativeStream;

// ============================================================================
// Close Strategies
// ============================================================================

/// Teardown behavior, fixed when the handle is created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseStrategy {
    /// Release the file through the ordinary close path
    Regular,
    /// Release the pipe and wait for the child process
    Pipe,
    /// Standard streams: closing always fails and changes nothing
    NonClosable,
}

/// Message reported when closing a standard stream
pub const CANNOT_CLOSE_STANDARD: &str = "cannot close standard file";

impl CloseStrategy {
    pub fn is_closable(self) -> bool {
        !matches!(self, CloseStrategy::NonClosable)
    }
}

/// Release `stream` according to `strategy`
fn teardown(strategy: CloseStrategy, stream: Box<NativeStream>) -> Outcome<()> {
    let (flushed, child) = stream.release();
    match strategy {
        CloseStrategy::Regular | CloseStrategy::NonClosable => {
            flushed.map_err(|err| Failure::from_io(&err, None))
        }
        CloseStrategy::Pipe => {
            let Some(mut child) = child else {
                return flushed.map_err(|err| Failure::from_io(&err, None));
            };
            let pid = child.id();
            let status = child.wait().map_err(|err| Failure::from_io(&err, None))?;
            debug!("Pipe child {} exited: {}", pid, status);
            flushed.map_err(|err| Failure::from_io(&err, None))?;
            if status.success() {
                Ok(())
            } else {
                Err(Failure::new(
                    format!("process exited with {status}"),
                    status.code(),
                ))
            }
        }
    }
}

// ============================================================================
// Handle State
// ============================================================================

/// Result of asking what a value is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// The value is not a file handle
    Absent,
    /// A handle whose stream has been released
    Closed,
    /// A handle with a live stream
    Open,
}

impl HandleState {
    /// Name reported to scripts: no name, `"closed file"` or `"file"`
    pub fn type_name(self) -> Option<&'static str> {
        match self {
            HandleState::Absent => None,
            HandleState::Closed => Some("closed file"),
            HandleState::Open => Some("file"),
        }
    }
}

/// Classify an arbitrary runtime value; never fails
pub fn identity_state(value: &dyn Any) -> HandleState {
    match value.downcast_ref::<FileHandle>() {
        Some(handle) => handle.state(),
        None => HandleState::Absent,
    }
}

// ============================================================================
// File Handle
// ============================================================================

struct HandleRecord {
    stream: Option<Box<NativeStream>>,
    strategy: CloseStrategy,
}

impl Drop for HandleRecord {
    fn drop(&mut self) {
        let Some(stream) = self.stream.take() else {
            return;
        };
        if self.strategy.is_closable() {
            if let Err(failure) = teardown(self.strategy, stream) {
                warn!("Ignoring close failure for collected handle: {}", failure);
            }
        } else {
            let (flushed, _) = stream.release();
            if let Err(err) = flushed {
                warn!("Ignoring flush failure for standard stream: {}", err);
            }
        }
    }
}

/// Shared reference to a file handle record
///
/// Clones refer to the same record. The stream is released by an explicit
/// [`close`](FileHandle::close) or when the last reference is dropped; in the
/// latter case close failures are logged and swallowed.
#[derive(Clone)]
pub struct FileHandle {
    record: Arc<Mutex<HandleRecord>>,
}

impl FileHandle {
    /// Allocate a closed record for `strategy`
    fn closed(strategy: CloseStrategy) -> Self {
        Self {
            record: Arc::new(Mutex::new(HandleRecord {
                stream: None,
                strategy,
            })),
        }
    }

    fn attach(&self, stream: NativeStream) {
        self.lock().stream = Some(Box::new(stream));
    }

    fn lock(&self) -> MutexGuard<'_, HandleRecord> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    /// Open `path` with `mode` using the process-wide configuration
    pub fn open(path: impl AsRef<Path>, mode: &str) -> Result<Outcome<FileHandle>> {
        Self::open_with(path, mode, config::current())
    }

    /// Open `path` with `mode`; strategy Regular
    ///
    /// An unparseable mode is an argument error. OS failures come back as a
    /// [`Failure`] naming the path.
    pub fn open_with(
        path: impl AsRef<Path>,
        mode: &str,
        config: &IoConfig,
    ) -> Result<Outcome<FileHandle>> {
        let path = path.as_ref();
        let mode = OpenMode::parse(mode).map_err(|_| IoError::bad_argument(2, "invalid mode"))?;

        let handle = Self::closed(CloseStrategy::Regular);
        match mode.to_open_options().open(path) {
            Ok(file) => {
                debug!("Opened {} ({:?})", path.display(), mode);
                handle.attach(NativeStream::new(
                    Endpoint::file(file, mode.read, mode.write),
                    None,
                    BufferMode::Full,
                    config.buffer_size,
                ));
                Ok(Ok(handle))
            }
            Err(err) => {
                let failure = Failure::from_io(&err, Some(&path.display().to_string()));
                debug!("Open failed: {}", failure);
                Ok(Err(failure))
            }
        }
    }

    /// Run `command` through the shell with a pipe in direction `mode`
    pub fn open_pipe(command: &str, mode: &str) -> Result<Outcome<FileHandle>> {
        Self::open_pipe_with(command, mode, config::current())
    }

    /// Run `command` through the configured shell; strategy Pipe
    ///
    /// Mode `r` reads the child's standard output, `w` writes its standard
    /// input. The other standard streams are inherited.
    pub fn open_pipe_with(
        command: &str,
        mode: &str,
        config: &IoConfig,
    ) -> Result<Outcome<FileHandle>> {
        let mode = PipeMode::parse(mode).map_err(|_| IoError::bad_argument(2, "invalid mode"))?;

        let handle = Self::closed(CloseStrategy::Pipe);
        let mut cmd = Command::new(&config.shell);
        cmd.arg(&config.shell_flag).arg(command);
        match mode {
            PipeMode::Read => cmd.stdout(Stdio::piped()),
            PipeMode::Write => cmd.stdin(Stdio::piped()),
        };

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => return Ok(Err(Failure::from_io(&err, Some(command)))),
        };
        debug!("Spawned pipe child {} for {:?} ({:?})", child.id(), command, mode);

        let endpoint = match mode {
            PipeMode::Read => child.stdout.take().map(Endpoint::ChildStdout),
            PipeMode::Write => child.stdin.take().map(Endpoint::ChildStdin),
        };
        let Some(endpoint) = endpoint else {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(Err(Failure::new(
                format!("{command}: pipe not available"),
                None,
            )));
        };

        handle.attach(NativeStream::new(
            endpoint,
            Some(child),
            BufferMode::Full,
            config.buffer_size,
        ));
        Ok(Ok(handle))
    }

    /// Open an anonymous read/write file removed by the OS once closed
    pub fn open_temp() -> Outcome<FileHandle> {
        Self::open_temp_with(config::current())
    }

    pub fn open_temp_with(config: &IoConfig) -> Outcome<FileHandle> {
        let handle = Self::closed(CloseStrategy::Regular);
        let file = tempfile::tempfile().map_err(|err| Failure::from_io(&err, None))?;
        handle.attach(NativeStream::new(
            Endpoint::file(file, true, true),
            None,
            BufferMode::Full,
            config.buffer_size,
        ));
        Ok(handle)
    }

    /// Wrap a standard stream; strategy NonClosable, cannot fail
    ///
    /// Output streams pass writes straight through: the process `Stdout`
    /// already line-buffers and is flushed at exit, which a second buffer
    /// held by a never-dropped registry would not be.
    pub fn wrap_standard(stream: StandardStream) -> FileHandle {
        let mode = match stream {
            StandardStream::Input => BufferMode::Full,
            StandardStream::Output | StandardStream::Error => BufferMode::No,
        };
        let handle = Self::closed(CloseStrategy::NonClosable);
        handle.attach(NativeStream::new(
            Endpoint::standard(stream),
            None,
            mode,
            config::current().buffer_size,
        ));
        trace!("Wrapped standard stream {:?}", stream);
        handle
    }

    #[cfg(test)]
    pub(crate) fn from_endpoint(endpoint: Endpoint, mode: BufferMode, capacity: usize) -> Self {
        let handle = Self::closed(CloseStrategy::Regular);
        handle.attach(NativeStream::new(endpoint, None, mode, capacity));
        handle
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn strategy(&self) -> CloseStrategy {
        self.lock().strategy
    }

    pub fn state(&self) -> HandleState {
        if self.lock().stream.is_some() {
            HandleState::Open
        } else {
            HandleState::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == HandleState::Open
    }

    /// Whether both references point at the same handle record
    pub fn ptr_eq(&self, other: &FileHandle) -> bool {
        Arc::ptr_eq(&self.record, &other.record)
    }

    /// Current buffering mode and size
    pub fn buffering(&self) -> Result<(BufferMode, usize)> {
        self.with_stream(|stream| stream.buffering())
    }

    // ------------------------------------------------------------------------
    // Stream access
    // ------------------------------------------------------------------------

    /// Run `f` on the live stream, or `None` if the handle is closed
    ///
    /// The record stays locked for the whole call, so one dispatcher call
    /// never interleaves with another on the same handle.
    pub(crate) fn try_with_stream<T>(&self, f: impl FnOnce(&mut NativeStream) -> T) -> Option<T> {
        let mut record = self.lock();
        record.stream.as_deref_mut().map(f)
    }

    pub(crate) fn with_stream<T>(&self, f: impl FnOnce(&mut NativeStream) -> T) -> Result<T> {
        self.try_with_stream(f).ok_or(IoError::ClosedFile)
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Close through the handle's strategy
    ///
    /// Closable handles lose their stream whether or not the teardown
    /// succeeds. Standard streams report a failure and stay open.
    pub fn close(&self) -> Result<Outcome<()>> {
        let mut record = self.lock();
        if record.stream.is_none() {
            return Err(IoError::ClosedFile);
        }
        let strategy = record.strategy;
        if !strategy.is_closable() {
            return Ok(Err(Failure::new(CANNOT_CLOSE_STANDARD, None)));
        }

        let Some(stream) = record.stream.take() else {
            return Err(IoError::ClosedFile);
        };
        drop(record);

        let outcome = teardown(strategy, stream);
        debug!("Closed {:?} handle: {:?}", strategy, outcome);
        Ok(outcome)
    }

    /// Move the position relative to `whence`; returns the new absolute offset
    pub fn seek(&self, whence: Whence, offset: i64) -> Result<Outcome<u64>> {
        self.with_stream(|stream| {
            let target = match whence {
                Whence::Set => u64::try_from(offset)
                    .map(SeekFrom::Start)
                    .map_err(|_| io::Error::from_raw_os_error(libc::EINVAL)),
                Whence::Cur => Ok(SeekFrom::Current(offset)),
                Whence::End => Ok(SeekFrom::End(offset)),
            };
            target
                .and_then(|target| stream.seek(target))
                .map_err(|err| Failure::from_io(&err, None))
        })
    }

    /// Change the output buffering; `size` defaults to the configured size
    pub fn set_buffering(&self, mode: BufferMode, size: Option<usize>) -> Result<Outcome<()>> {
        let size = size.unwrap_or(config::current().buffer_size);
        self.with_stream(|stream| {
            stream
                .set_buffering(mode, size)
                .map_err(|err| Failure::from_io(&err, None))
        })
    }

    pub fn flush(&self) -> Result<Outcome<()>> {
        self.with_stream(|stream| stream.flush().map_err(|err| Failure::from_io(&err, None)))
    }
}

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lock().stream.as_deref() {
            Some(stream) => write!(f, "file ({:p})", stream),
            None => f.write_str("file (closed)"),
        }
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("strategy", &self.strategy())
            .field("state", &self.state())
            .finish()
    }
}

// ============================================================================
// Seek Origins
// ============================================================================

/// Origin for [`FileHandle::seek`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Whence {
    /// Start of file
    Set,
    /// Current position
    #[default]
    Cur,
    /// End of file
    End,
}

impl FromStr for Whence {
    type Err = IoError;

    fn from_str(name: &str) -> std::result::Result<Self, Self::Err> {
        match name {
            "set" => Ok(Whence::Set),
            "cur" => Ok(Whence::Cur),
            "end" => Ok(Whence::End),
            other => Err(IoError::bad_argument(
                2,
                format!("invalid option '{other}'"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read::ReadRequest;
    use crate::test_utils::fixtures::Scratch;
    use crate::value::Value;

    #[test]
    fn test_open_missing_file_reports_path_and_code() {
        let scratch = Scratch::new();
        let path = scratch.path("missing.txt");

        let failure = FileHandle::open(&path, "r").unwrap().unwrap_err();
        assert!(failure.message().starts_with(&path.display().to_string()));
        assert_eq!(failure.code(), Some(libc::ENOENT));
    }

    #[test]
    fn test_invalid_mode_is_argument_error() {
        let scratch = Scratch::new();
        let err = FileHandle::open(scratch.path("x"), "rw").unwrap_err();
        assert_eq!(err, IoError::bad_argument(2, "invalid mode"));

        let err = FileHandle::open_pipe("true", "r+").unwrap_err();
        assert_eq!(err, IoError::bad_argument(2, "invalid mode"));
    }

    #[test]
    fn test_close_transitions_to_closed_for_good() {
        let scratch = Scratch::new();
        let handle = FileHandle::open(scratch.path("a.txt"), "w")
            .unwrap()
            .unwrap();
        assert_eq!(handle.strategy(), CloseStrategy::Regular);
        assert_eq!(handle.state(), HandleState::Open);

        assert_eq!(handle.close().unwrap(), Ok(()));
        assert_eq!(handle.state(), HandleState::Closed);
        assert_eq!(handle.to_string(), "file (closed)");

        assert_eq!(handle.close().unwrap_err(), IoError::ClosedFile);
        assert_eq!(handle.flush().unwrap_err(), IoError::ClosedFile);
        assert_eq!(handle.seek(Whence::Set, 0).unwrap_err(), IoError::ClosedFile);
        assert_eq!(
            handle.set_buffering(BufferMode::No, None).unwrap_err(),
            IoError::ClosedFile
        );
        assert_eq!(handle.read(&[]).unwrap_err(), IoError::ClosedFile);
    }

    #[test]
    fn test_standard_streams_refuse_to_close() {
        let handle = FileHandle::wrap_standard(StandardStream::Error);
        assert_eq!(handle.strategy(), CloseStrategy::NonClosable);

        for _ in 0..2 {
            let failure = handle.close().unwrap().unwrap_err();
            assert_eq!(failure.message(), CANNOT_CLOSE_STANDARD);
            assert_eq!(failure.code(), None);
            assert_eq!(handle.state(), HandleState::Open);
        }
    }

    #[test]
    fn test_standard_output_passes_writes_through() {
        let output = FileHandle::wrap_standard(StandardStream::Output);
        assert_eq!(output.buffering().unwrap().0, BufferMode::No);

        output.write(&[Value::from("")]).unwrap().unwrap();
        let pending = output.with_stream(|stream| stream.pending_output()).unwrap();
        assert_eq!(pending, 0);

        let input = FileHandle::wrap_standard(StandardStream::Input);
        assert_eq!(input.buffering().unwrap().0, BufferMode::Full);
        let failure = input.write(&[Value::from("x")]).unwrap().unwrap_err();
        assert_eq!(failure.code(), Some(libc::EBADF));
    }

    #[test]
    fn test_identity_state() {
        let scratch = Scratch::new();
        let handle = FileHandle::open(scratch.path("id.txt"), "w")
            .unwrap()
            .unwrap();

        assert_eq!(identity_state(&42_i32), HandleState::Absent);
        assert_eq!(identity_state(&"file"), HandleState::Absent);
        assert_eq!(identity_state(&handle), HandleState::Open);

        handle.close().unwrap().unwrap();
        assert_eq!(identity_state(&handle), HandleState::Closed);
        assert_eq!(HandleState::Closed.type_name(), Some("closed file"));
        assert_eq!(HandleState::Absent.type_name(), None);
    }

    #[test]
    fn test_display_includes_stream_address() {
        let handle = FileHandle::wrap_standard(StandardStream::Output);
        let text = handle.to_string();
        assert!(text.starts_with("file (0x"), "unexpected display: {text}");
        assert_eq!(text, handle.clone().to_string());
    }

    #[test]
    fn test_seek_origins() {
        let scratch = Scratch::new();
        let path = scratch.file("seek.txt", "0123456789");
        let handle = FileHandle::open(&path, "r").unwrap().unwrap();

        assert_eq!(handle.seek(Whence::End, 0).unwrap(), Ok(10));
        assert_eq!(handle.seek(Whence::Set, 4).unwrap(), Ok(4));
        assert_eq!(handle.seek(Whence::Cur, 2).unwrap(), Ok(6));

        let results = handle.read(&[ReadRequest::Count(2)]).unwrap().unwrap();
        assert_eq!(results, vec![Some(Value::from("67"))]);
        assert_eq!(handle.seek(Whence::default(), 0).unwrap(), Ok(8));

        let failure = handle.seek(Whence::Set, -1).unwrap().unwrap_err();
        assert_eq!(failure.code(), Some(libc::EINVAL));
    }

    #[test]
    fn test_whence_names() {
        assert_eq!("set".parse::<Whence>().unwrap(), Whence::Set);
        assert_eq!("cur".parse::<Whence>().unwrap(), Whence::Cur);
        assert_eq!("end".parse::<Whence>().unwrap(), Whence::End);
        assert_eq!(
            "start".parse::<Whence>().unwrap_err(),
            IoError::bad_argument(2, "invalid option 'start'")
        );
    }

    #[test]
    fn test_overflowing_relative_seek_is_soft_failure() {
        let handle = FileHandle::open_temp().unwrap();
        handle.write(&[Value::from("abcdef")]).unwrap().unwrap();
        handle.seek(Whence::Set, 0).unwrap().unwrap();
        handle.read(&[ReadRequest::Count(1)]).unwrap().unwrap();

        let failure = handle.seek(Whence::Cur, i64::MIN).unwrap().unwrap_err();
        assert_eq!(failure.code(), Some(libc::EINVAL));
        assert_eq!(handle.seek(Whence::Cur, 0).unwrap(), Ok(1));
    }

    #[test]
    fn test_set_buffering() {
        let scratch = Scratch::new();
        let handle = FileHandle::open(scratch.path("buf.txt"), "w")
            .unwrap()
            .unwrap();

        handle.set_buffering(BufferMode::Line, Some(16)).unwrap().unwrap();
        assert_eq!(handle.buffering().unwrap(), (BufferMode::Line, 16));

        handle.write(&[Value::from("no newline")]).unwrap().unwrap();
        assert_eq!(scratch.contents("buf.txt"), "");
        handle.write(&[Value::from("\n")]).unwrap().unwrap();
        assert_eq!(scratch.contents("buf.txt"), "no newline\n");

        handle.set_buffering(BufferMode::No, None).unwrap().unwrap();
        handle.write(&[Value::from("x")]).unwrap().unwrap();
        assert_eq!(scratch.contents("buf.txt"), "no newline\nx");
    }

    #[test]
    fn test_flush_writes_pending_output() {
        let scratch = Scratch::new();
        let handle = FileHandle::open(scratch.path("flush.txt"), "w")
            .unwrap()
            .unwrap();

        handle.write(&[Value::from("data")]).unwrap().unwrap();
        assert_eq!(scratch.contents("flush.txt"), "");
        handle.flush().unwrap().unwrap();
        assert_eq!(scratch.contents("flush.txt"), "data");
    }

    #[test]
    fn test_drop_of_last_reference_closes() {
        let scratch = Scratch::new();
        let handle = FileHandle::open(scratch.path("drop.txt"), "w")
            .unwrap()
            .unwrap();
        let other = handle.clone();

        handle.write(&[Value::from("kept")]).unwrap().unwrap();
        drop(handle);
        assert_eq!(scratch.contents("drop.txt"), "");
        assert!(other.is_open());

        drop(other);
        assert_eq!(scratch.contents("drop.txt"), "kept");
    }

    #[test]
    fn test_append_mode() {
        let scratch = Scratch::new();
        let path = scratch.file("log.txt", "one\n");

        let handle = FileHandle::open(&path, "a").unwrap().unwrap();
        handle.write(&[Value::from("two\n")]).unwrap().unwrap();
        handle.close().unwrap().unwrap();

        assert_eq!(scratch.contents("log.txt"), "one\ntwo\n");
    }

    #[test]
    fn test_temp_file_round_trip() {
        let handle = FileHandle::open_temp().unwrap();
        assert_eq!(handle.strategy(), CloseStrategy::Regular);

        handle.write(&[Value::from("scratch\n")]).unwrap().unwrap();
        handle.seek(Whence::Set, 0).unwrap().unwrap();

        let results = handle.read(&[ReadRequest::Line]).unwrap().unwrap();
        assert_eq!(results, vec![Some(Value::from("scratch"))]);
        handle.close().unwrap().unwrap();
    }

    #[cfg(unix)]
    mod pipes {
        use super::*;

        #[test]
        fn test_read_pipe() {
            let handle = FileHandle::open_pipe("printf 'a\\nb\\n'", "r")
                .unwrap()
                .unwrap();
            assert_eq!(handle.strategy(), CloseStrategy::Pipe);

            let results = handle.read(&[ReadRequest::All]).unwrap().unwrap();
            assert_eq!(results, vec![Some(Value::from("a\nb\n"))]);
            assert_eq!(handle.close().unwrap(), Ok(()));
            assert_eq!(handle.state(), HandleState::Closed);
        }

        #[test]
        fn test_write_to_read_pipe_keeps_buffered_lines() {
            let handle = FileHandle::open_pipe("printf 'ab\\ncd\\n'", "r")
                .unwrap()
                .unwrap();

            let first = handle.read(&[ReadRequest::Line]).unwrap().unwrap();
            assert_eq!(first, vec![Some(Value::from("ab"))]);

            let failure = handle.write(&[Value::from("x")]).unwrap().unwrap_err();
            assert_eq!(failure.code(), Some(libc::EBADF));

            let second = handle.read(&[ReadRequest::Line]).unwrap().unwrap();
            assert_eq!(second, vec![Some(Value::from("cd"))]);
            assert_eq!(handle.close().unwrap(), Ok(()));
        }

        #[test]
        fn test_write_pipe_waits_for_child() {
            let scratch = Scratch::new();
            let target = scratch.path("piped.txt");
            let command = format!("cat > '{}'", target.display());

            let handle = FileHandle::open_pipe(&command, "w").unwrap().unwrap();
            handle
                .write(&[Value::from("through "), Value::from("the pipe")])
                .unwrap()
                .unwrap();
            assert_eq!(handle.close().unwrap(), Ok(()));

            assert_eq!(scratch.contents("piped.txt"), "through the pipe");
        }

        #[test]
        fn test_exit_status_is_reported_on_close() {
            let handle = FileHandle::open_pipe("exit 3", "r").unwrap().unwrap();

            let failure = handle.close().unwrap().unwrap_err();
            assert_eq!(failure.code(), Some(3));
            assert_eq!(handle.state(), HandleState::Closed);
        }

        #[test]
        fn test_missing_shell_is_soft_failure() {
            let config = IoConfig::default().with_shell("/definitely/not/a/shell", "-c");

            let failure = FileHandle::open_pipe_with("true", "r", &config)
                .unwrap()
                .unwrap_err();
            assert!(failure.message().starts_with("true: "));
            assert_eq!(failure.code(), Some(libc::ENOENT));
        }
    }
}
