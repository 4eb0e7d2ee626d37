//! Result protocol shared by every public operation
//!
//! An operation either succeeds with a value or fails softly with a
//! human-readable message and, when the OS reported one, its error code.

use std::fmt;
use std::io;

/// Soft failure: message plus the OS error code captured at the failing call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    message: String,
    code: Option<i32>,
}

impl Failure {
    /// Create a failure from an explicit message and code
    pub fn new(message: impl Into<String>, code: Option<i32>) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }

    /// Package an OS error, optionally prefixed with the path it concerns
    ///
    /// The code is read from `err` directly, so nothing that runs after the
    /// failing call can overwrite it.
    pub fn from_io(err: &io::Error, path: Option<&str>) -> Self {
        let code = err.raw_os_error();
        let description = describe(err);
        let message = match path {
            Some(path) => format!("{path}: {description}"),
            None => description,
        };
        Self { message, code }
    }

    /// Human-readable description
    pub fn message(&self) -> &str {
        &self.message
    }

    /// OS error code, when the failure came from the OS
    pub fn code(&self) -> Option<i32> {
        self.code
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Failure {}

/// Success value or soft failure
pub type Outcome<T> = std::result::Result<T, Failure>;

/// OS description of `err` without std's trailing `(os error N)` marker
pub(crate) fn describe(err: &io::Error) -> String {
    let text = err.to_string();
    match err.raw_os_error() {
        Some(code) => text
            .strip_suffix(&format!(" (os error {code})"))
            .map(str::to_owned)
            .unwrap_or(text),
        None => text,
    }
}
