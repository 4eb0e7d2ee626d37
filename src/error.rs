//! Fatal error conditions
//!
//! Everything here aborts the current operation and surfaces to the embedding
//! runtime's error channel. Recoverable OS failures travel through
//! [`crate::outcome`] instead.

use crate::registry::Slot;

// ============================================================================
// Fatal Errors
// ============================================================================

/// Conditions that abort an operation instead of producing a soft failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IoError {
    /// A value in the given argument position was rejected
    #[error("bad argument #{position} ({message})")]
    BadArgument { position: usize, message: String },

    /// The handle was closed before the operation started
    #[error("attempt to use a closed file")]
    ClosedFile,

    /// A default slot refers to a handle that has since been closed
    #[error("standard {0} file is closed")]
    StandardFileClosed(Slot),

    /// A line iterator was advanced after its handle was closed elsewhere
    #[error("file is already closed")]
    AlreadyClosed,

    /// Hard I/O error raised while advancing a line iterator
    #[error("{message}")]
    Stream { message: String, code: Option<i32> },
}

impl IoError {
    /// Build an argument error for the 1-based position `position`
    pub fn bad_argument(position: usize, message: impl Into<String>) -> Self {
        IoError::BadArgument {
            position,
            message: message.into(),
        }
    }

    /// OS error code carried by the condition, if any
    pub fn code(&self) -> Option<i32> {
        match self {
            IoError::Stream { code, .. } => *code,
            _ => None,
        }
    }
}

/// Result type for operations that may raise a fatal condition
pub type Result<T> = std::result::Result<T, IoError>;
