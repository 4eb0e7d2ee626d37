//! Uniform file handles over regular files, child-process pipes and the
//! standard streams.
//!
//! This crate provides:
//! - [`FileHandle`] with a close strategy fixed at construction
//!   (Regular, Pipe, NonClosable)
//! - Read and write dispatchers speaking the [`Outcome`] result protocol
//! - Restartable line iteration with optional handle ownership
//! - A process-wide [`Registry`] of default input/output handles
//!
//! Fatal conditions (bad arguments, closed handles) are [`IoError`]s; OS
//! failures are soft [`Failure`]s the caller can branch on.

pub mod config;
pub mod error;
pub mod handle;
pub mod lines;
pub mod logging;
pub mod outcome;
pub mod read;
pub mod registry;
pub mod value;
pub mod write;

#[cfg(test)]
mod test_utils;

pub use config::IoConfig;
pub use error::{IoError, Result};
pub use handle::{
    BufferMode, CloseStrategy, FileHandle, HandleState, StandardStream, Whence, identity_state,
};
pub use lines::{Lines, lines_path};
pub use outcome::{Failure, Outcome};
pub use read::{ReadRequest, ReadResults};
pub use registry::{Rebind, Registry, Slot};
pub use value::{Value, format_number};
