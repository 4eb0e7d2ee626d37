//! Write dispatcher
//!
//! Every value is attempted, even after an earlier one failed; the call
//! reports failure if any of them did, carrying the most recent OS error.

use crate::error::Result;
use crate::handle::FileHandle;
use crate::handle::stream::NativeStream;
use crate::outcome::{Failure, Outcome};
use crate::value::Value;

impl FileHandle {
    /// Write `values` in order; numbers use the canonical text form
    pub fn write(&self, values: &[Value]) -> Result<Outcome<()>> {
        self.with_stream(|stream| write_values(stream, values))
    }
}

pub(crate) fn write_values(stream: &mut NativeStream, values: &[Value]) -> Outcome<()> {
    let mut last_error = None;
    for value in values {
        if let Err(err) = stream.write_bytes(&value.to_bytes()) {
            last_error = Some(err);
        }
    }

    match last_error {
        Some(err) => Err(Failure::from_io(&err, None)),
        None => Ok(()),
    }
}
