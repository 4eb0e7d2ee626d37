//! Open-mode parsing
//!
//! Accepted grammar, checked before any OS call:
//!
//! ```text
//! file mode ::= [rwa] '+'? 'b'*
//! pipe mode ::= [rw]
//! ```
//!
//! - `r`: read (file must exist)
//! - `w`: write, create and truncate
//! - `a`: write at end, create
//! - `+`: update, adds the missing direction
//! - `b`: binary, accepted and ignored on every supported platform

use std::fs::OpenOptions;

/// Parsed open mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenMode {
    pub read: bool,
    pub write: bool,
    pub append: bool,
    pub truncate: bool,
    pub binary: bool,
}

/// Direction of a process pipe, relative to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeMode {
    /// Read the child's standard output
    Read,
    /// Write to the child's standard input
    Write,
}

/// Error parsing a mode string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseModeError {
    #[error("mode string cannot be empty")]
    Empty,

    #[error("invalid mode: '{0}'")]
    InvalidMode(String),
}

impl OpenMode {
    /// Parse a file mode string
    pub fn parse(mode: &str) -> Result<Self, ParseModeError> {
        let bytes = mode.as_bytes();
        let (&primary, rest) = bytes.split_first().ok_or(ParseModeError::Empty)?;

        let mut result = match primary {
            b'r' => OpenMode {
                read: true,
                write: false,
                append: false,
                truncate: false,
                binary: false,
            },
            b'w' => OpenMode {
                read: false,
                write: true,
                append: false,
                truncate: true,
                binary: false,
            },
            b'a' => OpenMode {
                read: false,
                write: true,
                append: true,
                truncate: false,
                binary: false,
            },
            _ => return Err(ParseModeError::InvalidMode(mode.to_string())),
        };

        let rest = match rest.split_first() {
            Some((b'+', tail)) => {
                result.read = true;
                result.write = true;
                tail
            }
            _ => rest,
        };

        if !rest.iter().all(|&b| b == b'b') {
            return Err(ParseModeError::InvalidMode(mode.to_string()));
        }
        result.binary = !rest.is_empty();

        Ok(result)
    }

    /// Convert to std::fs::OpenOptions flags
    pub fn to_open_options(&self) -> OpenOptions {
        let mut opts = OpenOptions::new();

        opts.read(self.read)
            .write(self.write && !self.append)
            .append(self.append)
            .truncate(self.truncate)
            .create(self.truncate || self.append);

        opts
    }
}

impl PipeMode {
    /// Parse a pipe mode string: exactly `r` or `w`
    pub fn parse(mode: &str) -> Result<Self, ParseModeError> {
        match mode {
            "" => Err(ParseModeError::Empty),
            "r" => Ok(PipeMode::Read),
            "w" => Ok(PipeMode::Write),
            other => Err(ParseModeError::InvalidMode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::Scratch;

    #[test]
    fn test_primary_modes() {
        let r = OpenMode::parse("r").unwrap();
        assert!(r.read && !r.write && !r.truncate);

        let w = OpenMode::parse("w").unwrap();
        assert!(!w.read && w.write && w.truncate && !w.append);

        let a = OpenMode::parse("a").unwrap();
        assert!(!a.read && a.write && a.append && !a.truncate);
    }

    #[test]
    fn test_update_and_binary() {
        let r_plus = OpenMode::parse("r+").unwrap();
        assert!(r_plus.read && r_plus.write && !r_plus.truncate);

        let w_plus_b = OpenMode::parse("w+b").unwrap();
        assert!(w_plus_b.read && w_plus_b.write && w_plus_b.truncate && w_plus_b.binary);

        let rb = OpenMode::parse("rb").unwrap();
        assert!(rb.read && rb.binary);
    }

    #[test]
    fn test_rejected_modes() {
        assert_eq!(OpenMode::parse(""), Err(ParseModeError::Empty));
        assert!(OpenMode::parse("x").is_err());
        assert!(OpenMode::parse("rw").is_err());
        assert!(OpenMode::parse("r++").is_err());
        assert!(OpenMode::parse("rb+").is_err());
        assert!(OpenMode::parse("+r").is_err());
    }

    #[test]
    fn test_update_read_does_not_create() {
        let scratch = Scratch::new();
        let path = scratch.path("absent.txt");

        assert!(OpenMode::parse("r+").unwrap().to_open_options().open(&path).is_err());
        assert!(OpenMode::parse("a+").unwrap().to_open_options().open(&path).is_ok());
    }

    #[test]
    fn test_pipe_modes() {
        assert_eq!(PipeMode::parse("r"), Ok(PipeMode::Read));
        assert_eq!(PipeMode::parse("w"), Ok(PipeMode::Write));
        assert!(PipeMode::parse("r+").is_err());
        assert!(PipeMode::parse("a").is_err());
        assert_eq!(PipeMode::parse(""), Err(ParseModeError::Empty));
    }
}
