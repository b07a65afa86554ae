//! Error types for the animdata library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for clip and placement operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Stream ended in the middle of a record
    #[error("Unexpected end of data while reading {0}")]
    UnexpectedEof(&'static str),

    /// Invalid data structure in the stream
    #[error("Invalid clip structure: {0}")]
    InvalidStructure(String),

    /// Event save-string names a tag the registry does not know
    #[error("Unknown event tag: {0}")]
    UnknownEvent(String),

    /// Parent links loop back on themselves
    #[error("Parent cycle detected at part {0}")]
    ParentCycle(usize),

    /// Value does not fit the fixed-width encoding
    #[error("{field} = {value} does not fit in {bits}-bit {kind} encoding")]
    RangeTruncation {
        field: &'static str,
        value: i32,
        bits: u8,
        kind: &'static str,
    },

    /// Placement definition could not be parsed
    #[error("Invalid placement definition: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 conversion error
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// Whether this error means the clip bytes themselves are malformed.
    ///
    /// Format errors are fatal to a single load; the caller usually skips the
    /// animation rather than retrying.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedEof(_)
                | Self::InvalidStructure(_)
                | Self::UnknownEvent(_)
                | Self::ParentCycle(_)
                | Self::Utf8(_)
        )
    }

    /// Map a short read to [`Error::UnexpectedEof`], keep other I/O errors.
    pub(crate) fn eof_or_io(e: std::io::Error, what: &'static str) -> Self {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            Self::UnexpectedEof(what)
        } else {
            Self::Io(e)
        }
    }
}

/// Result type alias for animdata operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::UnexpectedEof("curve body");
        assert!(e.to_string().contains("curve body"));

        let e = Error::RangeTruncation { field: "x", value: 300, bits: 8, kind: "signed" };
        assert!(e.to_string().contains("300"));
        assert!(e.to_string().contains("8-bit"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_format_error());
    }

    #[test]
    fn test_eof_mapping() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short");
        let err = Error::eof_or_io(io_err, "name");
        assert!(matches!(err, Error::UnexpectedEof("name")));
        assert!(err.is_format_error());
    }
}
