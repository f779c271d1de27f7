//! Error types for motionphoto-container.

use std::fmt;
use std::io;
use thiserror::Error;

/// Result type for motionphoto-container operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of a failure, shared by every crate in the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "snake_case"))]
pub enum ErrorKind {
    /// Missing file, wrong magic bytes, bad filename.
    InvalidInput,
    /// Frame extractor or metadata service unavailable, failed or timed out.
    ExternalToolFailure,
    /// Malformed segment, missing or invalid XMP directory, oversized XMP.
    FormatViolation,
    /// Declared lengths disagree with the data, or sizing did not converge.
    Inconsistency,
    /// Read/write/disk errors.
    IoFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::ExternalToolFailure => "external tool failure",
            ErrorKind::FormatViolation => "format violation",
            ErrorKind::Inconsistency => "inconsistency",
            ErrorKind::IoFailure => "I/O failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for motionphoto-container operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Input that is not what the caller promised (e.g. an empty video).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed JPEG or XMP structure.
    #[error("Format violation{}: {message}", offset.map(|o| format!(" at offset {o}")).unwrap_or_default())]
    FormatViolation {
        offset: Option<usize>,
        message: String,
    },

    /// Declared structure disagrees with the actual bytes.
    #[error("Inconsistency: {0}")]
    Inconsistency(String),

    /// Buffer too small for operation.
    #[error("Buffer underflow at offset {offset}: need {need} bytes, have {have}")]
    BufferUnderflow {
        offset: usize,
        need: usize,
        have: usize,
    },
}

impl Error {
    /// Create a format violation without a known offset.
    pub fn format_violation(msg: impl Into<String>) -> Self {
        Self::FormatViolation {
            offset: None,
            message: msg.into(),
        }
    }

    /// Create a format violation at a byte offset.
    pub fn format_violation_at(offset: usize, msg: impl Into<String>) -> Self {
        Self::FormatViolation {
            offset: Some(offset),
            message: msg.into(),
        }
    }

    /// Create an inconsistency error.
    pub fn inconsistency(msg: impl Into<String>) -> Self {
        Self::Inconsistency(msg.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::IoFailure,
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::FormatViolation { .. } | Error::BufferUnderflow { .. } => {
                ErrorKind::FormatViolation
            }
            Error::Inconsistency(_) => ErrorKind::Inconsistency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_violation_display_includes_offset() {
        let err = Error::format_violation_at(42, "segment length runs past end");
        assert_eq!(
            err.to_string(),
            "Format violation at offset 42: segment length runs past end"
        );
        assert_eq!(err.kind(), ErrorKind::FormatViolation);
    }

    #[test]
    fn test_format_violation_display_without_offset() {
        let err = Error::format_violation("no container directory");
        assert_eq!(err.to_string(), "Format violation: no container directory");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(Error::inconsistency("x").kind(), ErrorKind::Inconsistency);
        assert_eq!(Error::invalid_input("x").kind(), ErrorKind::InvalidInput);
        let io = Error::from(io::Error::new(io::ErrorKind::Other, "disk"));
        assert_eq!(io.kind(), ErrorKind::IoFailure);
    }
}
