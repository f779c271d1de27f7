//! Error types for motionphoto-av.

use motionphoto_container::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while driving external tools.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required external tool is not available.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// An external tool failed to execute or exited non-zero.
    #[error("tool execution failed: {tool}: {message}")]
    ToolFailed { tool: String, message: String },

    /// An external tool ran past its deadline and was killed.
    #[error("{tool} timed out after {timeout:?}")]
    ToolTimeout { tool: String, timeout: Duration },

    /// The specified file was not found.
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Scratch directory or output finalization error.
    #[error("workspace error: {0}")]
    Workspace(String),
}

impl Error {
    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a tool execution failed error.
    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Whether retrying the same invocation could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::ToolTimeout { .. })
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ToolNotFound { .. } | Error::ToolFailed { .. } | Error::ToolTimeout { .. } => {
                ErrorKind::ExternalToolFailure
            }
            Error::FileNotFound { .. } => ErrorKind::InvalidInput,
            Error::Io(_) | Error::Workspace(_) => ErrorKind::IoFailure,
        }
    }
}
