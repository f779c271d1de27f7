//! Caller-facing errors for the encode, verify and extract pipelines.

use motionphoto_container::ErrorKind;
use std::fmt;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ReadInput,
    PrepareScratch,
    ExtractFrame,
    Assemble,
    WriteOutput,
    DumpMetadata,
    Decode,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::ReadInput => "read input",
            Step::PrepareScratch => "prepare scratch directory",
            Step::ExtractFrame => "extract cover frame",
            Step::Assemble => "assemble motion photo",
            Step::WriteOutput => "write output",
            Step::DumpMetadata => "dump metadata",
            Step::Decode => "decode motion photo",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A lower-level failure tagged with the stage that hit it.
    #[error("{step} failed: {source}")]
    Step {
        step: Step,
        #[source]
        source: Box<Error>,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Container(#[from] motionphoto_container::Error),

    #[error(transparent)]
    Tool(#[from] motionphoto_av::Error),
}

impl Error {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Map an I/O error on `path`, treating a missing file as bad input.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    /// Wrap errors produced during `step`, for use with `map_err`.
    pub fn during<E: Into<Error>>(step: Step) -> impl FnOnce(E) -> Error {
        move |e| Error::Step {
            step,
            source: Box::new(e.into()),
        }
    }

    /// The innermost stage, if the error was tagged with one.
    pub fn step(&self) -> Option<Step> {
        match self {
            Error::Step { step, .. } => Some(*step),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Step { source, .. } => source.kind(),
            Error::InvalidInput(_) | Error::NotFound { .. } => ErrorKind::InvalidInput,
            Error::Io { .. } => ErrorKind::IoFailure,
            Error::Container(e) => e.kind(),
            Error::Tool(e) => e.kind(),
        }
    }
}
