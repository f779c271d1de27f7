//! XMP packet dumps from an external metadata reader.

use crate::command::{ToolCommand, DEFAULT_TIMEOUT};
use crate::tools::{get_tool_path, EXIFTOOL};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Reads the raw XMP packet of a file.
pub trait MetadataSource {
    /// The packet bytes, or `None` if the file carries no XMP.
    fn dump_xmp(&self, path: &Path) -> Result<Option<Vec<u8>>>;
}

/// `exiftool -b -XMP`, which prints the packet verbatim and nothing at all
/// when there is none.
#[derive(Debug, Clone)]
pub struct ExiftoolDump {
    program: PathBuf,
    timeout: Duration,
}

impl ExiftoolDump {
    /// Locate exiftool on PATH.
    pub fn new() -> Result<Self> {
        Self::with_config(None)
    }

    /// Use a configured exiftool path, falling back to PATH when `None`.
    pub fn with_config(path: Option<&Path>) -> Result<Self> {
        Ok(Self::with_program(get_tool_path(EXIFTOOL, path)?))
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl MetadataSource for ExiftoolDump {
    fn dump_xmp(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        if !path.exists() {
            return Err(Error::file_not_found(path));
        }

        let output = ToolCommand::new(self.program.clone())
            .args(["-b", "-XMP"])
            .arg(path.to_string_lossy())
            .timeout(self.timeout)
            .run_blocking()?;

        #[cfg(feature = "tracing")]
        tracing::debug!("exiftool returned {} bytes of XMP", output.stdout.len());

        Ok(non_empty(output.stdout))
    }
}

fn non_empty(stdout: Vec<u8>) -> Option<Vec<u8>> {
    if stdout.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        Some(stdout)
    }
}
