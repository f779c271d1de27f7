//! Per-call scratch space and atomic output.

use crate::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

/// Uniquely named scratch directory for one encode.
///
/// The directory and everything in it is removed when the workspace is
/// dropped, whichever way the caller exits.
///
/// # Example
///
/// ```no_run
/// use motionphoto_av::Workspace;
/// use std::path::Path;
///
/// let workspace = Workspace::new()?;
/// let cover = workspace.temp_file("cover.jpg");
/// // ... write intermediate files under the workspace ...
/// workspace.finalize(b"final bytes", Path::new("out.MP.jpg"))?;
/// # Ok::<(), motionphoto_av::Error>(())
/// ```
#[derive(Debug)]
pub struct Workspace {
    temp_dir: TempDir,
}

impl Workspace {
    /// Create a workspace under the system temp directory.
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix("motionphoto-")
            .tempdir()
            .map_err(|e| Error::Workspace(format!("failed to create scratch directory: {e}")))?;
        Ok(Self::from_dir(temp_dir))
    }

    /// Create a workspace inside `parent`, which must exist.
    pub fn new_in(parent: &Path) -> Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix("motionphoto-")
            .tempdir_in(parent)
            .map_err(|e| {
                Error::Workspace(format!(
                    "failed to create scratch directory in {}: {e}",
                    parent.display()
                ))
            })?;
        Ok(Self::from_dir(temp_dir))
    }

    fn from_dir(temp_dir: TempDir) -> Self {
        #[cfg(feature = "tracing")]
        tracing::debug!("Created scratch directory {:?}", temp_dir.path());
        Self { temp_dir }
    }

    /// Get the temp directory path.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a temp file path with the given name.
    pub fn temp_file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Write `data` to `destination` atomically, then discard the scratch
    /// directory.
    ///
    /// The bytes go to a temp file beside the destination which is renamed
    /// over it once fully written. On failure the temp file is removed and an
    /// existing destination is left as it was.
    pub fn finalize(self, data: &[u8], destination: &Path) -> Result<PathBuf> {
        let parent = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut staged = NamedTempFile::new_in(parent).map_err(|e| {
            Error::Workspace(format!(
                "failed to stage output in {}: {e}",
                parent.display()
            ))
        })?;
        staged.write_all(data)?;
        staged.as_file().sync_all()?;
        staged.persist(destination).map_err(|e| {
            Error::Workspace(format!(
                "failed to move output to {}: {}",
                destination.display(),
                e.error
            ))
        })?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Wrote {} bytes to {:?}, removing {:?}",
            data.len(),
            destination,
            self.temp_dir.path()
        );

        Ok(destination.to_path_buf())
    }
}
