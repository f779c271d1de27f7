//! External tool detection.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Frame extractor executable.
pub const FFMPEG: &str = "ffmpeg";
/// Metadata dump executable.
pub const EXIFTOOL: &str = "exiftool";

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Check if a tool is available using the given version argument.
///
/// # Example
///
/// ```no_run
/// use motionphoto_av::check_tool;
///
/// let info = check_tool("exiftool", "-ver");
/// if info.available {
///     println!("exiftool version: {:?}", info.version);
/// }
/// ```
pub fn check_tool(name: &str, version_arg: &str) -> ToolInfo {
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => ToolInfo {
            name: name.to_string(),
            available: true,
            version: String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.trim().to_string()),
            path: which::which(name).ok(),
        },
        _ => ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Check the tools the encoder and verifier shell out to.
pub fn check_tools() -> Vec<ToolInfo> {
    vec![check_tool(FFMPEG, "-version"), check_tool(EXIFTOOL, "-ver")]
}

/// Require that a tool is available on PATH, returning its path.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Get the path to a tool, preferring a configured path over PATH lookup.
///
/// A configured path that does not exist is an error rather than a silent
/// fallback to PATH.
pub fn get_tool_path(name: &str, config_path: Option<&Path>) -> Result<PathBuf> {
    match config_path {
        Some(path) if path.exists() => Ok(path.to_path_buf()),
        Some(path) => Err(Error::tool_not_found(format!(
            "{name} (configured at {})",
            path.display()
        ))),
        None => require_tool(name),
    }
}
