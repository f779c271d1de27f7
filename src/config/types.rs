use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub encode: EncodeConfig,

    #[serde(default)]
    pub verify: VerifyConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EncodeConfig {
    /// Position of the cover frame in the video, in milliseconds
    #[serde(default = "default_frame_timestamp")]
    pub frame_timestamp_ms: u64,

    /// Replaces the video's extension when no output path is given
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,

    /// Correction passes allowed for the declared primary length to settle
    #[serde(default = "default_max_sizing_attempts")]
    pub max_sizing_attempts: usize,

    /// Parent directory for per-call scratch directories (default: system temp)
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

fn default_frame_timestamp() -> u64 {
    500
}

fn default_output_suffix() -> String {
    ".MP.jpg".to_string()
}

fn default_max_sizing_attempts() -> usize {
    motionphoto_container::DEFAULT_MAX_SIZING_ATTEMPTS
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            frame_timestamp_ms: default_frame_timestamp(),
            output_suffix: default_output_suffix(),
            max_sizing_attempts: default_max_sizing_attempts(),
            scratch_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VerifyConfig {
    #[serde(default)]
    pub metadata_source: MetadataSourceKind,
}

/// Where `verify` reads the XMP packet from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataSourceKind {
    /// Scan the JPEG header directly
    #[default]
    Scan,
    /// Ask exiftool for the packet
    Exiftool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub exiftool_path: Option<PathBuf>,

    /// Deadline for each external tool invocation
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            exiftool_path: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}
