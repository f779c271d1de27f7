//! # motionphoto-av
//!
//! External collaborators for Motion Photo encoding and verification.
//!
//! This crate provides:
//! - Locating ffmpeg and exiftool, honouring configured paths
//! - Running them with a deadline, killing the child when it expires
//! - Grabbing a cover frame from a video ([`FrameSource`])
//! - Dumping a file's XMP packet ([`MetadataSource`])
//! - Per-call scratch directories with atomic output ([`Workspace`])
//!
//! The traits let callers substitute their own implementations, which is
//! how the encoder is tested without ffmpeg installed.
//!
//! ## Features
//!
//! - `tracing` - Enable tracing support

mod error;
pub mod command;
pub mod frame;
pub mod metadata;
pub mod tools;
pub mod workspace;

// Re-exports
pub use command::{ToolCommand, ToolOutput};
pub use error::{Error, Result};
pub use frame::{format_timestamp, FfmpegFrameExtractor, FrameSource};
pub use metadata::{ExiftoolDump, MetadataSource};
pub use tools::{check_tool, check_tools, get_tool_path, require_tool, ToolInfo};
pub use workspace::Workspace;
