//! ffmpeg-backed frame grabs.

use super::{format_timestamp, FrameSource};
use crate::command::{ToolCommand, DEFAULT_TIMEOUT};
use crate::tools::{get_tool_path, FFMPEG};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Grabs a single high-quality JPEG frame with ffmpeg.
///
/// Metadata copying is disabled and bit-exact flags are set so the same input
/// and timestamp always produce the same bytes.
#[derive(Debug, Clone)]
pub struct FfmpegFrameExtractor {
    program: PathBuf,
    timeout: Duration,
}

impl FfmpegFrameExtractor {
    /// Locate ffmpeg on PATH.
    pub fn new() -> Result<Self> {
        Self::with_config(None)
    }

    /// Use a configured ffmpeg path, falling back to PATH when `None`.
    pub fn with_config(path: Option<&Path>) -> Result<Self> {
        Ok(Self::with_program(get_tool_path(FFMPEG, path)?))
    }

    /// Use an explicit executable without checking it exists.
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

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments passed to ffmpeg for one grab.
    pub fn args(video: &Path, at: Duration, output: &Path) -> Vec<String> {
        vec![
            "-y".into(),
            "-v".into(),
            "error".into(),
            "-ss".into(),
            format_timestamp(at),
            "-i".into(),
            video.to_string_lossy().to_string(),
            "-frames:v".into(),
            "1".into(),
            "-q:v".into(),
            "2".into(),
            "-map_metadata".into(),
            "-1".into(),
            "-fflags".into(),
            "+bitexact".into(),
            "-flags:v".into(),
            "+bitexact".into(),
            "-f".into(),
            "image2".into(),
            output.to_string_lossy().to_string(),
        ]
    }
}

impl FrameSource for FfmpegFrameExtractor {
    fn extract_frame(&self, video: &Path, at: Duration, output: &Path) -> Result<()> {
        if !video.exists() {
            return Err(Error::file_not_found(video));
        }

        ToolCommand::new(self.program.clone())
            .args(Self::args(video, at, output))
            .timeout(self.timeout)
            .run_blocking()?;

        // ffmpeg exits 0 without writing anything when the seek lands past the end.
        let written = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
        if written == 0 {
            return Err(Error::tool_failed(
                FFMPEG,
                format!(
                    "no frame at {} in {}",
                    format_timestamp(at),
                    video.display()
                ),
            ));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Extracted {} byte frame at {} from {}",
            written,
            format_timestamp(at),
            video.display()
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_shape() {
        let args = FfmpegFrameExtractor::args(
            Path::new("/in/clip.mp4"),
            Duration::from_millis(500),
            Path::new("/tmp/cover.jpg"),
        );
        let joined = args.join(" ");
        assert!(joined.starts_with("-y -v error -ss 00:00:00.500 -i /in/clip.mp4"));
        assert!(joined.contains("-frames:v 1"));
        assert!(joined.contains("-map_metadata -1"));
        assert!(joined.ends_with("-f image2 /tmp/cover.jpg"));
    }

    #[test]
    fn test_missing_video() {
        let extractor = FfmpegFrameExtractor::with_program("ffmpeg");
        let err = extractor
            .extract_frame(
                Path::new("/definitely/not/here.mp4"),
                Duration::ZERO,
                Path::new("/tmp/out.jpg"),
            )
            .unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_missing_executable() {
        let video = tempfile::NamedTempFile::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let extractor = FfmpegFrameExtractor::with_program("nonexistent_ffmpeg_12345");
        let err = extractor
            .extract_frame(video.path(), Duration::ZERO, &dir.path().join("out.jpg"))
            .unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }
}
