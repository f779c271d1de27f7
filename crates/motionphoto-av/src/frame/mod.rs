//! Cover frame extraction.

mod ffmpeg;

pub use ffmpeg::FfmpegFrameExtractor;

use crate::Result;
use std::path::Path;
use std::time::Duration;

/// Produces a still JPEG from a video.
///
/// Implementations must write a complete JPEG to `output` or return an
/// error; a partially written file is never treated as a result. Repeated
/// calls with the same inputs should yield identical bytes.
pub trait FrameSource {
    fn extract_frame(&self, video: &Path, at: Duration, output: &Path) -> Result<()>;
}

impl<T: FrameSource + ?Sized> FrameSource for &T {
    fn extract_frame(&self, video: &Path, at: Duration, output: &Path) -> Result<()> {
        (**self).extract_frame(video, at, output)
    }
}

/// Format a seek position as `HH:MM:SS.mmm`.
pub fn format_timestamp(at: Duration) -> String {
    let total_ms = at.as_millis();
    let ms = total_ms % 1000;
    let secs = (total_ms / 1000) % 60;
    let mins = (total_ms / 60_000) % 60;
    let hours = total_ms / 3_600_000;
    format!("{hours:02}:{mins:02}:{secs:02}.{ms:03}")
}
