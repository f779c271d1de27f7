//! Splitting a Motion Photo back into its image and video.

use crate::error::{Error, Result, Step};
use motionphoto_av::Workspace;
use motionphoto_container::MotionPhotoReader;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOutcome {
    pub primary_length: u64,
    pub video_length: u64,
    pub image: Option<PathBuf>,
    pub video: Option<PathBuf>,
}

/// Write the embedded parts of `path` to the requested destinations.
///
/// Fails if the file has no decodable directory or the directory does not
/// describe the file exactly. With neither destination set, only the
/// lengths are reported.
pub fn extract_file(
    path: &Path,
    image_out: Option<&Path>,
    video_out: Option<&Path>,
) -> Result<ExtractOutcome> {
    let data = std::fs::read(path).map_err(|e| Error::during(Step::ReadInput)(Error::io(path, e)))?;

    let reader = MotionPhotoReader::new(&data).map_err(Error::during(Step::Decode))?;
    let primary = reader.primary().map_err(Error::during(Step::Decode))?;
    let video = reader.video().map_err(Error::during(Step::Decode))?;

    if let Some(sig) = motionphoto_container::mp4::sniff_signature(video) {
        tracing::debug!("Embedded video starts with '{}' box", sig);
    } else {
        tracing::warn!("Embedded video has no recognizable MP4 box signature");
    }

    let image = image_out.map(|dest| write_part(primary, dest)).transpose()?;
    let video_path = video_out.map(|dest| write_part(video, dest)).transpose()?;

    Ok(ExtractOutcome {
        primary_length: primary.len() as u64,
        video_length: video.len() as u64,
        image,
        video: video_path,
    })
}

fn write_part(bytes: &[u8], dest: &Path) -> Result<PathBuf> {
    let written = Workspace::new()
        .and_then(|ws| ws.finalize(bytes, dest))
        .map_err(Error::during(Step::WriteOutput))?;
    tracing::info!("Wrote {} bytes to {:?}", bytes.len(), written);
    Ok(written)
}
