//! Video file to Motion Photo file.

use crate::config::EncodeConfig;
use crate::error::{Error, Result, Step};
use motionphoto_av::{FrameSource, Workspace};
use motionphoto_container::Assembler;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// Where in the video the cover frame is taken.
    pub frame_timestamp: Duration,
    /// Suffix replacing the video's extension when no output is given.
    pub output_suffix: String,
    pub max_sizing_attempts: usize,
    /// Parent for the per-call scratch directory.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::from_config(&EncodeConfig::default())
    }
}

impl EncodeOptions {
    pub fn from_config(config: &EncodeConfig) -> Self {
        Self {
            frame_timestamp: Duration::from_millis(config.frame_timestamp_ms),
            output_suffix: config.output_suffix.clone(),
            max_sizing_attempts: config.max_sizing_attempts.max(1),
            scratch_dir: config.scratch_dir.clone(),
        }
    }
}

/// What an encode produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOutcome {
    pub output: PathBuf,
    pub primary_length: u64,
    pub video_length: u64,
    pub sizing_passes: usize,
}

/// `clip.mp4` becomes `clip.MP.jpg` (for the default suffix), beside the video.
pub fn default_output_path(video: &Path, suffix: &str) -> Result<PathBuf> {
    let stem = video
        .file_stem()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::invalid_input(format!("no file name in {}", video.display())))?;

    let mut name = stem.to_os_string();
    name.push(suffix);
    Ok(video.with_file_name(name))
}

/// Encode `video` into a Motion Photo whose cover is a frame of the video.
///
/// The output is written atomically: on any failure nothing is left at the
/// output path (an existing file there is untouched) and the scratch
/// directory is removed.
pub fn encode_file<F: FrameSource + ?Sized>(
    frames: &F,
    video: &Path,
    output: Option<&Path>,
    options: &EncodeOptions,
) -> Result<EncodeOutcome> {
    let video_bytes =
        std::fs::read(video).map_err(|e| Error::during(Step::ReadInput)(Error::io(video, e)))?;
    if video_bytes.is_empty() {
        return Err(Error::during(Step::ReadInput)(Error::invalid_input(format!(
            "{} is empty",
            video.display()
        ))));
    }

    let output = match output {
        Some(path) => path.to_path_buf(),
        None => default_output_path(video, &options.output_suffix)?,
    };
    if output == video || resolves_to(&output, video) {
        return Err(Error::invalid_input(format!(
            "output {} would overwrite the input video {}",
            output.display(),
            video.display()
        )));
    }

    tracing::info!("Encoding {:?} -> {:?}", video, output);

    let workspace = match &options.scratch_dir {
        Some(dir) => Workspace::new_in(dir),
        None => Workspace::new(),
    }
    .map_err(Error::during(Step::PrepareScratch))?;

    let cover_path = workspace.temp_file("cover.jpg");
    extract_cover(frames, video, options.frame_timestamp, &cover_path)
        .map_err(Error::during(Step::ExtractFrame))?;
    let cover = std::fs::read(&cover_path)
        .map_err(|e| Error::during(Step::ExtractFrame)(Error::io(&cover_path, e)))?;

    tracing::debug!("Cover frame is {} bytes", cover.len());

    let photo = Assembler::new()
        .max_sizing_attempts(options.max_sizing_attempts)
        .assemble(&cover, &video_bytes)
        .map_err(Error::during(Step::Assemble))?;

    workspace
        .finalize(&photo.data, &output)
        .map_err(Error::during(Step::WriteOutput))?;

    tracing::info!(
        "Wrote {:?}: primary {} bytes + video {} bytes",
        output,
        photo.primary_length,
        photo.video_length
    );

    Ok(EncodeOutcome {
        output,
        primary_length: photo.primary_length,
        video_length: photo.video_length,
        sizing_passes: photo.sizing_passes,
    })
}

/// Whether `output` names the same file as the existing `target` once `..`,
/// relative components and symlinks are resolved. The output itself may not
/// exist yet, in which case its parent directory is resolved instead.
fn resolves_to(output: &Path, target: &Path) -> bool {
    let Ok(target) = target.canonicalize() else {
        return false;
    };
    if let Ok(existing) = output.canonicalize() {
        return existing == target;
    }

    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (parent.canonicalize(), output.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name) == target,
        _ => false,
    }
}

/// One retry when the extractor timed out; other failures are final.
fn extract_cover<F: FrameSource + ?Sized>(
    frames: &F,
    video: &Path,
    at: Duration,
    output: &Path,
) -> motionphoto_av::Result<()> {
    match frames.extract_frame(video, at, output) {
        Err(e) if e.is_retryable() => {
            tracing::warn!("{}, retrying once", e);
            frames.extract_frame(video, at, output)
        }
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/videos/clip.mp4"), ".MP.jpg").unwrap(),
            PathBuf::from("/videos/clip.MP.jpg")
        );
        assert_eq!(
            default_output_path(Path::new("clip"), ".MP.jpg").unwrap(),
            PathBuf::from("clip.MP.jpg")
        );
        assert_eq!(
            default_output_path(Path::new("a.b.mov"), "_motion.jpeg").unwrap(),
            PathBuf::from("a.b_motion.jpeg")
        );
    }

    #[test]
    fn test_default_output_path_without_name() {
        let err = default_output_path(Path::new("/"), ".MP.jpg").unwrap_err();
        assert_eq!(err.kind(), motionphoto_container::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_resolves_to_aliases() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("clip.mp4");
        std::fs::write(&video, b"video").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        assert!(resolves_to(&dir.path().join("sub/../clip.mp4"), &video));
        assert!(resolves_to(&dir.path().join("./clip.mp4"), &video));
        assert!(!resolves_to(&dir.path().join("clip.MP.jpg"), &video));
        assert!(!resolves_to(&dir.path().join("sub/clip.mp4"), &video));
        assert!(!resolves_to(&dir.path().join("missing/../x.jpg"), &video));
    }

    #[test]
    fn test_options_from_config() {
        let config = EncodeConfig {
            frame_timestamp_ms: 1500,
            ..EncodeConfig::default()
        };
        let options = EncodeOptions::from_config(&config);
        assert_eq!(options.frame_timestamp, Duration::from_millis(1500));
        assert_eq!(options.output_suffix, ".MP.jpg");
        assert_eq!(options.max_sizing_attempts, 3);
    }
}
