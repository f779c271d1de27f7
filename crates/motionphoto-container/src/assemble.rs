//! Motion Photo assembly.
//!
//! The Primary item's declared length has to equal the size of the cover image
//! *after* the XMP segment holding that length has been injected. The length
//! is found by iteration: inject a provisional packet, measure, re-inject into
//! the untouched cover with the measured size, and repeat until the measurement
//! matches the declaration. A change in the number of digits can move the
//! target once; more than a few passes means something is wrong.

use crate::jpeg;
use crate::xmp::{ContainerDirectory, XmpPacket};
use crate::{Error, Result};
use std::borrow::Cow;

/// Fewest correction passes that always settle. The declared length can
/// gain a digit on the first correction and once more on the second.
pub const MIN_SIZING_ATTEMPTS: usize = 3;

/// Default number of correction passes after the provisional injection.
pub const DEFAULT_MAX_SIZING_ATTEMPTS: usize = MIN_SIZING_ATTEMPTS;

/// An assembled Motion Photo: XMP-injected cover followed by the video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionPhoto {
    /// Complete file contents.
    pub data: Vec<u8>,
    /// Length of the JPEG part, as declared in the directory.
    pub primary_length: u64,
    /// Length of the video part, as declared in the directory.
    pub video_length: u64,
    /// Correction passes needed for the declared length to settle.
    pub sizing_passes: usize,
}

impl MotionPhoto {
    /// The XMP-injected cover image.
    pub fn primary(&self) -> &[u8] {
        &self.data[..self.primary_length as usize]
    }

    /// The embedded video bytes.
    pub fn video(&self) -> &[u8] {
        &self.data[self.primary_length as usize..]
    }

    /// The directory written into the file.
    pub fn directory(&self) -> ContainerDirectory {
        ContainerDirectory::motion_photo(self.primary_length, self.video_length)
    }
}

/// Builds Motion Photos from a cover image and a video.
#[derive(Debug, Clone)]
pub struct Assembler {
    max_sizing_attempts: usize,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembler {
    /// Create an assembler with the default sizing budget.
    pub fn new() -> Self {
        Self {
            max_sizing_attempts: DEFAULT_MAX_SIZING_ATTEMPTS,
        }
    }

    /// Set the number of correction passes allowed, never below
    /// [`MIN_SIZING_ATTEMPTS`].
    pub fn max_sizing_attempts(mut self, attempts: usize) -> Self {
        self.max_sizing_attempts = attempts.max(MIN_SIZING_ATTEMPTS);
        self
    }

    /// Assemble `cover` and `video` into one Motion Photo.
    ///
    /// The cover must be a JPEG; an XMP segment already present in it is
    /// dropped and replaced. Nothing after the cover's start of scan is
    /// touched.
    pub fn assemble(&self, cover: &[u8], video: &[u8]) -> Result<MotionPhoto> {
        if video.is_empty() {
            return Err(Error::invalid_input("video is empty"));
        }

        let layout = jpeg::parse(cover)?;
        let cover: Cow<'_, [u8]> = if layout.xmp_segment().is_some() {
            #[cfg(feature = "tracing")]
            tracing::debug!("Cover image already carries XMP, replacing it");
            Cow::Owned(jpeg::remove_xmp_segment(cover)?)
        } else {
            Cow::Borrowed(cover)
        };

        let video_length = video.len() as u64;

        let provisional = inject(&cover, cover.len() as u64, video_length)?;
        let (primary, primary_length, passes) = converge(
            self.max_sizing_attempts,
            provisional.len() as u64,
            |declared| inject(&cover, declared, video_length),
        )?;

        let mut data = Vec::with_capacity(primary.len() + video.len());
        data.extend_from_slice(&primary);
        data.extend_from_slice(video);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Assembled Motion Photo: primary {} bytes, video {} bytes, {} sizing pass(es)",
            primary_length,
            video_length,
            passes
        );

        Ok(MotionPhoto {
            data,
            primary_length,
            video_length,
            sizing_passes: passes,
        })
    }
}

/// Assemble with default settings.
pub fn assemble(cover: &[u8], video: &[u8]) -> Result<MotionPhoto> {
    Assembler::new().assemble(cover, video)
}

/// Cover image with an XMP segment declaring the given lengths.
fn inject(cover: &[u8], primary_length: u64, video_length: u64) -> Result<Vec<u8>> {
    let packet = XmpPacket::new(ContainerDirectory::motion_photo(primary_length, video_length));
    let segment = jpeg::encode_xmp_segment(&packet.to_bytes()?)?;
    jpeg::insert_segment_after_soi(cover, &segment)
}

/// Re-render with the last measured size until rendering at `declared`
/// produces exactly `declared` bytes.
fn converge<F>(max_attempts: usize, mut declared: u64, mut render: F) -> Result<(Vec<u8>, u64, usize)>
where
    F: FnMut(u64) -> Result<Vec<u8>>,
{
    for pass in 1..=max_attempts {
        let rendered = render(declared)?;
        let measured = rendered.len() as u64;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Sizing pass {}: declared {} bytes, measured {} bytes",
            pass,
            declared,
            measured
        );

        if measured == declared {
            return Ok((rendered, declared, pass));
        }
        declared = measured;
    }

    Err(Error::inconsistency(format!(
        "primary length did not converge after {max_attempts} attempts (last measured {declared} bytes)"
    )))
}
