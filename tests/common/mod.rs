//! Shared fixtures for integration tests.
//!
//! Synthetic JPEG and MP4 bytes are enough for the container logic; nothing
//! here decodes pixels or video.

#![allow(dead_code)]

use motionphoto_av::{Error as AvError, FrameSource};
use motionphoto_container::jpeg::{encode_segment, Marker};
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Baseline JPEG of exactly `size` bytes, padded with a comment segment.
pub fn cover_jpeg(size: usize) -> Vec<u8> {
    let scan = [0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00];
    let entropy = [0x5Au8; 64];
    let fixed = 2 + 4 + scan.len() + entropy.len() + 2;

    let mut data = vec![0xFF, 0xD8];
    data.extend(encode_segment(Marker::COM, &vec![b'.'; size - fixed]).unwrap());
    data.extend(scan);
    data.extend(entropy);
    data.extend([0xFF, 0xD9]);
    assert_eq!(data.len(), size);
    data
}

/// ftyp + moov + mdat boxes.
pub fn mp4_bytes() -> Vec<u8> {
    let mut data = vec![0x00, 0x00, 0x00, 0x14];
    data.extend(b"ftypisom\x00\x00\x02\x00mp41");
    data.extend([0x00, 0x00, 0x00, 0x10]);
    data.extend(b"moov");
    data.extend([0x22; 8]);
    let payload: Vec<u8> = (0..8_000u32).map(|i| (i % 251) as u8).collect();
    data.extend(((payload.len() + 8) as u32).to_be_bytes());
    data.extend(b"mdat");
    data.extend(payload);
    data
}

/// Write `bytes` to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Frame source that writes a fixed JPEG, recording where it was asked to.
pub struct FixedFrame {
    pub cover: Vec<u8>,
    pub last_output: std::cell::RefCell<Option<PathBuf>>,
    pub last_timestamp: Cell<Option<Duration>>,
}

impl FixedFrame {
    pub fn new(cover: Vec<u8>) -> Self {
        Self {
            cover,
            last_output: Default::default(),
            last_timestamp: Cell::new(None),
        }
    }

    pub fn scratch_dir(&self) -> Option<PathBuf> {
        self.last_output
            .borrow()
            .as_ref()
            .and_then(|p| p.parent().map(Path::to_path_buf))
    }
}

impl FrameSource for FixedFrame {
    fn extract_frame(&self, _video: &Path, at: Duration, output: &Path) -> motionphoto_av::Result<()> {
        std::fs::write(output, &self.cover)?;
        *self.last_output.borrow_mut() = Some(output.to_path_buf());
        self.last_timestamp.set(Some(at));
        Ok(())
    }
}

/// Frame source that leaves a partial file behind and then fails.
pub struct BrokenFrame;

impl FrameSource for BrokenFrame {
    fn extract_frame(&self, _video: &Path, _at: Duration, output: &Path) -> motionphoto_av::Result<()> {
        std::fs::write(output, [0xFF, 0xD8, 0x00])?;
        Err(AvError::tool_failed("ffmpeg", "exited with status 1: Invalid data"))
    }
}

/// Frame source that times out `failures` times before succeeding.
pub struct FlakyFrame {
    pub cover: Vec<u8>,
    pub failures: Cell<usize>,
    pub calls: Cell<usize>,
}

impl FrameSource for FlakyFrame {
    fn extract_frame(&self, _video: &Path, _at: Duration, output: &Path) -> motionphoto_av::Result<()> {
        self.calls.set(self.calls.get() + 1);
        if self.failures.get() > 0 {
            self.failures.set(self.failures.get() - 1);
            return Err(AvError::ToolTimeout {
                tool: "ffmpeg".into(),
                timeout: Duration::from_secs(1),
            });
        }
        std::fs::write(output, &self.cover)?;
        Ok(())
    }
}
