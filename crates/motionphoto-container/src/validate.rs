//! Conformance checks for Motion Photo files.
//!
//! Every check runs regardless of the outcome of the others, so a file that is
//! a plain JPEG still gets a complete report.

use crate::jpeg::{self, SOI};
use crate::mp4;
use crate::xmp::{
    parse_camera_fields, parse_directory, CameraFields, ContainerDirectory, Semantic, MIME_JPEG,
    MIME_MP4,
};
use crate::{ErrorKind, Result};
use std::fmt;

/// File name suffix expected on Motion Photos.
pub const MOTION_PHOTO_SUFFIX: &str = ".MP.jpg";

/// Identifies one conformance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "snake_case"))]
pub enum CheckName {
    Filename,
    JpegType,
    XmpMetadata,
    ContainerDirectory,
    FileStructure,
}

impl CheckName {
    /// All checks in report order.
    pub const ALL: [CheckName; 5] = [
        CheckName::Filename,
        CheckName::JpegType,
        CheckName::XmpMetadata,
        CheckName::ContainerDirectory,
        CheckName::FileStructure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckName::Filename => "filename",
            CheckName::JpegType => "jpeg_type",
            CheckName::XmpMetadata => "xmp_metadata",
            CheckName::ContainerDirectory => "container_directory",
            CheckName::FileStructure => "file_structure",
        }
    }
}

impl fmt::Display for CheckName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct CheckResult {
    pub name: CheckName,
    pub passed: bool,
    pub detail: String,
    /// Failure classification, `None` when the check passed.
    pub kind: Option<ErrorKind>,
}

impl CheckResult {
    fn pass(name: CheckName, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed: true,
            detail: detail.into(),
            kind: None,
        }
    }

    fn fail(name: CheckName, kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed: false,
            detail: detail.into(),
            kind: Some(kind),
        }
    }
}

/// Full conformance report for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct ValidationReport {
    pub file_name: String,
    pub file_size: u64,
    pub checks: Vec<CheckResult>,
    /// Informational hints that do not affect the verdict.
    pub notes: Vec<String>,
    pub camera: Option<CameraFields>,
    pub directory: Option<ContainerDirectory>,
    pub passed: bool,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn check(&self, name: CheckName) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

/// Where the XMP packet under test came from.
#[derive(Debug, Clone, Copy)]
pub enum XmpSource<'a> {
    /// Scan the file's own JPEG header.
    Scan,
    /// Packet text supplied by a metadata-dump service; `None` if it found none.
    Dump(Option<&'a [u8]>),
}

/// Validate `data`, reading the XMP packet from its JPEG header.
pub fn validate(file_name: &str, data: &[u8]) -> ValidationReport {
    Validator::new(file_name, data).run()
}

/// Runs the five checks over a file held in memory.
#[derive(Debug, Clone)]
pub struct Validator<'a> {
    file_name: &'a str,
    data: &'a [u8],
    source: XmpSource<'a>,
}

impl<'a> Validator<'a> {
    pub fn new(file_name: &'a str, data: &'a [u8]) -> Self {
        Self {
            file_name,
            data,
            source: XmpSource::Scan,
        }
    }

    pub fn xmp_source(mut self, source: XmpSource<'a>) -> Self {
        self.source = source;
        self
    }

    pub fn run(&self) -> ValidationReport {
        let packet = self.locate_packet();
        let camera = packet.as_ref().ok().map(|p| parse_camera_fields(p));
        let directory = packet.as_ref().ok().map(|p| parse_directory(p));

        let mut notes = Vec::new();
        let checks = vec![
            self.check_filename(),
            self.check_jpeg_type(),
            check_xmp_metadata(&packet, camera.as_ref()),
            check_directory(&packet, directory.as_ref()),
            self.check_file_structure(directory.as_ref(), &mut notes),
        ];
        let passed = checks.iter().all(|c| c.passed);

        ValidationReport {
            file_name: self.file_name.to_string(),
            file_size: self.data.len() as u64,
            checks,
            notes,
            camera: camera.and_then(|r| r.ok()),
            directory: directory.and_then(|r| r.ok()),
            passed,
        }
    }

    fn locate_packet(&self) -> Located<'a> {
        match self.source {
            XmpSource::Scan => match jpeg::find_xmp_segment(self.data) {
                Ok(Some(segment)) => segment
                    .xmp_packet()
                    .ok_or_else(|| "XMP segment has no packet".to_string()),
                Ok(None) => Err("no XMP segment in JPEG header".to_string()),
                Err(e) => Err(format!("JPEG header unreadable: {e}")),
            },
            XmpSource::Dump(Some(text)) => Ok(text),
            XmpSource::Dump(None) => Err("metadata dump reported no XMP".to_string()),
        }
    }

    fn check_filename(&self) -> CheckResult {
        let name = CheckName::Filename;
        if self.file_name.ends_with(MOTION_PHOTO_SUFFIX) {
            CheckResult::pass(name, format!("name ends with {MOTION_PHOTO_SUFFIX}"))
        } else {
            CheckResult::fail(
                name,
                ErrorKind::InvalidInput,
                format!("'{}' does not end with {MOTION_PHOTO_SUFFIX}", self.file_name),
            )
        }
    }

    fn check_jpeg_type(&self) -> CheckResult {
        let name = CheckName::JpegType;
        match jpeg::check_soi(self.data) {
            Ok(()) => CheckResult::pass(name, "file starts with SOI"),
            Err(e) => CheckResult::fail(name, ErrorKind::InvalidInput, e.to_string()),
        }
    }

    fn check_file_structure(
        &self,
        directory: Option<&Result<ContainerDirectory>>,
        notes: &mut Vec<String>,
    ) -> CheckResult {
        let name = CheckName::FileStructure;
        let directory = match directory {
            Some(Ok(dir)) if !dir.is_empty() => dir,
            _ => {
                return CheckResult::fail(
                    name,
                    ErrorKind::FormatViolation,
                    "no container directory to check lengths against",
                )
            }
        };

        let file_size = self.data.len() as u64;
        let Some(declared) = directory.total_length() else {
            return CheckResult::fail(name, ErrorKind::Inconsistency, "declared lengths overflow");
        };
        if declared != file_size {
            let detail = if declared < file_size {
                format!(
                    "declared lengths sum to {declared} bytes but file is {file_size} bytes ({} bytes undeclared)",
                    file_size - declared
                )
            } else {
                format!(
                    "declared lengths sum to {declared} bytes but file is only {file_size} bytes"
                )
            };
            return CheckResult::fail(name, ErrorKind::Inconsistency, detail);
        }

        let primary_length = directory.items()[0].length as usize;
        let primary = &self.data[..primary_length];
        if !primary.starts_with(&SOI) {
            return CheckResult::fail(
                name,
                ErrorKind::Inconsistency,
                "primary range does not start with SOI",
            );
        }

        let video = &self.data[primary_length..];
        match mp4::sniff_signature(video) {
            Some(sig) => notes.push(format!("video part carries MP4 box '{sig}'")),
            None => notes.push(format!(
                "no ftyp/moov/mdat box in the first {} bytes of the video part",
                mp4::SIGNATURE_WINDOW
            )),
        }

        CheckResult::pass(
            name,
            format!(
                "primary {primary_length} bytes + video {} bytes = {file_size} bytes",
                video.len()
            ),
        )
    }
}

/// XMP packet bytes, or why none could be located.
type Located<'a> = std::result::Result<&'a [u8], String>;

fn check_xmp_metadata(
    packet: &Located<'_>,
    camera: Option<&Result<CameraFields>>,
) -> CheckResult {
    let name = CheckName::XmpMetadata;
    let reason = match (packet, camera) {
        (Err(reason), _) => reason.clone(),
        (Ok(_), Some(Err(e))) => e.to_string(),
        (Ok(_), Some(Ok(fields))) if fields.is_motion_photo() => {
            return CheckResult::pass(
                name,
                "MotionPhoto=1, MotionPhotoVersion=1, MotionPhotoPresentationTimestampUs=0",
            )
        }
        (Ok(_), Some(Ok(fields))) => format!(
            "unexpected camera fields: MotionPhoto={}, MotionPhotoVersion={}, MotionPhotoPresentationTimestampUs={}",
            show(fields.motion_photo),
            show(fields.motion_photo_version),
            show(fields.presentation_timestamp_us)
        ),
        (Ok(_), None) => "XMP packet not parsed".to_string(),
    };
    CheckResult::fail(name, ErrorKind::FormatViolation, reason)
}

fn check_directory(
    packet: &Located<'_>,
    directory: Option<&Result<ContainerDirectory>>,
) -> CheckResult {
    let name = CheckName::ContainerDirectory;
    let dir = match (packet, directory) {
        (Err(reason), _) => return CheckResult::fail(name, ErrorKind::FormatViolation, reason),
        (Ok(_), Some(Err(e))) => return CheckResult::fail(name, e.kind(), e.to_string()),
        (Ok(_), None) => {
            return CheckResult::fail(name, ErrorKind::FormatViolation, "XMP packet not parsed")
        }
        (Ok(_), Some(Ok(dir))) => dir,
    };

    let items = dir.items();
    if items.len() != 2 {
        return CheckResult::fail(
            name,
            ErrorKind::Inconsistency,
            format!("expected 2 items, found {}", items.len()),
        );
    }

    let expected = [(Semantic::Primary, MIME_JPEG), (Semantic::MotionPhoto, MIME_MP4)];
    for (index, (item, (semantic, mime))) in items.iter().zip(expected.iter()).enumerate() {
        if &item.semantic != semantic || item.mime != *mime {
            return CheckResult::fail(
                name,
                ErrorKind::Inconsistency,
                format!(
                    "item {}: expected {semantic} {mime}, found {} {}",
                    index + 1,
                    item.semantic,
                    item.mime
                ),
            );
        }
    }

    CheckResult::pass(
        name,
        format!(
            "Primary {MIME_JPEG} ({} bytes), MotionPhoto {MIME_MP4} ({} bytes)",
            items[0].length, items[1].length
        ),
    )
}

fn show(value: Option<i64>) -> String {
    value.map_or_else(|| "absent".to_string(), |v| v.to_string())
}
