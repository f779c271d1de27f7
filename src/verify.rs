//! Conformance report for a file on disk.

use crate::error::{Error, Result, Step};
use motionphoto_av::MetadataSource;
use motionphoto_container::{ValidationReport, Validator, XmpSource};
use std::path::Path;

/// Run the five conformance checks against `path`.
///
/// With `metadata` set, the XMP packet comes from that service instead of a
/// scan of the file's JPEG header. Only an unreadable file or a failing
/// metadata service is an error; everything else ends up in the report.
pub fn verify_file(path: &Path, metadata: Option<&dyn MetadataSource>) -> Result<ValidationReport> {
    let data = std::fs::read(path).map_err(|e| Error::during(Step::ReadInput)(Error::io(path, e)))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let dumped = match metadata {
        Some(service) => Some(
            service
                .dump_xmp(path)
                .map_err(Error::during(Step::DumpMetadata))?,
        ),
        None => None,
    };
    let source = match &dumped {
        Some(packet) => XmpSource::Dump(packet.as_deref()),
        None => XmpSource::Scan,
    };

    let report = Validator::new(&file_name, &data).xmp_source(source).run();

    for check in report.failures() {
        tracing::warn!("{}: {} check failed: {}", file_name, check.name, check.detail);
    }
    tracing::info!(
        "{}: {}",
        file_name,
        if report.passed() { "valid Motion Photo" } else { "not a valid Motion Photo" }
    );

    Ok(report)
}
