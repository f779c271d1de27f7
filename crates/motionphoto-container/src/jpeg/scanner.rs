//! Marker-segment walker for the header portion of a JPEG stream.
//!
//! Scanning starts right after SOI and stops at the first SOS marker. Nothing
//! from SOS onwards is interpreted: the entropy-coded scan, EOI and any bytes
//! appended after it (an embedded video, for instance) are treated as one
//! opaque trailing region.

use super::{JpegSegment, Marker, SOI};
use crate::{Error, Result};

/// Header segments of a JPEG buffer plus the opaque remainder.
#[derive(Debug, Clone)]
pub struct JpegLayout<'a> {
    /// Segments between SOI and SOS, in stream order.
    pub segments: Vec<JpegSegment<'a>>,
    /// Offset where scanning stopped (SOS marker, or end of buffer).
    pub trailing_offset: usize,
    /// Whether an SOS marker was reached.
    pub has_scan: bool,
    trailing: &'a [u8],
}

impl<'a> JpegLayout<'a> {
    /// Bytes from SOS (inclusive) to the end of the buffer.
    pub fn trailing(&self) -> &'a [u8] {
        self.trailing
    }

    /// The first standard XMP segment, if any.
    pub fn xmp_segment(&self) -> Option<&JpegSegment<'a>> {
        self.segments.iter().find(|s| s.is_xmp())
    }
}

/// Check that the buffer starts with the SOI marker.
pub fn check_soi(bytes: &[u8]) -> Result<()> {
    if bytes.len() < 2 {
        return Err(Error::BufferUnderflow {
            offset: 0,
            need: 2,
            have: bytes.len(),
        });
    }
    if bytes[..2] != SOI {
        return Err(Error::format_violation_at(
            0,
            format!(
                "missing JPEG SOI marker (found 0x{:02X}{:02X})",
                bytes[0], bytes[1]
            ),
        ));
    }
    Ok(())
}

/// Walk the marker segments of a JPEG buffer up to the start of scan.
pub fn parse(bytes: &[u8]) -> Result<JpegLayout<'_>> {
    check_soi(bytes)?;

    let len = bytes.len();
    let mut segments = Vec::new();
    let mut pos = 2;
    let mut has_scan = false;

    while pos < len {
        if bytes[pos] != 0xFF {
            return Err(Error::format_violation_at(
                pos,
                format!("expected marker prefix 0xFF, found 0x{:02X}", bytes[pos]),
            ));
        }

        // Any number of 0xFF fill bytes may precede the marker code.
        let mut code_pos = pos + 1;
        while code_pos < len && bytes[code_pos] == 0xFF {
            code_pos += 1;
        }
        if code_pos >= len {
            return Err(Error::format_violation_at(pos, "truncated marker"));
        }

        let offset = code_pos - 1;
        let marker = Marker::from_byte(bytes[code_pos]);

        if marker == Marker::SOS {
            has_scan = true;
            pos = offset;
            break;
        }

        if marker.0 == 0x00 {
            return Err(Error::format_violation_at(
                offset,
                "stuffed 0xFF00 outside entropy-coded data",
            ));
        }

        if marker.is_standalone() {
            segments.push(JpegSegment {
                marker,
                offset,
                length: None,
                payload: &[],
            });
            pos = code_pos + 1;
            if marker == Marker::EOI {
                break;
            }
            continue;
        }

        if code_pos + 3 > len {
            return Err(Error::format_violation_at(
                offset,
                format!("{marker} length field truncated"),
            ));
        }
        let length = u16::from_be_bytes([bytes[code_pos + 1], bytes[code_pos + 2]]);
        if length < 2 {
            return Err(Error::format_violation_at(
                offset,
                format!("{marker} declares impossible length {length}"),
            ));
        }

        let end = code_pos + 1 + length as usize;
        if end > len {
            return Err(Error::format_violation_at(
                offset,
                format!(
                    "{marker} declares {length} bytes but only {} remain",
                    len - code_pos - 1
                ),
            ));
        }

        segments.push(JpegSegment {
            marker,
            offset,
            length: Some(length),
            payload: &bytes[code_pos + 3..end],
        });
        pos = end;
    }

    let trailing_offset = pos.min(len);
    Ok(JpegLayout {
        segments,
        trailing_offset,
        has_scan,
        trailing: &bytes[trailing_offset..],
    })
}

/// Locate the first APP1 segment carrying a standard XMP packet.
pub fn find_xmp_segment(bytes: &[u8]) -> Result<Option<JpegSegment<'_>>> {
    let layout = parse(bytes)?;
    Ok(layout.segments.into_iter().find(|s| s.is_xmp()))
}

/// Copy of `bytes` without its XMP segment. Returns an unchanged copy when
/// there is none.
pub fn remove_xmp_segment(bytes: &[u8]) -> Result<Vec<u8>> {
    match find_xmp_segment(bytes)? {
        Some(segment) => {
            let range = segment.range();
            let mut out = Vec::with_capacity(bytes.len() - range.len());
            out.extend_from_slice(&bytes[..range.start]);
            out.extend_from_slice(&bytes[range.end..]);
            Ok(out)
        }
        None => Ok(bytes.to_vec()),
    }
}

/// Copy of `bytes` with `segment` placed immediately after SOI.
pub fn insert_segment_after_soi(bytes: &[u8], segment: &[u8]) -> Result<Vec<u8>> {
    check_soi(bytes)?;

    let mut out = Vec::with_capacity(bytes.len() + segment.len());
    out.extend_from_slice(&bytes[..2]);
    out.extend_from_slice(segment);
    out.extend_from_slice(&bytes[2..]);
    Ok(out)
}
