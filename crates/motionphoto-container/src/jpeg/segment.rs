//! JPEG marker segments.

use super::{Marker, XMP_IDENTIFIER};
use crate::{Error, Result};
use bytes::{BufMut, Bytes, BytesMut};
use std::ops::Range;

/// Largest value the 16-bit segment length field can hold. The length covers
/// the two length bytes themselves plus the payload.
pub const MAX_SEGMENT_LENGTH: usize = u16::MAX as usize;

/// A marker segment located inside a JPEG buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpegSegment<'a> {
    /// Marker code.
    pub marker: Marker,
    /// Offset of the `0xFF` byte that introduces the marker.
    pub offset: usize,
    /// Declared length (length field + payload), absent for stand-alone markers.
    pub length: Option<u16>,
    /// Payload following the length field.
    pub payload: &'a [u8],
}

impl<'a> JpegSegment<'a> {
    /// Number of bytes the segment occupies in the stream, marker included.
    pub fn encoded_len(&self) -> usize {
        2 + self.length.map_or(0, usize::from)
    }

    /// Byte range of the whole segment within the source buffer.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.encoded_len()
    }

    /// Whether this is an APP1 segment carrying a standard XMP packet.
    pub fn is_xmp(&self) -> bool {
        self.marker == Marker::APP1 && self.payload.starts_with(XMP_IDENTIFIER)
    }

    /// The XMP packet bytes, with the identifier stripped.
    pub fn xmp_packet(&self) -> Option<&'a [u8]> {
        if self.is_xmp() {
            Some(&self.payload[XMP_IDENTIFIER.len()..])
        } else {
            None
        }
    }
}

/// Serialize a length-carrying marker segment.
///
/// Fails with a format violation when the payload cannot be described by the
/// 16-bit length field.
pub fn encode_segment(marker: Marker, payload: &[u8]) -> Result<Bytes> {
    write_segment(marker, &[payload])
}

/// Wrap an XMP packet in an APP1 segment behind the Adobe XMP identifier.
pub fn encode_xmp_segment(packet: &[u8]) -> Result<Bytes> {
    write_segment(Marker::APP1, &[XMP_IDENTIFIER, packet]).map_err(|e| match e {
        Error::FormatViolation { message, .. } => {
            Error::format_violation(format!("XMP packet too large: {message}"))
        }
        other => other,
    })
}

/// Marker, length field and the payload pieces in order, in one buffer.
fn write_segment(marker: Marker, parts: &[&[u8]]) -> Result<Bytes> {
    if marker.is_standalone() {
        return Err(Error::invalid_input(format!(
            "{marker} does not carry a payload"
        )));
    }

    let length = parts.iter().map(|p| p.len()).sum::<usize>() + 2;
    if length > MAX_SEGMENT_LENGTH {
        return Err(Error::format_violation(format!(
            "{marker} segment would need {length} bytes, limit is {MAX_SEGMENT_LENGTH}"
        )));
    }

    let mut buf = BytesMut::with_capacity(length + 2);
    buf.put_slice(&marker.to_bytes());
    buf.put_u16(length as u16);
    for part in parts {
        buf.put_slice(part);
    }
    Ok(buf.freeze())
}
