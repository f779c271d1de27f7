//! JPEG marker-segment scanning and editing.
//!
//! Only the header portion of the stream (SOI up to SOS) is ever parsed; the
//! editing operations copy everything else byte for byte.

mod marker;
mod scanner;
mod segment;

pub use marker::Marker;
pub use scanner::{
    check_soi, find_xmp_segment, insert_segment_after_soi, parse, remove_xmp_segment, JpegLayout,
};
pub use segment::{encode_segment, encode_xmp_segment, JpegSegment, MAX_SEGMENT_LENGTH};

/// Start-of-image marker bytes.
pub const SOI: [u8; 2] = [0xFF, 0xD8];

/// Identifier that opens the payload of an APP1 segment holding XMP.
pub const XMP_IDENTIFIER: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";
