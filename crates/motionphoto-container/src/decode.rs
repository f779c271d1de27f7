//! Recovering the parts of an existing Motion Photo.

use crate::jpeg;
use crate::xmp::{ContainerDirectory, Semantic, XmpPacket};
use crate::{Error, Result};
use std::ops::Range;

/// Byte ranges of the two parts within the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartLayout {
    pub primary: Range<usize>,
    pub video: Range<usize>,
}

/// Locate the XMP packet of a JPEG buffer via the segment scanner.
///
/// `Ok(None)` means the header parsed but carries no XMP segment.
pub fn read_xmp_packet(data: &[u8]) -> Result<Option<&[u8]>> {
    Ok(jpeg::find_xmp_segment(data)?.and_then(|segment| segment.xmp_packet()))
}

/// Reader over a Motion Photo held in memory.
#[derive(Debug, Clone)]
pub struct MotionPhotoReader<'a> {
    data: &'a [u8],
    packet: XmpPacket,
}

impl<'a> MotionPhotoReader<'a> {
    /// Locate and parse the XMP directory embedded in `data`.
    ///
    /// Fails when the JPEG header is malformed or the XMP segment is absent or
    /// cannot be parsed, since no directory can be recovered in those cases.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let payload = read_xmp_packet(data)?
            .ok_or_else(|| Error::format_violation("no XMP segment in JPEG header"))?;
        let packet = XmpPacket::parse(payload)?;
        Ok(Self { data, packet })
    }

    /// Use a packet obtained elsewhere (e.g. from a metadata dump).
    pub fn with_packet(data: &'a [u8], packet: XmpPacket) -> Self {
        Self { data, packet }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn packet(&self) -> &XmpPacket {
        &self.packet
    }

    pub fn directory(&self) -> &ContainerDirectory {
        &self.packet.directory
    }

    /// Split the file according to the directory.
    ///
    /// Requires exactly a Primary item followed by a MotionPhoto item whose
    /// lengths add up to the file size.
    pub fn layout(&self) -> Result<PartLayout> {
        let items = self.directory().items();
        if items.len() != 2 {
            return Err(Error::inconsistency(format!(
                "expected 2 container items, found {}",
                items.len()
            )));
        }
        if items[0].semantic != Semantic::Primary || items[1].semantic != Semantic::MotionPhoto {
            return Err(Error::inconsistency(format!(
                "expected items [Primary, MotionPhoto], found [{}, {}]",
                items[0].semantic, items[1].semantic
            )));
        }

        let total = self.data.len() as u64;
        let declared = self
            .directory()
            .total_length()
            .ok_or_else(|| Error::inconsistency("declared lengths overflow"))?;
        if declared != total {
            return Err(Error::inconsistency(format!(
                "declared lengths sum to {declared} bytes but file is {total} bytes"
            )));
        }

        let primary_end = items[0].length as usize;
        Ok(PartLayout {
            primary: 0..primary_end,
            video: primary_end..self.data.len(),
        })
    }

    /// The JPEG part, XMP segment included.
    pub fn primary(&self) -> Result<&'a [u8]> {
        let layout = self.layout()?;
        Ok(&self.data[layout.primary])
    }

    /// The embedded video.
    pub fn video(&self) -> Result<&'a [u8]> {
        let layout = self.layout()?;
        Ok(&self.data[layout.video])
    }
}
