//! XMP packets describing a Motion Photo container.
//!
//! The namespace URIs below are what third-party metadata readers key off;
//! they must be emitted exactly as written.

mod builder;
mod parser;

pub use builder::{build_rdf, wrap_packet};
pub use parser::{parse_camera_fields, parse_directory, parse_packet};

use crate::Result;
use std::fmt;

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const XMP_META_NS: &str = "adobe:ns:meta/";
pub const CONTAINER_NS: &str = "http://ns.google.com/photos/1.0/container/";
/// Namespace some cameras use for attribute-form item properties.
pub const CONTAINER_ITEM_NS: &str = "http://ns.google.com/photos/1.0/container/item/";
pub const CAMERA_NS: &str = "http://ns.google.com/photos/1.0/camera/";

/// Identifier carried in the `<?xpacket begin ...?>` guard.
pub const PACKET_ID: &str = "W5M0MpCehiHzreSzNTczkc9d";

pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_MP4: &str = "video/mp4";

/// Role of an item in the container directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Semantic {
    /// The displayable still image. Always the first item.
    Primary,
    /// The embedded video.
    MotionPhoto,
    /// Anything else found in a parsed packet.
    Other(String),
}

impl Semantic {
    pub fn as_str(&self) -> &str {
        match self {
            Semantic::Primary => "Primary",
            Semantic::MotionPhoto => "MotionPhoto",
            Semantic::Other(s) => s,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "Primary" => Semantic::Primary,
            "MotionPhoto" => Semantic::MotionPhoto,
            other => Semantic::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Semantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "serialize")]
impl serde::Serialize for Semantic {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One entry of the container directory.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct ContainerItem {
    pub mime: String,
    pub semantic: Semantic,
    /// Length of the item in bytes.
    pub length: u64,
}

impl ContainerItem {
    pub fn new(mime: impl Into<String>, semantic: Semantic, length: u64) -> Self {
        Self {
            mime: mime.into(),
            semantic,
            length,
        }
    }

    /// The JPEG cover image item.
    pub fn primary(length: u64) -> Self {
        Self::new(MIME_JPEG, Semantic::Primary, length)
    }

    /// The embedded MP4 item.
    pub fn motion_photo(length: u64) -> Self {
        Self::new(MIME_MP4, Semantic::MotionPhoto, length)
    }
}

/// Ordered list of the items stored back to back in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "serialize", serde(transparent))]
pub struct ContainerDirectory {
    items: Vec<ContainerItem>,
}

impl ContainerDirectory {
    pub fn new(items: Vec<ContainerItem>) -> Self {
        Self { items }
    }

    /// Directory for a cover image followed by a video.
    pub fn motion_photo(primary_length: u64, video_length: u64) -> Self {
        Self::new(vec![
            ContainerItem::primary(primary_length),
            ContainerItem::motion_photo(video_length),
        ])
    }

    pub fn items(&self) -> &[ContainerItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// First item with the given semantic.
    pub fn find(&self, semantic: &Semantic) -> Option<&ContainerItem> {
        self.items.iter().find(|i| &i.semantic == semantic)
    }

    /// Sum of item lengths, `None` on overflow.
    pub fn total_length(&self) -> Option<u64> {
        self.items
            .iter()
            .try_fold(0u64, |acc, item| acc.checked_add(item.length))
    }
}

/// Camera-namespace flags marking a file as a Motion Photo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct CameraFields {
    pub motion_photo: Option<i64>,
    pub motion_photo_version: Option<i64>,
    pub presentation_timestamp_us: Option<i64>,
}

impl CameraFields {
    /// The fixed values every generated packet carries.
    pub const MOTION_PHOTO: Self = Self {
        motion_photo: Some(1),
        motion_photo_version: Some(1),
        presentation_timestamp_us: Some(0),
    };

    pub fn is_motion_photo(&self) -> bool {
        *self == Self::MOTION_PHOTO
    }
}

/// A full packet: camera flags plus the container directory.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct XmpPacket {
    pub camera: CameraFields,
    pub directory: ContainerDirectory,
}

impl XmpPacket {
    /// Packet with the fixed camera fields.
    pub fn new(directory: ContainerDirectory) -> Self {
        Self {
            camera: CameraFields::MOTION_PHOTO,
            directory,
        }
    }

    /// Serialize to guarded packet bytes, ready to go behind the APP1 identifier.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let rdf = builder::build_rdf_with(&self.camera, &self.directory)?;
        Ok(wrap_packet(&rdf))
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        parse_packet(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_parse() {
        assert_eq!(Semantic::parse("Primary"), Semantic::Primary);
        assert_eq!(Semantic::parse(" MotionPhoto "), Semantic::MotionPhoto);
        assert_eq!(
            Semantic::parse("GainMap"),
            Semantic::Other("GainMap".to_string())
        );
        assert_eq!(Semantic::Other("GainMap".into()).to_string(), "GainMap");
    }

    #[test]
    fn test_directory_total_length() {
        let dir = ContainerDirectory::motion_photo(1000, 2500);
        assert_eq!(dir.total_length(), Some(3500));
        assert_eq!(dir.len(), 2);
        assert_eq!(dir.find(&Semantic::MotionPhoto).unwrap().mime, MIME_MP4);

        let overflow = ContainerDirectory::motion_photo(u64::MAX, 1);
        assert_eq!(overflow.total_length(), None);
    }

    #[test]
    fn test_packet_round_trip() {
        let packet = XmpPacket::new(ContainerDirectory::motion_photo(51234, 987654));
        let bytes = packet.to_bytes().unwrap();
        assert_eq!(XmpPacket::parse(&bytes).unwrap(), packet);
    }
}
