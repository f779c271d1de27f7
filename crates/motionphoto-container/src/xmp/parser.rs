//! Namespace-aware reading of Motion Photo packets.
//!
//! Elements and attributes are matched by namespace URI, not by prefix, so
//! packets written with `GCamera:`/`Item:` prefixes parse the same as the ones
//! this crate writes. Both element-form and attribute-form properties are
//! accepted. Input may be the raw APP1 payload (with `xpacket` guards) or the
//! text a metadata-dump tool prints for the packet.

use super::{
    CameraFields, ContainerDirectory, ContainerItem, Semantic, XmpPacket, CAMERA_NS,
    CONTAINER_ITEM_NS, CONTAINER_NS, RDF_NS,
};
use crate::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

/// Parse camera fields and container directory.
pub fn parse_packet(bytes: &[u8]) -> Result<XmpPacket> {
    let scan = PacketScan::run(bytes)?;
    let camera = scan.camera;
    let directory = scan.into_directory()?;
    Ok(XmpPacket { camera, directory })
}

/// Parse only the ordered container directory.
pub fn parse_directory(bytes: &[u8]) -> Result<ContainerDirectory> {
    PacketScan::run(bytes)?.into_directory()
}

/// Parse only the camera fields. Absent fields are `None`.
pub fn parse_camera_fields(bytes: &[u8]) -> Result<CameraFields> {
    Ok(PacketScan::run(bytes)?.camera)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ns {
    Rdf,
    Container,
    Item,
    Camera,
    Other,
}

impl Ns {
    fn of(result: &ResolveResult<'_>) -> Self {
        match result {
            ResolveResult::Bound(Namespace(uri)) => {
                let uri = *uri;
                if uri == CONTAINER_NS.as_bytes() {
                    Ns::Container
                } else if uri == CONTAINER_ITEM_NS.as_bytes() {
                    Ns::Item
                } else if uri == CAMERA_NS.as_bytes() {
                    Ns::Camera
                } else if uri == RDF_NS.as_bytes() {
                    Ns::Rdf
                } else {
                    Ns::Other
                }
            }
            _ => Ns::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    MotionPhoto,
    MotionPhotoVersion,
    PresentationTimestamp,
    Mime,
    Semantic,
    Length,
}

impl Field {
    fn camera(local: &[u8]) -> Option<Self> {
        match local {
            b"MotionPhoto" => Some(Field::MotionPhoto),
            b"MotionPhotoVersion" => Some(Field::MotionPhotoVersion),
            b"MotionPhotoPresentationTimestampUs" => Some(Field::PresentationTimestamp),
            _ => None,
        }
    }

    fn item(local: &[u8]) -> Option<Self> {
        match local {
            b"Mime" => Some(Field::Mime),
            b"Semantic" => Some(Field::Semantic),
            b"Length" => Some(Field::Length),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Field::MotionPhoto => "Camera:MotionPhoto",
            Field::MotionPhotoVersion => "Camera:MotionPhotoVersion",
            Field::PresentationTimestamp => "Camera:MotionPhotoPresentationTimestampUs",
            Field::Mime => "Container:Mime",
            Field::Semantic => "Container:Semantic",
            Field::Length => "Container:Length",
        }
    }
}

#[derive(Debug, Default)]
struct PartialItem {
    mime: Option<String>,
    semantic: Option<String>,
    length: Option<String>,
}

#[derive(Debug, Default)]
struct PacketScan {
    camera: CameraFields,
    saw_directory: bool,
    items: Vec<PartialItem>,
    in_item: bool,
    field: Option<Field>,
    text: String,
}

impl PacketScan {
    fn run(bytes: &[u8]) -> Result<Self> {
        let mut reader = NsReader::from_reader(bytes);
        reader.config_mut().trim_text(true);

        let mut scan = PacketScan::default();
        let mut buf = Vec::new();

        loop {
            let position = reader.buffer_position() as usize;
            let (ns, event) = reader
                .read_resolved_event_into(&mut buf)
                .map_err(|e| Error::format_violation_at(position, format!("malformed XMP: {e}")))?;
            let ns = Ns::of(&ns);

            match event {
                Event::Start(e) => scan.open(ns, &e, &reader, false)?,
                Event::Empty(e) => scan.open(ns, &e, &reader, true)?,
                Event::Text(t) => {
                    if scan.field.is_some() {
                        let text = t.unescape().map_err(|e| {
                            Error::format_violation_at(position, format!("bad XMP text: {e}"))
                        })?;
                        scan.text.push_str(&text);
                    }
                }
                Event::End(e) => scan.close(ns, e.local_name().as_ref())?,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(scan)
    }

    fn open(
        &mut self,
        ns: Ns,
        element: &BytesStart<'_>,
        reader: &NsReader<&[u8]>,
        empty: bool,
    ) -> Result<()> {
        let local = element.local_name();
        let local = local.as_ref();

        match ns {
            Ns::Rdf if local == b"Description" => {
                self.read_attributes(element, reader)?;
            }
            Ns::Container if local == b"Directory" => {
                self.saw_directory = true;
            }
            Ns::Container if local == b"Item" => {
                self.items.push(PartialItem::default());
                self.in_item = !empty;
                self.read_attributes(element, reader)?;
            }
            Ns::Container | Ns::Item if self.in_item => {
                if let Some(field) = Field::item(local) {
                    self.begin_field(field, empty)?;
                }
            }
            Ns::Camera => {
                if let Some(field) = Field::camera(local) {
                    self.begin_field(field, empty)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, ns: Ns, local: &[u8]) -> Result<()> {
        if ns == Ns::Container && local == b"Item" {
            self.in_item = false;
            return Ok(());
        }

        if let Some(field) = self.field {
            let matches = match ns {
                Ns::Camera => Field::camera(local) == Some(field),
                Ns::Container | Ns::Item => Field::item(local) == Some(field),
                _ => false,
            };
            if matches {
                self.field = None;
                let value = std::mem::take(&mut self.text);
                self.commit(field, value)?;
            }
        }
        Ok(())
    }

    fn begin_field(&mut self, field: Field, empty: bool) -> Result<()> {
        if empty {
            self.commit(field, String::new())
        } else {
            self.field = Some(field);
            self.text.clear();
            Ok(())
        }
    }

    fn read_attributes(&mut self, element: &BytesStart<'_>, reader: &NsReader<&[u8]>) -> Result<()> {
        for attr in element.attributes() {
            let attr = attr
                .map_err(|e| Error::format_violation(format!("malformed XMP attribute: {e}")))?;
            let (ns, local) = reader.resolve_attribute(attr.key);
            let field = match Ns::of(&ns) {
                Ns::Camera => Field::camera(local.as_ref()),
                Ns::Container | Ns::Item if !self.items.is_empty() => Field::item(local.as_ref()),
                _ => None,
            };
            if let Some(field) = field {
                let value = attr
                    .unescape_value()
                    .map_err(|e| Error::format_violation(format!("bad XMP attribute value: {e}")))?;
                self.commit(field, value.into_owned())?;
            }
        }
        Ok(())
    }

    fn commit(&mut self, field: Field, value: String) -> Result<()> {
        let value = value.trim().to_string();
        match field {
            Field::MotionPhoto => self.camera.motion_photo = Some(parse_int(field, &value)?),
            Field::MotionPhotoVersion => {
                self.camera.motion_photo_version = Some(parse_int(field, &value)?)
            }
            Field::PresentationTimestamp => {
                self.camera.presentation_timestamp_us = Some(parse_int(field, &value)?)
            }
            Field::Mime | Field::Semantic | Field::Length => {
                if let Some(item) = self.items.last_mut() {
                    let slot = match field {
                        Field::Mime => &mut item.mime,
                        Field::Semantic => &mut item.semantic,
                        _ => &mut item.length,
                    };
                    *slot = Some(value);
                }
            }
        }
        Ok(())
    }

    fn into_directory(self) -> Result<ContainerDirectory> {
        if !self.saw_directory {
            return Err(Error::format_violation(
                "XMP packet has no Container:Directory",
            ));
        }

        let mut items = Vec::with_capacity(self.items.len());
        for (index, item) in self.items.into_iter().enumerate() {
            let mime = item.mime.ok_or_else(|| {
                Error::format_violation(format!("container item {index} has no Mime"))
            })?;
            let semantic = item.semantic.ok_or_else(|| {
                Error::format_violation(format!("container item {index} has no Semantic"))
            })?;
            let length = item.length.ok_or_else(|| {
                Error::format_violation(format!("container item {index} has no Length"))
            })?;
            let length = length.parse::<u64>().map_err(|_| {
                Error::format_violation(format!(
                    "container item {index} Length '{length}' is not a byte count"
                ))
            })?;
            items.push(ContainerItem::new(mime, Semantic::parse(&semantic), length));
        }

        Ok(ContainerDirectory::new(items))
    }
}

fn parse_int(field: Field, value: &str) -> Result<i64> {
    value.parse::<i64>().map_err(|_| {
        Error::format_violation(format!("{} '{}' is not an integer", field.name(), value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xmp::{build_rdf, wrap_packet, MIME_JPEG, MIME_MP4};
    use crate::ErrorKind;

    #[test]
    fn test_parse_generated_packet() {
        let dir = ContainerDirectory::motion_photo(48213, 1_204_551);
        let packet = wrap_packet(&build_rdf(&dir).unwrap());

        let parsed = parse_packet(&packet).unwrap();
        assert!(parsed.camera.is_motion_photo());
        assert_eq!(parsed.directory, dir);
    }

    #[test]
    fn test_parse_attribute_form_with_other_prefixes() {
        // Layout written by camera firmware: attribute-form properties,
        // GCamera prefix, item namespace for Mime/Semantic/Length.
        let xml = br#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about=""
        xmlns:GCamera="http://ns.google.com/photos/1.0/camera/"
        xmlns:Container="http://ns.google.com/photos/1.0/container/"
        xmlns:Item="http://ns.google.com/photos/1.0/container/item/"
      GCamera:MotionPhoto="1"
      GCamera:MotionPhotoVersion="1"
      GCamera:MotionPhotoPresentationTimestampUs="0">
      <Container:Directory>
        <rdf:Seq>
          <rdf:li rdf:parseType="Resource">
            <Container:Item Item:Mime="image/jpeg" Item:Semantic="Primary" Item:Length="3000"/>
          </rdf:li>
          <rdf:li rdf:parseType="Resource">
            <Container:Item Item:Mime="video/mp4" Item:Semantic="MotionPhoto" Item:Length="9000"/>
          </rdf:li>
        </rdf:Seq>
      </Container:Directory>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>"#;

        let parsed = parse_packet(xml).unwrap();
        assert!(parsed.camera.is_motion_photo());
        let items = parsed.directory.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].mime, MIME_JPEG);
        assert_eq!(items[0].semantic, Semantic::Primary);
        assert_eq!(items[0].length, 3000);
        assert_eq!(items[1].mime, MIME_MP4);
        assert_eq!(items[1].length, 9000);
    }

    #[test]
    fn test_parse_ignores_unbound_prefix_lookalikes() {
        // Right prefix, wrong namespace URI: not a container directory.
        let xml = br#"<x:xmpmeta xmlns:x="adobe:ns:meta/"
            xmlns:Container="http://example.com/not-google/">
          <Container:Directory/>
        </x:xmpmeta>"#;
        let err = parse_directory(xml).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatViolation);
    }

    #[test]
    fn test_missing_directory() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about="" xmlns:Camera="http://ns.google.com/photos/1.0/camera/">
      <Camera:MotionPhoto>1</Camera:MotionPhoto>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>"#;
        let err = parse_directory(xml).unwrap_err();
        assert!(err.to_string().contains("no Container:Directory"));

        let camera = parse_camera_fields(xml).unwrap();
        assert_eq!(camera.motion_photo, Some(1));
        assert_eq!(camera.motion_photo_version, None);
        assert!(!camera.is_motion_photo());
    }

    #[test]
    fn test_item_missing_length() {
        let rdf = build_rdf(&ContainerDirectory::motion_photo(10, 20)).unwrap();
        let broken = rdf.replacen("<Container:Length>20</Container:Length>", "", 1);
        let err = parse_directory(broken.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatViolation);
        assert!(err.to_string().contains("item 1 has no Length"), "{err}");
    }

    #[test]
    fn test_item_non_numeric_length() {
        let rdf = build_rdf(&ContainerDirectory::motion_photo(10, 20)).unwrap();
        let broken = rdf.replacen(">10<", ">ten<", 1);
        let err = parse_directory(broken.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("'ten' is not a byte count"), "{err}");
    }

    #[test]
    fn test_unknown_semantic_is_kept() {
        let rdf = build_rdf(&ContainerDirectory::motion_photo(10, 20)).unwrap();
        let changed = rdf.replacen(">MotionPhoto<", ">GainMap<", 1);
        let dir = parse_directory(changed.as_bytes()).unwrap();
        assert_eq!(dir.items()[1].semantic, Semantic::Other("GainMap".into()));
    }

    #[test]
    fn test_malformed_xml_is_format_violation() {
        let err = parse_packet(b"<x:xmpmeta xmlns:x=\"adobe:ns:meta/\"><rdf:RDF></x:xmpmeta>")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatViolation);
    }
}
