//! RDF/XML generation for Motion Photo packets.

use super::{
    CameraFields, ContainerDirectory, CAMERA_NS, CONTAINER_NS, PACKET_ID, RDF_NS, XMP_META_NS,
};
use crate::{Error, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Build the `x:xmpmeta` RDF document for a directory, with the fixed camera
/// fields. Items are written in directory order.
pub fn build_rdf(directory: &ContainerDirectory) -> Result<String> {
    build_rdf_with(&CameraFields::MOTION_PHOTO, directory)
}

pub(super) fn build_rdf_with(camera: &CameraFields, directory: &ContainerDirectory) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    let mut meta = BytesStart::new("x:xmpmeta");
    meta.push_attribute(("xmlns:x", XMP_META_NS));
    emit(&mut writer, Event::Start(meta))?;

    let mut rdf = BytesStart::new("rdf:RDF");
    rdf.push_attribute(("xmlns:rdf", RDF_NS));
    emit(&mut writer, Event::Start(rdf))?;

    let mut description = BytesStart::new("rdf:Description");
    description.push_attribute(("rdf:about", ""));
    description.push_attribute(("xmlns:Camera", CAMERA_NS));
    description.push_attribute(("xmlns:Container", CONTAINER_NS));
    emit(&mut writer, Event::Start(description))?;

    let camera_values = [
        ("Camera:MotionPhoto", camera.motion_photo),
        ("Camera:MotionPhotoVersion", camera.motion_photo_version),
        (
            "Camera:MotionPhotoPresentationTimestampUs",
            camera.presentation_timestamp_us,
        ),
    ];
    for (name, value) in camera_values {
        if let Some(value) = value {
            text_element(&mut writer, name, &value.to_string())?;
        }
    }

    emit(&mut writer, Event::Start(BytesStart::new("Container:Directory")))?;
    emit(&mut writer, Event::Start(BytesStart::new("rdf:Seq")))?;
    for item in directory.items() {
        emit(&mut writer, Event::Start(BytesStart::new("rdf:li")))?;
        emit(&mut writer, Event::Start(BytesStart::new("Container:Item")))?;
        text_element(&mut writer, "Container:Mime", &item.mime)?;
        text_element(&mut writer, "Container:Semantic", item.semantic.as_str())?;
        text_element(&mut writer, "Container:Length", &item.length.to_string())?;
        emit(&mut writer, Event::End(BytesEnd::new("Container:Item")))?;
        emit(&mut writer, Event::End(BytesEnd::new("rdf:li")))?;
    }
    emit(&mut writer, Event::End(BytesEnd::new("rdf:Seq")))?;
    emit(&mut writer, Event::End(BytesEnd::new("Container:Directory")))?;

    emit(&mut writer, Event::End(BytesEnd::new("rdf:Description")))?;
    emit(&mut writer, Event::End(BytesEnd::new("rdf:RDF")))?;
    emit(&mut writer, Event::End(BytesEnd::new("x:xmpmeta")))?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| Error::format_violation(format!("XMP serialization produced invalid UTF-8: {e}")))
}

/// Frame RDF text with the `xpacket` processing-instruction guards.
pub fn wrap_packet(rdf: &str) -> Vec<u8> {
    format!(
        "<?xpacket begin=\"\u{FEFF}\" id=\"{PACKET_ID}\"?>\n{}\n<?xpacket end=\"w\"?>",
        rdf.trim()
    )
    .into_bytes()
}

fn text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    emit(writer, Event::Start(BytesStart::new(name)))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::format_violation(format!("XMP serialization failed: {e}")))
}
