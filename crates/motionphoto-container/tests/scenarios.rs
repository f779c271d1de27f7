//! End-to-end codec behaviour on synthetic JPEG and MP4 bytes.

use motionphoto_container::jpeg::{
    self, encode_segment, encode_xmp_segment, insert_segment_after_soi, remove_xmp_segment,
    Marker,
};
use motionphoto_container::xmp::{parse_camera_fields, ContainerItem, CAMERA_NS, CONTAINER_NS};
use motionphoto_container::{
    assemble, validate, Assembler, CheckName, ContainerDirectory, ErrorKind, MotionPhotoReader,
    Semantic, XmpPacket,
};

const COVER_SIZE: usize = 50_000;

/// Baseline JPEG of exactly `size` bytes, padded with a comment segment.
fn cover_of_size(size: usize) -> Vec<u8> {
    let scan_header = [0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00];
    let entropy: Vec<u8> = (0..100u32).map(|i| (i % 200) as u8).collect();
    let fixed = 2 + 4 + scan_header.len() + entropy.len() + 2;
    assert!(size >= fixed && size - fixed <= jpeg::MAX_SEGMENT_LENGTH - 2);

    let mut data = vec![0xFF, 0xD8];
    data.extend(encode_segment(Marker::COM, &vec![b'#'; size - fixed]).unwrap());
    data.extend(scan_header);
    data.extend(entropy);
    data.extend([0xFF, 0xD9]);
    assert_eq!(data.len(), size);
    data
}

/// ftyp + moov + mdat, roughly the shape of a one second clip.
fn synthetic_mp4() -> Vec<u8> {
    fn boxed(kind: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut b = ((body.len() + 8) as u32).to_be_bytes().to_vec();
        b.extend(kind);
        b.extend(body);
        b
    }
    let mut data = boxed(b"ftyp", b"isom\x00\x00\x02\x00isomiso2avc1mp41");
    data.extend(boxed(b"moov", &[0x11; 600]));
    let payload: Vec<u8> = (0..24_000u32).map(|i| (i * 7 % 256) as u8).collect();
    data.extend(boxed(b"mdat", &payload));
    data
}

#[test]
fn test_decode_recovers_encoded_parts() {
    let video = synthetic_mp4();
    for size in [300, 4_000, COVER_SIZE] {
        let cover = cover_of_size(size);
        let photo = assemble(&cover, &video).unwrap();

        let reader = MotionPhotoReader::new(&photo.data).unwrap();
        assert_eq!(reader.primary().unwrap(), photo.primary());
        assert_eq!(reader.video().unwrap(), &video[..]);
        assert_eq!(remove_xmp_segment(reader.primary().unwrap()).unwrap(), cover);
    }
}

#[test]
fn test_remove_undoes_insert() {
    let cover = cover_of_size(1_000);
    let segments = [
        encode_xmp_segment(b"<x:xmpmeta xmlns:x=\"adobe:ns:meta/\"/>").unwrap(),
        encode_xmp_segment(&XmpPacket::new(ContainerDirectory::motion_photo(1, 2)).to_bytes().unwrap())
            .unwrap(),
    ];
    for segment in segments {
        let injected = insert_segment_after_soi(&cover, &segment).unwrap();
        assert_eq!(injected.len(), cover.len() + segment.len());
        assert_eq!(remove_xmp_segment(&injected).unwrap(), cover);
    }
}

#[test]
fn test_lengths_sum_to_file_size() {
    let video = synthetic_mp4();
    for size in (200..20_000).step_by(997) {
        let photo = assemble(&cover_of_size(size), &video).unwrap();
        let dir = MotionPhotoReader::new(&photo.data).unwrap().directory().clone();
        assert_eq!(dir.total_length(), Some(photo.data.len() as u64), "cover {size}");
    }
}

#[test]
fn test_oversized_packet_rejected() {
    let dir = ContainerDirectory::new(vec![
        ContainerItem::new("x".repeat(70_000), Semantic::Primary, 1),
        ContainerItem::motion_photo(1),
    ]);
    let packet = XmpPacket::new(dir).to_bytes().unwrap();

    let err = encode_xmp_segment(&packet).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FormatViolation);
    assert!(err.to_string().contains("XMP packet too large"), "{err}");
}

#[test]
fn test_scenario_a_encode() {
    let video = synthetic_mp4();
    let photo = assemble(&cover_of_size(COVER_SIZE), &video).unwrap();

    assert_eq!(&photo.data[..2], &[0xFF, 0xD8]);
    let packet = jpeg::find_xmp_segment(&photo.data)
        .unwrap()
        .and_then(|s| s.xmp_packet())
        .unwrap();
    let camera = parse_camera_fields(packet).unwrap();
    assert_eq!(camera.motion_photo, Some(1));
    assert_eq!(camera.motion_photo_version, Some(1));
    assert_eq!(camera.presentation_timestamp_us, Some(0));

    assert_eq!(photo.primary_length + photo.video_length, photo.data.len() as u64);
    assert_eq!(photo.video_length, video.len() as u64);
}

#[test]
fn test_scenario_b_verify_encoded() {
    let photo = assemble(&cover_of_size(COVER_SIZE), &synthetic_mp4()).unwrap();
    let report = validate("clip.MP.jpg", &photo.data);

    assert!(report.passed(), "{:#?}", report.checks);
    assert_eq!(report.checks.len(), 5);
    assert_eq!(report.failures().count(), 0);
}

#[test]
fn test_scenario_c_plain_jpeg() {
    let report = validate("holiday.jpg", &cover_of_size(COVER_SIZE));

    assert!(!report.passed());
    assert!(!report.check(CheckName::XmpMetadata).unwrap().passed);
    assert!(!report.check(CheckName::ContainerDirectory).unwrap().passed);
    assert!(!report.check(CheckName::Filename).unwrap().passed);
    assert!(report.check(CheckName::JpegType).unwrap().passed);
}

#[test]
fn test_scenario_d_undeclared_bytes() {
    let mut data = assemble(&cover_of_size(COVER_SIZE), &synthetic_mp4()).unwrap().data;
    data.extend(b"appended after the fact");

    let reader = MotionPhotoReader::new(&data).unwrap();
    assert_eq!(reader.video().unwrap_err().kind(), ErrorKind::Inconsistency);

    let report = validate("clip.MP.jpg", &data);
    let structure = report.check(CheckName::FileStructure).unwrap();
    assert!(!structure.passed);
    assert_eq!(structure.kind, Some(ErrorKind::Inconsistency));
}

#[test]
fn test_scenario_e_deterministic() {
    let cover = cover_of_size(COVER_SIZE);
    let video = synthetic_mp4();
    let first = Assembler::new().assemble(&cover, &video).unwrap();
    let second = Assembler::new().assemble(&cover, &video).unwrap();
    assert_eq!(first.data, second.data);
}

#[test]
fn test_reads_camera_written_packet() {
    // Attribute form with the prefixes phones use.
    let packet = format!(
        r#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about=""
        xmlns:GCamera="{CAMERA_NS}"
        xmlns:Container="{CONTAINER_NS}"
        xmlns:Item="http://ns.google.com/photos/1.0/container/item/"
        GCamera:MotionPhoto="1"
        GCamera:MotionPhotoVersion="1"
        GCamera:MotionPhotoPresentationTimestampUs="0">
      <Container:Directory>
        <rdf:Seq>
          <rdf:li rdf:parseType="Resource">
            <Container:Item Item:Mime="image/jpeg" Item:Semantic="Primary" Item:Length="{{P}}"/>
          </rdf:li>
          <rdf:li rdf:parseType="Resource">
            <Container:Item Item:Mime="video/mp4" Item:Semantic="MotionPhoto" Item:Length="{{V}}"/>
          </rdf:li>
        </rdf:Seq>
      </Container:Directory>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>"#
    );
    let cover = cover_of_size(2_000);
    let video = synthetic_mp4();

    // Fill in lengths; the placeholder widths are stable once digits match.
    let mut primary_length = 0usize;
    let mut data = Vec::new();
    for _ in 0..3 {
        let text = packet
            .replace("{P}", &primary_length.to_string())
            .replace("{V}", &video.len().to_string());
        let segment = encode_xmp_segment(text.as_bytes()).unwrap();
        let primary = insert_segment_after_soi(&cover, &segment).unwrap();
        primary_length = primary.len();
        data = primary;
    }
    data.extend(&video);

    let reader = MotionPhotoReader::new(&data).unwrap();
    assert!(reader.packet().camera.is_motion_photo());
    assert_eq!(reader.video().unwrap(), &video[..]);
    assert!(validate("PXL_0001.MP.jpg", &data).passed());
}

#[cfg(feature = "serialize")]
#[test]
fn test_report_serializes() {
    let photo = assemble(&cover_of_size(500), &synthetic_mp4()).unwrap();
    let report = validate("clip.MP.jpg", &photo.data);
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["passed"], true);
    assert_eq!(json["checks"][0]["name"], "filename");
    assert_eq!(json["checks"][4]["name"], "file_structure");
    assert_eq!(json["directory"][1]["semantic"], "MotionPhoto");
}
