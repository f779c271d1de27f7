//! Motion Photo container codec.
//!
//! A Motion Photo is a JPEG whose XMP metadata carries a container directory
//! listing the items stored back to back in the file: the JPEG itself
//! (`Primary`) followed by an MP4 video (`MotionPhoto`). Readers that only
//! understand JPEG stop at EOI and show the still image.
//!
//! # Modules
//!
//! - `jpeg` - Marker-segment scanning, segment encoding and XMP segment splicing
//! - `xmp` - Container directory model, RDF packet generation and parsing
//! - `assemble` - Cover + video assembly with self-consistent length declaration
//! - `decode` - Recovering the primary image and video from a file
//! - `validate` - Five-check conformance report
//! - `mp4` - Top-level MP4 box sniffing for the embedded video
//!
//! Everything works on byte slices; callers do their own I/O.

pub mod assemble;
pub mod decode;
pub mod error;
pub mod jpeg;
pub mod mp4;
pub mod validate;
pub mod xmp;

pub use assemble::{
    assemble, Assembler, MotionPhoto, DEFAULT_MAX_SIZING_ATTEMPTS, MIN_SIZING_ATTEMPTS,
};
pub use decode::{MotionPhotoReader, PartLayout};
pub use error::{Error, ErrorKind, Result};
pub use validate::{validate, CheckName, CheckResult, ValidationReport, Validator, XmpSource};
pub use xmp::{ContainerDirectory, ContainerItem, Semantic, XmpPacket};
