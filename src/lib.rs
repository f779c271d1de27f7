//! motionphoto - Build and verify Motion Photo files
//!
//! This library crate exposes the encode, verify and extract pipelines used by
//! the CLI, for integration testing and embedding.

pub mod config;
pub mod encode;
pub mod error;
pub mod extract;
pub mod verify;

pub use encode::{default_output_path, encode_file, EncodeOptions, EncodeOutcome};
pub use error::{Error, Result, Step};
pub use extract::{extract_file, ExtractOutcome};
pub use verify::verify_file;
