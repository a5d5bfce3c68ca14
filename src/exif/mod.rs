//! Image metadata extraction, pure Rust, no external EXIF library.
//!
//! | Piece | Role |
//! |---|---|
//! | [`parser`] | Byte-level EXIF parsing (JPEG APP1, TIFF/RAW, PNG `eXIf`) |
//! | [`reader`] | [`MetadataReader`] trait + [`ExifReader`] file implementation |
//!
//! Only FocalLength and Model are read. Anything else in the EXIF is skipped.

pub mod parser;
pub mod reader;

pub use parser::{ExifData, parse_exif};
pub use reader::{ExifReader, LensMetadata, MetadataError, MetadataReader};
