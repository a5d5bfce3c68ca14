//! Metadata reader trait and the file-backed implementation.
//!
//! The analysis pipeline only needs "focal length and camera model for this
//! path". [`MetadataReader`] is that seam: [`ExifReader`] reads real files,
//! tests substitute a map-backed reader.

use super::parser::{ExifData, parse_exif};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Lens-relevant metadata of one image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LensMetadata {
    /// Focal length in millimetres, as recorded (not crop-adjusted).
    pub focal_length: Option<f64>,
    pub camera_model: Option<String>,
}

impl From<ExifData> for LensMetadata {
    fn from(exif: ExifData) -> Self {
        Self {
            focal_length: exif.focal_length,
            camera_model: exif.camera_model,
        }
    }
}

pub trait MetadataReader {
    /// Read focal length and camera model. An image without those tags is
    /// `Ok` with `None` fields; `Err` means the file itself could not be read.
    fn read_metadata(&self, path: &Path) -> Result<LensMetadata, MetadataError>;
}

/// Reads EXIF from JPEG, TIFF-based RAW, and PNG files on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExifReader;

impl ExifReader {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataReader for ExifReader {
    fn read_metadata(&self, path: &Path) -> Result<LensMetadata, MetadataError> {
        let bytes = std::fs::read(path)?;
        Ok(parse_exif(&bytes).into())
    }
}
