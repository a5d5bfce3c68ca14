//! Shared test utilities for the focal-stats test suite.
//!
//! Provides engine and record builders, elicited-entry fixtures, synthetic
//! EXIF containers, and a map-backed [`MetadataReader`].
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let engine = engine_with_factors(&[("ilce-6400", 1.5)]);
//! let jpeg = jpeg_with_exif(&exif_tiff(false, Some("ILCE-6400"), Some((35, 1))));
//! let records = records_for(&[24.0, 24.0, 50.0]);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};

use crate::crop_factors::CropFactorTable;
use crate::engine::{FocalEngine, round_to_tenth};
use crate::exif::{LensMetadata, MetadataError, MetadataReader};
use crate::groups::FocalGroupTable;
use crate::store::ElicitedEntry;
use crate::types::{ImageRecord, RecordSource};

// =========================================================================
// Engine and records
// =========================================================================

/// Engine with the stock group table and the given crop factors.
pub fn engine_with_factors(factors: &[(&str, f64)]) -> FocalEngine {
    let table = CropFactorTable::from_entries(
        factors
            .iter()
            .map(|(model, factor)| (model.to_string(), *factor)),
    );
    FocalEngine::new(table, FocalGroupTable::default())
}

/// An EXIF-sourced record for a full-frame body.
pub fn exif_record(identifier: &str, equivalent: Option<f64>, table: &FocalGroupTable) -> ImageRecord {
    ImageRecord {
        identifier: identifier.to_string(),
        raw_focal_length: equivalent,
        camera_model: None,
        equivalent_focal_length: equivalent,
        group_label: table.classify(equivalent),
        source: RecordSource::Exif,
    }
}

/// One full-frame EXIF record per value, classified with the stock table.
pub fn records_for(equivalents: &[f64]) -> Vec<ImageRecord> {
    let table = FocalGroupTable::default();
    equivalents
        .iter()
        .enumerate()
        .map(|(i, &eq)| exif_record(&format!("img-{i:03}.jpg"), Some(eq), &table))
        .collect()
}

// =========================================================================
// Elicited data
// =========================================================================

pub fn fixed_timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 16)
        .and_then(|d| d.and_hms_opt(14, 3, 11))
        .unwrap()
}

/// An entry as the sensor menu would produce it for `crop`.
pub fn elicited_entry(raw: f64, crop: f64) -> ElicitedEntry {
    let code = match crop {
        c if c == 1.5 => "2",
        c if c == 1.6 => "3",
        c if c == 2.0 => "4",
        c if c == 2.7 => "5",
        _ => "1",
    };
    ElicitedEntry {
        raw_focal_length: raw,
        crop_factor: crop,
        equivalent_focal_length: round_to_tenth(raw * crop),
        sensor_choice_code: code.to_string(),
        recorded_at: Some(fixed_timestamp()),
    }
}

// =========================================================================
// Synthetic EXIF containers
// =========================================================================

/// Build a TIFF block with an IFD0 holding Model and a pointer to an Exif
/// sub-IFD holding FocalLength as `(numerator, denominator)`.
pub fn exif_tiff(big_endian: bool, model: Option<&str>, focal: Option<(u32, u32)>) -> Vec<u8> {
    let u16b = |v: u16| if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
    let u32b = |v: u32| if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };

    let model_bytes: Option<Vec<u8>> = model.map(|m| {
        let mut b = m.as_bytes().to_vec();
        b.push(0);
        b
    });

    let ifd0_entries = model.is_some() as u32 + focal.is_some() as u32;
    let ifd0_offset = 8u32;
    let exif_offset = ifd0_offset + 2 + ifd0_entries * 12 + 4;
    let exif_len = if focal.is_some() { 2 + 12 + 4 } else { 0 };
    let data_offset = exif_offset + exif_len;
    let rational_offset = data_offset;
    let model_offset = data_offset + if focal.is_some() { 8 } else { 0 };

    let mut out = Vec::new();
    out.extend_from_slice(if big_endian { b"MM" } else { b"II" });
    out.extend_from_slice(&u16b(42));
    out.extend_from_slice(&u32b(ifd0_offset));

    // IFD0
    out.extend_from_slice(&u16b(ifd0_entries as u16));
    if let Some(bytes) = &model_bytes {
        out.extend_from_slice(&u16b(0x0110));
        out.extend_from_slice(&u16b(2));
        out.extend_from_slice(&u32b(bytes.len() as u32));
        if bytes.len() <= 4 {
            let mut inline = bytes.clone();
            inline.resize(4, 0);
            out.extend_from_slice(&inline);
        } else {
            out.extend_from_slice(&u32b(model_offset));
        }
    }
    if focal.is_some() {
        out.extend_from_slice(&u16b(0x8769));
        out.extend_from_slice(&u16b(4));
        out.extend_from_slice(&u32b(1));
        out.extend_from_slice(&u32b(exif_offset));
    }
    out.extend_from_slice(&u32b(0));

    // Exif sub-IFD
    if let Some((num, den)) = focal {
        out.extend_from_slice(&u16b(1));
        out.extend_from_slice(&u16b(0x920A));
        out.extend_from_slice(&u16b(5));
        out.extend_from_slice(&u32b(1));
        out.extend_from_slice(&u32b(rational_offset));
        out.extend_from_slice(&u32b(0));
        out.extend_from_slice(&u32b(num));
        out.extend_from_slice(&u32b(den));
    }

    if let Some(bytes) = &model_bytes
        && bytes.len() > 4
    {
        out.extend_from_slice(bytes);
    }
    out
}

/// Wrap a TIFF block in a minimal JPEG: SOI, JFIF APP0, Exif APP1, SOS, EOI.
pub fn jpeg_with_exif(tiff: &[u8]) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8];
    let jfif = b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0";
    out.extend_from_slice(&[0xFF, 0xE0]);
    out.extend_from_slice(&((jfif.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(jfif);

    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((tiff.len() + 6 + 2) as u16).to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(tiff);

    out.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02]);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out
}

/// Wrap a TIFF block in a minimal PNG: signature, IHDR, eXIf, IEND.
pub fn png_with_exif(tiff: &[u8]) -> Vec<u8> {
    fn chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(kind);
        out.extend_from_slice(data);
        // CRC is not checked by the reader
        out.extend_from_slice(&[0, 0, 0, 0]);
    }
    let mut out = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    let mut ihdr = Vec::new();
    ihdr.extend_from_slice(&1u32.to_be_bytes());
    ihdr.extend_from_slice(&1u32.to_be_bytes());
    ihdr.extend_from_slice(&[8, 2, 0, 0, 0]);
    chunk(&mut out, b"IHDR", &ihdr);
    chunk(&mut out, b"eXIf", tiff);
    chunk(&mut out, b"IEND", &[]);
    out
}

// =========================================================================
// Metadata reader double
// =========================================================================

/// Answers from a map keyed by filename; unknown files have no metadata.
/// Files listed in `unreadable` fail with an IO error.
#[derive(Default)]
pub struct MockReader {
    pub metadata: HashMap<String, LensMetadata>,
    pub unreadable: Vec<String>,
    pub calls: RefCell<Vec<PathBuf>>,
}

impl MockReader {
    pub fn with(mut self, filename: &str, focal: Option<f64>, model: Option<&str>) -> Self {
        self.metadata.insert(
            filename.to_string(),
            LensMetadata {
                focal_length: focal,
                camera_model: model.map(String::from),
            },
        );
        self
    }

    pub fn failing(mut self, filename: &str) -> Self {
        self.unreadable.push(filename.to_string());
        self
    }
}

impl MetadataReader for MockReader {
    fn read_metadata(&self, path: &Path) -> Result<LensMetadata, MetadataError> {
        self.calls.borrow_mut().push(path.to_path_buf());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        if self.unreadable.contains(&name) {
            return Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into());
        }
        Ok(self.metadata.get(&name).cloned().unwrap_or_default())
    }
}
