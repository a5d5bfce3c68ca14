//! Focal-length normalization engine.
//!
//! Turns a raw focal length and camera model into a 35mm-equivalent focal
//! length, and an equivalent focal length into a focal group label.
//!
//! ```text
//! (raw_focal, camera_model) ──crop factor──▶ equivalent ──group table──▶ label
//!        50mm, "ILCE-6400"        × 1.5          75.0mm                 人像(85mm)
//! ```
//!
//! The engine owns the two tables loaded at startup and nothing else. It is
//! built once per run and passed by reference to whoever needs it.
//!
//! ## Rounding
//!
//! Equivalent focal lengths are rounded to one decimal place. The rounded
//! value is the identity used from here on: grouping, per-value counts, and
//! the elicited-data store all see `52.5`, never `52.49999`.

use crate::crop_factors::CropFactorTable;
use crate::groups::FocalGroupTable;
use crate::types::{ImageRecord, RecordSource};

/// Round to one decimal place.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Default)]
pub struct FocalEngine {
    crop_factors: CropFactorTable,
    groups: FocalGroupTable,
}

impl FocalEngine {
    pub fn new(crop_factors: CropFactorTable, groups: FocalGroupTable) -> Self {
        Self {
            crop_factors,
            groups,
        }
    }

    pub fn crop_factors(&self) -> &CropFactorTable {
        &self.crop_factors
    }

    pub fn groups(&self) -> &FocalGroupTable {
        &self.groups
    }

    /// Crop factor for a camera model; 1.0 when absent, blank, or unlisted.
    pub fn resolve_crop_factor(&self, camera_model: Option<&str>) -> f64 {
        self.crop_factors.lookup(camera_model).factor()
    }

    pub fn to_equivalent_focal_length(
        &self,
        raw_focal: Option<f64>,
        camera_model: Option<&str>,
    ) -> Option<f64> {
        let raw = raw_focal?;
        Some(round_to_tenth(raw * self.resolve_crop_factor(camera_model)))
    }

    pub fn classify_group(&self, equivalent_focal: Option<f64>) -> String {
        self.groups.classify(equivalent_focal)
    }

    /// Classify an image whose EXIF carried a focal length.
    pub fn record_from_exif(
        &self,
        identifier: String,
        raw_focal: f64,
        camera_model: Option<String>,
    ) -> ImageRecord {
        let equivalent = self.to_equivalent_focal_length(Some(raw_focal), camera_model.as_deref());
        ImageRecord {
            identifier,
            raw_focal_length: Some(raw_focal),
            camera_model,
            equivalent_focal_length: equivalent,
            group_label: self.classify_group(equivalent),
            source: RecordSource::Exif,
        }
    }

    /// Classify an image from a manually supplied equivalent focal length.
    pub fn record_from_manual(
        &self,
        filename: String,
        equivalent: f64,
        source: RecordSource,
    ) -> ImageRecord {
        let equivalent = round_to_tenth(equivalent);
        ImageRecord {
            identifier: filename,
            raw_focal_length: None,
            camera_model: None,
            equivalent_focal_length: Some(equivalent),
            group_label: self.classify_group(Some(equivalent)),
            source,
        }
    }
}
