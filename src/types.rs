//! Per-image records shared by the analysis, statistics, and report stages.

use serde::{Deserialize, Serialize};

/// Where an image's equivalent focal length came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    /// Read from the file's EXIF and normalized with the crop-factor table.
    Exif,
    /// Reused from a manual entry recorded in an earlier run.
    ElicitedCached,
    /// Entered manually during this run.
    ElicitedFresh,
}

impl RecordSource {
    pub fn is_manual(self) -> bool {
        !matches!(self, RecordSource::Exif)
    }
}

/// One classified image. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Path relative to the analyzed folder for EXIF records, bare filename
    /// for manual entries (the elicited-data store is keyed by filename).
    pub identifier: String,
    /// Focal length as written in the EXIF, before crop-factor scaling.
    pub raw_focal_length: Option<f64>,
    pub camera_model: Option<String>,
    /// 35mm-equivalent focal length, rounded to 0.1mm.
    pub equivalent_focal_length: Option<f64>,
    pub group_label: String,
    pub source: RecordSource,
}
