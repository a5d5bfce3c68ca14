//! Camera crop-factor table.
//!
//! Maps a camera model, as written in the EXIF `Model` tag, to the ratio
//! between a full-frame sensor diagonal and that camera's sensor diagonal.
//! The table lives in a JSON file the user maintains:
//!
//! ```json
//! {
//!   "ilce-6400": 1.5,
//!   "canon eos 90d": 1.6,
//!   "dc-g9": 2.0
//! }
//! ```
//!
//! Keys are matched case- and whitespace-insensitively: both the file keys
//! and the looked-up model are lower-cased and trimmed.
//!
//! ## Unlisted cameras
//!
//! A camera missing from the table is treated as full-frame (factor 1.0);
//! most users only list their crop-sensor bodies. [`CropFactorLookup`] keeps the reason visible to
//! callers that care, while [`CropFactorTable::factor`] collapses it.
//!
//! ## Loading
//!
//! A missing file yields an empty table. An unreadable or corrupt file also
//! yields an empty table, with a warning. Entries whose factor is not a
//! positive finite number are dropped with a warning.

use std::collections::HashMap;
use std::path::Path;

/// Crop factor of a full-frame (36x24mm) sensor.
pub const FULL_FRAME_CROP_FACTOR: f64 = 1.0;

/// Outcome of looking up a camera model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CropFactorLookup {
    /// The model is in the table.
    Known(f64),
    /// A model was given but the table has no entry for it.
    Unlisted,
    /// No model was given (absent or blank).
    NoModel,
}

impl CropFactorLookup {
    /// The factor to compute with.
    pub fn factor(self) -> f64 {
        match self {
            CropFactorLookup::Known(f) => f,
            // Unlisted bodies count as full-frame; statistics depend on this.
            CropFactorLookup::Unlisted | CropFactorLookup::NoModel => FULL_FRAME_CROP_FACTOR,
        }
    }
}

/// Lower-cased, trimmed camera model.
pub fn normalize_model(model: &str) -> String {
    model.trim().to_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CropFactorTable {
    factors: HashMap<String, f64>,
}

impl CropFactorTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from raw `(model, factor)` pairs, normalizing keys and
    /// dropping invalid factors.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut factors = HashMap::new();
        for (model, factor) in entries {
            let key = normalize_model(model.as_ref());
            if key.is_empty() {
                continue;
            }
            if !(factor.is_finite() && factor > 0.0) {
                tracing::warn!(model = %key, factor, "ignoring invalid crop factor");
                continue;
            }
            factors.insert(key, factor);
        }
        Self { factors }
    }

    /// Load from a JSON file. Never fails; see the [module docs](self).
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    path = %path.display(),
                    "no crop factor file, every camera counts as full-frame"
                );
                return Self::empty();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read crop factor file");
                return Self::empty();
            }
        };
        match serde_json::from_str::<HashMap<String, f64>>(&content) {
            Ok(raw) => Self::from_entries(raw),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to parse crop factor file");
                Self::empty()
            }
        }
    }

    pub fn lookup(&self, camera_model: Option<&str>) -> CropFactorLookup {
        let Some(model) = camera_model.map(normalize_model).filter(|m| !m.is_empty()) else {
            return CropFactorLookup::NoModel;
        };
        match self.factors.get(&model) {
            Some(&f) => CropFactorLookup::Known(f),
            None => CropFactorLookup::Unlisted,
        }
    }

    pub fn factor(&self, camera_model: Option<&str>) -> f64 {
        self.lookup(camera_model).factor()
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}
