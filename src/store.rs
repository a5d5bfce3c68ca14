//! Persistent store of manually entered focal lengths.
//!
//! Scans, screenshots, and files stripped by export tools carry no EXIF.
//! For those the user types the focal length and sensor size once; this
//! module remembers the answer so the next run does not ask again.
//!
//! ## Storage
//!
//! A single JSON object keyed by image filename (not path, so moving a file
//! between folders keeps its entry):
//!
//! ```json
//! {
//!   "scan-042.tif": {
//!     "focal_length": 35.0,
//!     "crop_factor": 1.5,
//!     "equivalent_focal": 52.5,
//!     "sensor_choice": "2",
//!     "timestamp": "2026-10-16T14:03:11.274512"
//!   }
//! }
//! ```
//!
//! ## Durability
//!
//! [`ElicitedStore::record`] rewrites the whole file right after inserting,
//! so a crash mid-run loses at most the answer being typed. A failed write
//! is returned to the caller but the in-memory entry stays, so the current
//! run still uses it.
//!
//! ## First run and damaged files
//!
//! [`ElicitedStore::load`] returns an empty store when the file does not
//! exist. Entries are read one at a time: only `focal_length`,
//! `crop_factor`, and `equivalent_focal` are required, and an entry that
//! still does not parse is skipped with a warning and written back verbatim
//! on the next save. A file that cannot be read or parsed at all yields an
//! empty store; before the next save overwrites it, it is renamed to
//! `missing_exif_data.json.bak`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One manual answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElicitedEntry {
    #[serde(rename = "focal_length")]
    pub raw_focal_length: f64,
    pub crop_factor: f64,
    #[serde(rename = "equivalent_focal")]
    pub equivalent_focal_length: f64,
    /// What the user typed at the sensor prompt, verbatim (may be empty).
    #[serde(rename = "sensor_choice", default)]
    pub sensor_choice_code: String,
    /// `None` for hand-written entries without a usable timestamp.
    #[serde(
        rename = "timestamp",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub recorded_at: Option<NaiveDateTime>,
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| serde_json::from_value(v).ok()))
}

/// Filename → manual answer, bound to the file it persists to.
#[derive(Debug, Clone)]
pub struct ElicitedStore {
    path: PathBuf,
    entries: BTreeMap<String, ElicitedEntry>,
    /// Entries that did not parse, kept as found.
    unrecognized: BTreeMap<String, serde_json::Value>,
    /// The file on disk is unreadable and must be moved aside before a save.
    backup_pending: bool,
}

impl ElicitedStore {
    /// An empty store that will persist to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
            unrecognized: BTreeMap::new(),
            backup_pending: false,
        }
    }

    /// Load from `path`. Never fails; see the [module docs](self).
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Self::empty(path),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read elicited data");
                return Self::damaged(path);
            }
        };
        let raw: BTreeMap<String, serde_json::Value> = match serde_json::from_str(&content) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to parse elicited data");
                return Self::damaged(path);
            }
        };

        let mut store = Self::empty(path);
        for (filename, value) in raw {
            match ElicitedEntry::deserialize(&value) {
                Ok(entry) => {
                    store.entries.insert(filename, entry);
                }
                Err(e) => {
                    tracing::warn!(
                        path = %store.path.display(),
                        filename = %filename,
                        error = %e,
                        "skipping elicited entry"
                    );
                    store.unrecognized.insert(filename, value);
                }
            }
        }
        store
    }

    fn damaged(path: PathBuf) -> Self {
        Self {
            backup_pending: true,
            ..Self::empty(path)
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an unreadable file is moved before it would be overwritten.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".bak");
        PathBuf::from(name)
    }

    pub fn get(&self, filename: &str) -> Option<&ElicitedEntry> {
        self.entries.get(filename)
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.entries.contains_key(filename)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in filename order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ElicitedEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Insert (or replace) an entry and flush the store to disk.
    pub fn record(&mut self, filename: String, entry: ElicitedEntry) -> Result<(), StoreError> {
        self.unrecognized.remove(&filename);
        self.entries.insert(filename, entry);
        self.save()
    }

    /// Write the whole store to its file, creating parent directories.
    pub fn save(&mut self) -> Result<(), StoreError> {
        let mut document = self.unrecognized.clone();
        for (filename, entry) in &self.entries {
            document.insert(filename.clone(), serde_json::to_value(entry)?);
        }
        let json = serde_json::to_string_pretty(&document)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        if self.backup_pending {
            let backup = self.backup_path();
            match std::fs::rename(&self.path, &backup) {
                Ok(()) => {
                    tracing::warn!(backup = %backup.display(), "moved unreadable elicited data aside")
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(source) => return Err(StoreError::Io { path: backup, source }),
            }
            self.backup_pending = false;
        }
        std::fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
