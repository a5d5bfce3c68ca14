//! # Focal Stats
//!
//! Find out which focal lengths you actually shoot. Point it at a folder of
//! photos and it reports how often each focal range (wide, standard,
//! portrait, tele...) and each exact focal length was used, normalized to
//! 35mm-equivalent so photos from different bodies are comparable.
//!
//! # Architecture: Normalize, Classify, Count
//!
//! ```text
//! 1. Scan       photos/          →  candidates          (filesystem walk)
//! 2. Classify   EXIF + crop      →  ImageRecord per image
//!               no EXIF          →  ask once, remember  (resolver + store)
//! 3. Aggregate  records          →  AnalysisResult      (counts, most used)
//! 4. Report     AnalysisResult   →  outputs/<timestamp>/ (CSV, JSON, chart)
//! ```
//!
//! Classification and aggregation are pure functions over in-memory tables,
//! so unit tests exercise them without touching the filesystem. Only the
//! scanner, the metadata reader, the store, and the reporter do I/O.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Recursive discovery of image files by extension |
//! | [`exif`] | Pure-Rust EXIF reading: FocalLength and Model only |
//! | [`crop_factors`] | Camera model → crop factor table, loaded from JSON |
//! | [`groups`] | Named focal ranges and label ordering |
//! | [`engine`] | 35mm-equivalent conversion and group classification |
//! | [`prompt`] | `Console` trait and the two questions asked about an image |
//! | [`store`] | Persisted manual answers (`missing_exif_data.json`) |
//! | [`resolver`] | Cache-or-ask state machine for images without a focal length |
//! | [`analyze`] | The two-pass run tying the above together |
//! | [`stats`] | Aggregation into per-group and per-value counts |
//! | [`report`] | Timestamped run folder with CSV, JSON, and chart files |
//! | [`config`] | `focal-stats.toml` loading, merging, and validation |
//! | [`types`] | `ImageRecord`, the unit everything downstream counts |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Unknown Cameras Count as Full-Frame
//!
//! The crop-factor table only has to list crop bodies. A camera missing from
//! it, or a photo with no Model tag, gets a factor of 1.0. This keeps the
//! table short and means a fresh install with no table at all still produces
//! sensible numbers for full-frame shooters.
//!
//! ## Ask Once, Per Filename
//!
//! Scans and exported files often lose their EXIF. Rather than dropping them,
//! the user is asked for the focal length and sensor size, and the answer is
//! stored under the bare filename. Keying by filename rather than path means
//! reorganizing folders does not trigger the questions again.
//!
//! ## No Chart Library
//!
//! The chart is a text bar chart written next to the CSV. It renders in any
//! terminal and any editor, and needs no font with CJK coverage to show the
//! group labels.

pub mod analyze;
pub mod config;
pub mod crop_factors;
pub mod engine;
pub mod exif;
pub mod groups;
pub mod output;
pub mod prompt;
pub mod report;
pub mod resolver;
pub mod scan;
pub mod stats;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
