//! Aggregation of classified images into focal statistics.
//!
//! [`aggregate`] counts records two ways:
//!
//! - **By group**: one row per group label, in [`GroupKey`] order
//!   (configured groups in table order, then synthetic `Nmm` labels, then
//!   unknown).
//! - **By value**: one row per distinct equivalent focal length, ascending
//!   numerically. Values are compared at 0.1mm resolution, the same rounding
//!   the engine applies, so `9.0` sorts before `10.0` and `52.5` from two
//!   different bodies is one row.
//!
//! It also picks the most-used group and value for the upgrade suggestion.
//! Ties go to the first row in the order above, so the answer is the same
//! on every run.
//!
//! The result is plain data: rows are what the CSV/JSON writers and the
//! chart print, with no further sorting or grouping.
//!
//! [`GroupKey`]: crate::groups::GroupKey

use crate::groups::FocalGroupTable;
use crate::types::ImageRecord;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Nothing to aggregate. Not a failure: the caller reports "nothing to
/// analyze" and stops.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no images with a usable focal length")]
pub struct EmptyInput;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupCount {
    pub label: String,
    pub count: usize,
    /// Share of all images, 0-100.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocalCount {
    /// Equivalent focal length in mm, at 0.1mm resolution.
    pub focal_length: f64,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub total: usize,
    pub groups: Vec<GroupCount>,
    pub focal_lengths: Vec<FocalCount>,
    pub most_used_group: String,
    /// `None` only when no record has an equivalent focal length.
    pub most_used_focal_length: Option<f64>,
}

impl AnalysisResult {
    pub fn group_count(&self, label: &str) -> usize {
        self.groups
            .iter()
            .find(|g| g.label == label)
            .map_or(0, |g| g.count)
    }

    pub fn focal_count(&self, focal_length: f64) -> usize {
        let key = tenths(focal_length);
        self.focal_lengths
            .iter()
            .find(|f| tenths(f.focal_length) == key)
            .map_or(0, |f| f.count)
    }
}

/// Focal length as an integer count of 0.1mm, the per-value grouping key.
fn tenths(mm: f64) -> i64 {
    (mm * 10.0).round() as i64
}

fn percentage(count: usize, total: usize) -> f64 {
    count as f64 / total as f64 * 100.0
}

/// Index of the highest count; the earliest index wins a tie.
fn first_max(counts: impl Iterator<Item = usize>) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (i, c) in counts.enumerate() {
        if best.is_none_or(|(_, best_count)| c > best_count) {
            best = Some((i, c));
        }
    }
    best.map(|(i, _)| i)
}

pub fn aggregate(
    records: &[ImageRecord],
    table: &FocalGroupTable,
) -> Result<AnalysisResult, EmptyInput> {
    if records.is_empty() {
        return Err(EmptyInput);
    }
    let total = records.len();

    let mut by_label: HashMap<&str, usize> = HashMap::new();
    let mut by_value: BTreeMap<i64, usize> = BTreeMap::new();
    for record in records {
        *by_label.entry(record.group_label.as_str()).or_default() += 1;
        if let Some(eq) = record.equivalent_focal_length {
            *by_value.entry(tenths(eq)).or_default() += 1;
        }
    }

    let mut labels: Vec<(&str, usize)> = by_label.into_iter().collect();
    labels.sort_by_key(|(label, _)| table.key(label));
    let groups: Vec<GroupCount> = labels
        .into_iter()
        .map(|(label, count)| GroupCount {
            label: label.to_string(),
            count,
            percentage: percentage(count, total),
        })
        .collect();

    let focal_lengths: Vec<FocalCount> = by_value
        .into_iter()
        .map(|(t, count)| FocalCount {
            focal_length: t as f64 / 10.0,
            count,
            percentage: percentage(count, total),
        })
        .collect();

    let most_used_group = first_max(groups.iter().map(|g| g.count))
        .map(|i| groups[i].label.clone())
        .unwrap_or_default();
    let most_used_focal_length =
        first_max(focal_lengths.iter().map(|f| f.count)).map(|i| focal_lengths[i].focal_length);

    Ok(AnalysisResult {
        total,
        groups,
        focal_lengths,
        most_used_group,
        most_used_focal_length,
    })
}
