//! Focal groups: named, inclusive ranges of equivalent focal length.
//!
//! A group answers "what kind of shot was this?" rather than "which exact
//! focal length": 24mm and 28mm are both wide-angle, 85mm is portrait.
//!
//! ## Lookup order
//!
//! The table is scanned in the order it was configured, and the first range
//! whose bounds contain the value wins. Ranges are not sorted or checked for
//! overlap, so when two ranges share a boundary (the stock table has
//! `66-95` and `95-149`) the earlier one claims it.
//!
//! ## Values outside every range
//!
//! A value that no range contains still gets a label: the value rounded to
//! the nearest integer with an `mm` suffix (`8.4` → `"8mm"`). A missing value
//! gets [`UNKNOWN_GROUP_LABEL`]. Classification never fails.
//!
//! ## Ordering for reports
//!
//! [`GroupKey`] orders labels for display: configured groups first, in table
//! order, then synthetic `Nmm` labels by their number, then anything else
//! alphabetically, with the unknown label last.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Label for images whose equivalent focal length is not known.
pub const UNKNOWN_GROUP_LABEL: &str = "未知焦段";

/// A named, inclusive range of equivalent focal lengths in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FocalGroup {
    pub label: String,
    pub min: f64,
    pub max: f64,
}

impl FocalGroup {
    pub fn new(label: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            label: label.into(),
            min,
            max,
        }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// The stock group table: the common prime and zoom landmarks from
/// ultra-wide through super-telephoto.
pub fn default_focal_groups() -> Vec<FocalGroup> {
    vec![
        FocalGroup::new("超广角(14-19mm)", 14.0, 19.0),
        FocalGroup::new("超广角(20-23mm)", 20.0, 23.0),
        FocalGroup::new("广角(24-28mm)", 24.0, 28.0),
        FocalGroup::new("标准广角(35mm)", 29.0, 40.0),
        FocalGroup::new("标准(50mm)", 41.0, 65.0),
        FocalGroup::new("人像(85mm)", 66.0, 95.0),
        FocalGroup::new("中长焦(100-135mm)", 95.0, 149.0),
        FocalGroup::new("长焦(200mm)", 150.0, 250.0),
        FocalGroup::new("超长焦(300mm)", 251.0, 349.0),
        FocalGroup::new("超长焦(400mm)", 350.0, 449.0),
        FocalGroup::new("超长焦(500-600mm)", 450.0, 649.0),
        FocalGroup::new("超长焦(600mm+)", 650.0, 2000.0),
    ]
}

/// Ordered focal group table. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct FocalGroupTable {
    groups: Vec<FocalGroup>,
}

impl FocalGroupTable {
    pub fn new(groups: Vec<FocalGroup>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[FocalGroup] {
        &self.groups
    }

    /// Label for an equivalent focal length. See the [module docs](self).
    pub fn classify(&self, equivalent: Option<f64>) -> String {
        let Some(value) = equivalent else {
            return UNKNOWN_GROUP_LABEL.to_string();
        };
        self.groups
            .iter()
            .find(|g| g.contains(value))
            .map(|g| g.label.clone())
            .unwrap_or_else(|| synthetic_label(value))
    }

    /// Sort key for a label produced by [`classify`](Self::classify).
    pub fn key(&self, label: &str) -> GroupKey {
        if let Some(pos) = self.groups.iter().position(|g| g.label == label) {
            return GroupKey::Configured(pos);
        }
        if label == UNKNOWN_GROUP_LABEL {
            return GroupKey::Unknown;
        }
        match parse_synthetic_label(label) {
            Some(mm) => GroupKey::Synthetic(mm),
            None => GroupKey::Other(label.to_string()),
        }
    }
}

impl Default for FocalGroupTable {
    fn default() -> Self {
        Self::new(default_focal_groups())
    }
}

/// `"<n>mm"` for a value outside every configured range.
pub fn synthetic_label(value: f64) -> String {
    format!("{}mm", value.round() as i64)
}

fn parse_synthetic_label(label: &str) -> Option<i64> {
    label.strip_suffix("mm")?.parse().ok()
}

/// Display order of group labels. Variant order is the sort order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum GroupKey {
    /// Index into the configured table.
    Configured(usize),
    /// Integer millimetres of a synthetic `Nmm` label.
    Synthetic(i64),
    /// A label this table did not produce (e.g. from an older run's config).
    Other(String),
    Unknown,
}

/// Compare two labels by their [`GroupKey`] under `table`.
pub fn compare_labels(table: &FocalGroupTable, a: &str, b: &str) -> Ordering {
    table.key(a).cmp(&table.key(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> FocalGroupTable {
        FocalGroupTable::default()
    }

    #[test]
    fn absent_value_is_unknown() {
        assert_eq!(table().classify(None), UNKNOWN_GROUP_LABEL);
    }

    #[test]
    fn present_value_is_never_unknown() {
        for v in [0.0, 1.0, 13.9, 24.0, 95.0, 2000.0, 5000.0] {
            assert_ne!(table().classify(Some(v)), UNKNOWN_GROUP_LABEL, "{v}");
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        let t = table();
        assert_eq!(t.classify(Some(24.0)), "广角(24-28mm)");
        assert_eq!(t.classify(Some(28.0)), "广角(24-28mm)");
        assert_eq!(t.classify(Some(14.0)), "超广角(14-19mm)");
        assert_eq!(t.classify(Some(2000.0)), "超长焦(600mm+)");
    }

    #[test]
    fn shared_boundary_goes_to_first_group() {
        // 95 is the max of the portrait range and the min of the next one
        assert_eq!(table().classify(Some(95.0)), "人像(85mm)");
    }

    #[test]
    fn configured_order_wins_over_numeric_order() {
        let t = FocalGroupTable::new(vec![
            FocalGroup::new("wide", 10.0, 100.0),
            FocalGroup::new("normal", 40.0, 60.0),
        ]);
        assert_eq!(t.classify(Some(50.0)), "wide");
    }

    #[test]
    fn gap_between_ranges_gets_synthetic_label() {
        // 19.5 falls between 14-19 and 20-23
        assert_eq!(table().classify(Some(19.5)), "20mm");
        assert_eq!(table().classify(Some(23.4)), "23mm");
    }

    #[test]
    fn below_every_range_gets_synthetic_label() {
        assert_eq!(table().classify(Some(8.4)), "8mm");
        assert_eq!(table().classify(Some(12.6)), "13mm");
    }

    #[test]
    fn above_every_range_gets_synthetic_label() {
        assert_eq!(table().classify(Some(2400.0)), "2400mm");
    }

    #[test]
    fn empty_table_labels_everything_synthetically() {
        let t = FocalGroupTable::new(vec![]);
        assert_eq!(t.classify(Some(50.0)), "50mm");
        assert_eq!(t.classify(None), UNKNOWN_GROUP_LABEL);
    }

    #[test]
    fn key_orders_configured_then_synthetic_then_unknown() {
        let t = table();
        let mut labels = vec![
            UNKNOWN_GROUP_LABEL.to_string(),
            "8mm".to_string(),
            "标准(50mm)".to_string(),
            "2400mm".to_string(),
            "广角(24-28mm)".to_string(),
            "custom".to_string(),
        ];
        labels.sort_by(|a, b| compare_labels(&t, a, b));
        assert_eq!(
            labels,
            vec![
                "广角(24-28mm)",
                "标准(50mm)",
                "8mm",
                "2400mm",
                "custom",
                UNKNOWN_GROUP_LABEL,
            ]
        );
    }

    #[test]
    fn synthetic_key_sorts_numerically() {
        let t = table();
        assert!(t.key("9mm") < t.key("10mm"));
    }
}
