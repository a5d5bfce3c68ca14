//! Analyzer configuration.
//!
//! Handles loading, validating, and merging `focal-stats.toml`. Every key is
//! optional: stock defaults are serialized to a TOML table, the user file is
//! merged on top, and the result is deserialized and validated.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! crop_factors_file = "camera_crop_factors.json"
//! elicited_data_file = "missing_exif_data.json"
//! output_root = "outputs"
//! extensions = ["jpg", "jpeg", "tiff", "tif", "png", "arw", "cr2", "nef"]
//!
//! [[focal_groups]]
//! label = "超广角(14-19mm)"
//! min = 14
//! max = 19
//!
//! # ... one [[focal_groups]] table per range, in lookup order
//! ```
//!
//! ## Focal groups replace, not merge
//!
//! Tables merge key by key, but arrays are replaced whole. Declaring any
//! `[[focal_groups]]` replaces the entire stock list, so the file always
//! shows the complete lookup order.
//!
//! ## Errors
//!
//! Unlike the crop-factor and elicited-data files, this file is written by
//! hand on purpose, so a typo is an error rather than a silent fallback.
//! Unknown keys are rejected.

use crate::groups::{FocalGroup, FocalGroupTable, default_focal_groups};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "focal-stats.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Analyzer configuration loaded from `focal-stats.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// JSON file mapping camera model → crop factor.
    pub crop_factors_file: String,
    /// JSON file holding manually entered focal lengths.
    pub elicited_data_file: String,
    /// Directory under which each run creates a timestamped report folder.
    pub output_root: String,
    /// File extensions (case-insensitive, no dot) considered images.
    pub extensions: Vec<String>,
    /// Focal groups in lookup order.
    pub focal_groups: Vec<FocalGroup>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            crop_factors_file: "camera_crop_factors.json".to_string(),
            elicited_data_file: "missing_exif_data.json".to_string(),
            output_root: "outputs".to_string(),
            extensions: ["jpg", "jpeg", "tiff", "tif", "png", "arw", "cr2", "nef"]
                .into_iter()
                .map(String::from)
                .collect(),
            focal_groups: default_focal_groups(),
        }
    }
}

impl AnalyzerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.crop_factors_file.trim().is_empty() {
            return Err(ConfigError::Validation(
                "crop_factors_file must not be empty".into(),
            ));
        }
        if self.elicited_data_file.trim().is_empty() {
            return Err(ConfigError::Validation(
                "elicited_data_file must not be empty".into(),
            ));
        }
        if self.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "extensions must list at least one file extension".into(),
            ));
        }
        for (i, group) in self.focal_groups.iter().enumerate() {
            if group.label.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "focal_groups[{i}].label must not be empty"
                )));
            }
            if !group.min.is_finite() || !group.max.is_finite() {
                return Err(ConfigError::Validation(format!(
                    "focal_groups[{i}] ({}) bounds must be finite numbers",
                    group.label
                )));
            }
            if group.min > group.max {
                return Err(ConfigError::Validation(format!(
                    "focal_groups[{i}] ({}) has min {} greater than max {}",
                    group.label, group.min, group.max
                )));
            }
        }
        Ok(())
    }

    pub fn focal_group_table(&self) -> FocalGroupTable {
        FocalGroupTable::new(self.focal_groups.clone())
    }

    /// Lower-cased extensions without a leading dot.
    pub fn normalized_extensions(&self) -> Vec<String> {
        self.extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect()
    }

    pub fn crop_factors_path(&self) -> PathBuf {
        PathBuf::from(&self.crop_factors_file)
    }

    pub fn elicited_data_path(&self) -> PathBuf {
        PathBuf::from(&self.elicited_data_file)
    }

    pub fn output_root_path(&self) -> PathBuf {
        PathBuf::from(&self.output_root)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AnalyzerConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay, arrays included, replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. `Ok(None)` if it doesn't exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<AnalyzerConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AnalyzerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when the file
/// does not exist.
pub fn load_config(path: &Path) -> Result<AnalyzerConfig, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// Returns a fully-commented stock `focal-stats.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# focal-stats configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys are an error.

# JSON object mapping camera model (as in the EXIF "Model" tag) to crop factor.
# Matching ignores case and surrounding whitespace. Cameras not listed count
# as full-frame (crop factor 1.0). A missing file is fine.
crop_factors_file = "camera_crop_factors.json"

# Where focal lengths you type in for images without metadata are remembered,
# keyed by filename, so you are only asked once per image.
elicited_data_file = "missing_exif_data.json"

# Each run writes its reports to <output_root>/<YYYYmmddHHMMSS>/.
output_root = "outputs"

# File extensions (case-insensitive) treated as images.
extensions = ["jpg", "jpeg", "tiff", "tif", "png", "arw", "cr2", "nef"]

# ---------------------------------------------------------------------------
# Focal groups
# ---------------------------------------------------------------------------
# Inclusive ranges of 35mm-equivalent focal length, checked top to bottom.
# The first range containing a value wins, so order matters where ranges
# touch (95mm below lands in the portrait group). Values outside every range
# are labelled with their rounded millimetres, e.g. "10mm".
#
# Declaring any [[focal_groups]] replaces this whole list.

[[focal_groups]]
label = "超广角(14-19mm)"
min = 14.0
max = 19.0

[[focal_groups]]
label = "超广角(20-23mm)"
min = 20.0
max = 23.0

[[focal_groups]]
label = "广角(24-28mm)"
min = 24.0
max = 28.0

[[focal_groups]]
label = "标准广角(35mm)"
min = 29.0
max = 40.0

[[focal_groups]]
label = "标准(50mm)"
min = 41.0
max = 65.0

[[focal_groups]]
label = "人像(85mm)"
min = 66.0
max = 95.0

[[focal_groups]]
label = "中长焦(100-135mm)"
min = 95.0
max = 149.0

[[focal_groups]]
label = "长焦(200mm)"
min = 150.0
max = 250.0

[[focal_groups]]
label = "超长焦(300mm)"
min = 251.0
max = 349.0

[[focal_groups]]
label = "超长焦(400mm)"
min = 350.0
max = 449.0

[[focal_groups]]
label = "超长焦(500-600mm)"
min = 450.0
max = 649.0

[[focal_groups]]
label = "超长焦(600mm+)"
min = 650.0
max = 2000.0
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_stock_groups() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.focal_groups.len(), 12);
        assert_eq!(config.focal_groups[2].label, "广角(24-28mm)");
        assert_eq!(config.crop_factors_file, "camera_crop_factors.json");
        assert_eq!(config.elicited_data_file, "missing_exif_data.json");
    }

    #[test]
    fn default_config_is_valid() {
        AnalyzerConfig::default().validate().unwrap();
    }

    #[test]
    fn stock_config_toml_matches_defaults() {
        let parsed: AnalyzerConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(parsed, AnalyzerConfig::default());
    }

    #[test]
    fn parse_partial_config() {
        let config: AnalyzerConfig = toml::from_str(r#"output_root = "reports""#).unwrap();
        assert_eq!(config.output_root, "reports");
        assert_eq!(config.focal_groups, default_focal_groups());
    }

    #[test]
    fn unknown_keys_rejected() {
        let result: Result<AnalyzerConfig, _> = toml::from_str(r#"crop_factor_file = "x.json""#);
        assert!(result.is_err());
    }

    #[test]
    fn focal_groups_replace_stock_list() {
        let overlay: toml::Value = toml::from_str(
            r#"
[[focal_groups]]
label = "wide"
min = 10
max = 35

[[focal_groups]]
label = "long"
min = 36
max = 600
"#,
        )
        .unwrap();
        let config = resolve_config(Some(overlay)).unwrap();
        assert_eq!(
            config.focal_groups,
            vec![FocalGroup::new("wide", 10.0, 35.0), FocalGroup::new("long", 36.0, 600.0)]
        );
        // Scalars untouched by the overlay keep their defaults
        assert_eq!(config.output_root, "outputs");
    }

    #[test]
    fn merge_toml_overlays_scalars_and_keeps_rest() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("a").and_then(|v| v.as_integer()), Some(1));
        assert_eq!(merged.get("b").and_then(|v| v.as_integer()), Some(3));
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let mut config = AnalyzerConfig::default();
        config.focal_groups = vec![FocalGroup::new("broken", 50.0, 35.0)];
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_empty_label() {
        let mut config = AnalyzerConfig::default();
        config.focal_groups[0].label = "  ".into();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_no_extensions() {
        let mut config = AnalyzerConfig::default();
        config.extensions = vec![];
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_allows_empty_group_list() {
        let mut config = AnalyzerConfig::default();
        config.focal_groups = vec![];
        config.validate().unwrap();
    }

    #[test]
    fn normalized_extensions_lowercase_and_strip_dots() {
        let mut config = AnalyzerConfig::default();
        config.extensions = vec![".JPG".into(), " Nef ".into(), "".into()];
        assert_eq!(config.normalized_extensions(), vec!["jpg", "nef"]);
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(config, AnalyzerConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &path,
            r#"
crop_factors_file = "bodies.json"
extensions = ["jpg"]
"#,
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.crop_factors_file, "bodies.json");
        assert_eq!(config.extensions, vec!["jpg"]);
        assert_eq!(config.elicited_data_file, "missing_exif_data.json");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "output_root = ").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validation_error_surfaces() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &path,
            r#"
[[focal_groups]]
label = "x"
min = 100
max = 10
"#,
        )
        .unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Validation(_))));
    }
}
