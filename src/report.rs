//! Report files for one analysis run.
//!
//! Every run writes into its own directory, named after the local time the
//! run started:
//!
//! ```text
//! outputs/
//! └── 20261016140311/
//!     ├── focal_length_details.csv    # One row per classified image
//!     ├── focal_length_analysis.json  # The aggregated AnalysisResult
//!     └── focal_length_chart.txt      # Bar chart of both distributions
//! ```
//!
//! The directory is a [`RunLayout`] value built by the caller and passed in,
//! so tests write into a temp dir and two runs in one process never share
//! hidden state.
//!
//! ## CSV
//!
//! UTF-8 with a byte-order mark so spreadsheet apps detect the encoding of
//! the CJK group labels. Fields are quoted per RFC 4180 only when needed.
//! Manual entries have an empty raw focal length and `manual entry` in the
//! camera column.

use crate::analyze::RunTally;
use crate::output::format_chart;
use crate::stats::AnalysisResult;
use crate::types::ImageRecord;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DETAILS_CSV: &str = "focal_length_details.csv";
pub const ANALYSIS_JSON: &str = "focal_length_analysis.json";
pub const CHART_TXT: &str = "focal_length_chart.txt";

const UTF8_BOM: &str = "\u{feff}";
const MANUAL_CAMERA: &str = "manual entry";
const CSV_HEADER: [&str; 5] = [
    "filename",
    "original_focal",
    "camera_model",
    "equivalent_focal",
    "focal_group",
];

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where one run's report files go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    dir: PathBuf,
}

impl RunLayout {
    /// `<output_root>/<YYYYmmddHHMMSS>` for a run started at `started`.
    pub fn timestamped(output_root: &Path, started: NaiveDateTime) -> Self {
        Self {
            dir: output_root.join(started.format("%Y%m%d%H%M%S").to_string()),
        }
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn details_csv(&self) -> PathBuf {
        self.dir.join(DETAILS_CSV)
    }

    pub fn analysis_json(&self) -> PathBuf {
        self.dir.join(ANALYSIS_JSON)
    }

    pub fn chart_txt(&self) -> PathBuf {
        self.dir.join(CHART_TXT)
    }

    pub fn create(&self) -> Result<(), ReportError> {
        fs::create_dir_all(&self.dir).map_err(|source| ReportError::Io {
            path: self.dir.clone(),
            source,
        })
    }
}

/// Paths of the files a report wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFiles {
    pub dir: PathBuf,
    pub details_csv: PathBuf,
    pub analysis_json: PathBuf,
    pub chart_txt: PathBuf,
}

#[derive(Serialize)]
struct AnalysisDocument<'a> {
    generated_at: NaiveDateTime,
    source_folder: &'a Path,
    tally: &'a RunTally,
    analysis: &'a AnalysisResult,
}

/// Everything a report is built from.
pub struct ReportInput<'a> {
    pub source_folder: &'a Path,
    pub generated_at: NaiveDateTime,
    pub records: &'a [ImageRecord],
    pub tally: &'a RunTally,
    pub result: &'a AnalysisResult,
}

/// Create the run directory and write all three files.
pub fn write_report(layout: &RunLayout, input: &ReportInput) -> Result<ReportFiles, ReportError> {
    layout.create()?;

    let details_csv = layout.details_csv();
    write_file(&details_csv, &render_details_csv(input.records))?;

    let analysis_json = layout.analysis_json();
    let doc = AnalysisDocument {
        generated_at: input.generated_at,
        source_folder: input.source_folder,
        tally: input.tally,
        analysis: input.result,
    };
    write_file(&analysis_json, &serde_json::to_string_pretty(&doc)?)?;

    let chart_txt = layout.chart_txt();
    let mut chart = format_chart(input.result).join("\n");
    chart.push('\n');
    write_file(&chart_txt, &chart)?;

    tracing::info!(dir = %layout.dir().display(), "report written");
    Ok(ReportFiles {
        dir: layout.dir().to_path_buf(),
        details_csv,
        analysis_json,
        chart_txt,
    })
}

fn write_file(path: &Path, content: &str) -> Result<(), ReportError> {
    fs::write(path, content).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// The details CSV, BOM included, with CRLF row endings.
pub fn render_details_csv(records: &[ImageRecord]) -> String {
    let mut out = String::from(UTF8_BOM);
    push_row(&mut out, CSV_HEADER.iter().map(|h| h.to_string()));
    for r in records {
        let camera = if r.source.is_manual() {
            MANUAL_CAMERA.to_string()
        } else {
            r.camera_model.clone().unwrap_or_default()
        };
        push_row(
            &mut out,
            [
                r.identifier.clone(),
                r.raw_focal_length.map(|f| f.to_string()).unwrap_or_default(),
                camera,
                r.equivalent_focal_length
                    .map(|f| format!("{f:.1}"))
                    .unwrap_or_default(),
                r.group_label.clone(),
            ],
        );
    }
    out
}

fn push_row(out: &mut String, fields: impl IntoIterator<Item = String>) {
    let row: Vec<String> = fields.into_iter().map(|f| csv_field(&f)).collect();
    out.push_str(&row.join(","));
    out.push_str("\r\n");
}

/// Quote a field when it contains a delimiter, quote, or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::FocalGroupTable;
    use crate::stats::aggregate;
    use crate::test_helpers::{engine_with_factors, fixed_timestamp};
    use crate::types::RecordSource;
    use tempfile::TempDir;

    fn sample_records() -> Vec<ImageRecord> {
        let engine = engine_with_factors(&[("ilce-6400", 1.5)]);
        vec![
            engine.record_from_exif("trip/DSC00042.JPG".into(), 56.0, Some("ILCE-6400".into())),
            engine.record_from_exif("b.jpg".into(), 24.0, None),
            engine.record_from_manual("scan.tif".into(), 52.5, RecordSource::ElicitedFresh),
        ]
    }

    #[test]
    fn timestamped_layout_names_dir_after_start_time() {
        let layout = RunLayout::timestamped(Path::new("outputs"), fixed_timestamp());
        assert_eq!(layout.dir(), Path::new("outputs/20261016140311"));
        assert_eq!(
            layout.details_csv(),
            Path::new("outputs/20261016140311/focal_length_details.csv")
        );
    }

    #[test]
    fn csv_has_bom_header_and_rows() {
        let csv = render_details_csv(&sample_records());
        assert!(csv.starts_with('\u{feff}'));
        let lines: Vec<&str> = csv.trim_start_matches('\u{feff}').split("\r\n").collect();
        assert_eq!(
            lines[0],
            "filename,original_focal,camera_model,equivalent_focal,focal_group"
        );
        assert_eq!(lines[1], "trip/DSC00042.JPG,56,ILCE-6400,84.0,人像(85mm)");
        assert_eq!(lines[2], "b.jpg,24,,24.0,广角(24-28mm)");
        assert_eq!(lines[3], "scan.tif,,manual entry,52.5,标准(50mm)");
        assert_eq!(lines[4], "");
    }

    #[test]
    fn csv_quotes_fields_that_need_it() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b.jpg"), "\"a,b.jpg\"");
        assert_eq!(csv_field("say \"cheese\".jpg"), "\"say \"\"cheese\"\".jpg\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn write_report_creates_all_files() {
        let tmp = TempDir::new().unwrap();
        let records = sample_records();
        let result = aggregate(&records, &FocalGroupTable::default()).unwrap();
        let tally = RunTally {
            scanned: 3,
            from_exif: 2,
            fresh: 1,
            missing: 1,
            ..RunTally::default()
        };
        let layout = RunLayout::timestamped(&tmp.path().join("outputs"), fixed_timestamp());

        let files = write_report(
            &layout,
            &ReportInput {
                source_folder: Path::new("/photos"),
                generated_at: fixed_timestamp(),
                records: &records,
                tally: &tally,
                result: &result,
            },
        )
        .unwrap();

        assert_eq!(files.dir, tmp.path().join("outputs").join("20261016140311"));
        let csv = fs::read_to_string(&files.details_csv).unwrap();
        assert!(csv.contains("scan.tif,,manual entry,52.5,标准(50mm)"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&files.analysis_json).unwrap()).unwrap();
        assert_eq!(json["analysis"]["total"], 3);
        // Three-way tie goes to the first group in table order
        assert_eq!(json["analysis"]["most_used_group"], "广角(24-28mm)");
        assert_eq!(json["tally"]["fresh"], 1);
        assert_eq!(json["generated_at"], "2026-10-16T14:03:11");

        let chart = fs::read_to_string(&files.chart_txt).unwrap();
        assert!(chart.starts_with("Images per focal group\n"));
        assert!(chart.ends_with('\n'));
    }

    #[test]
    fn unwritable_dir_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("outputs");
        fs::write(&blocker, "not a dir").unwrap();
        let layout = RunLayout::at(blocker.join("run"));
        assert!(matches!(layout.create(), Err(ReportError::Io { .. })));
    }
}
