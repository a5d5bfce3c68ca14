//! CLI output formatting for analysis runs.
//!
//! # Information-First Display
//!
//! Every image is shown by its identity (path relative to the input folder,
//! or bare filename for manual entries) followed by the focal group it landed
//! in. Numbers that explain the classification are indented context lines:
//!
//! ```text
//! trip/DSC00042.JPG → 人像(85mm)
//!     Focal length: 56mm (84.0mm equivalent)
//!     Camera: ILCE-6400
//! ```
//!
//! # Output Format
//!
//! ## Statistics
//!
//! ```text
//! Focal length statistics
//! ==================================================
//! Images:         3
//! Focal groups:   2
//! Focal lengths:  2
//!
//! By group
//! ------------------------------
//! 广角(24-28mm)           2  ( 66.7%)
//! 标准(50mm)              1  ( 33.3%)
//!
//! By focal length
//! ------------------------------
//!  24.0mm     2  ( 66.7%)
//!  50.0mm     1  ( 33.3%)
//!
//! Upgrade suggestion
//! • Most used focal group: 广角(24-28mm)
//! • Most used focal length: 24.0mm
//! • Consider upgrading lenses in the 广角(24-28mm) range first
//! ```
//!
//! ## Chart
//!
//! ```text
//! Images per focal group
//! 广角(24-28mm) ████████████████████████████████████████ 2
//! 标准(50mm)    ████████████████████ 1
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::analyze::{AnalyzeEvent, CheckReport, RunTally};
use crate::report::ReportFiles;
use crate::resolver::Resolution;
use crate::stats::AnalysisResult;
use crate::store::ElicitedStore;
use std::path::Path;

/// Widest bar in the chart, in cells.
const CHART_WIDTH: usize = 40;

/// Column the statistics counts are aligned after.
const LABEL_COLUMN: usize = 20;

// ============================================================================
// Shared helpers
// ============================================================================

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Terminal cell width: CJK ideographs and fullwidth forms take two cells.
fn display_width(text: &str) -> usize {
    text.chars()
        .map(|c| match c as u32 {
            0x1100..=0x115F | 0x2E80..=0xA4CF | 0xAC00..=0xD7A3 | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F | 0xFF00..=0xFF60 | 0xFFE0..=0xFFE6 => 2,
            _ => 1,
        })
        .sum()
}

/// Left-align `text` in a column of `width` terminal cells.
fn pad_right(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(display_width(text));
    format!("{text}{}", " ".repeat(pad))
}

fn format_mm(mm: f64) -> String {
    format!("{mm:.1}mm")
}

/// Bar length for `count`, scaled so `max` fills the chart. Non-zero counts
/// always get at least one cell.
fn bar_len(count: usize, max: usize) -> usize {
    if max == 0 {
        return 0;
    }
    (count * CHART_WIDTH).div_ceil(max)
}

fn rule(c: char, len: usize) -> String {
    c.to_string().repeat(len)
}

// ============================================================================
// Analyze progress
// ============================================================================

/// Format a single analysis progress event as display lines.
pub fn format_analyze_event(event: &AnalyzeEvent) -> Vec<String> {
    match event {
        AnalyzeEvent::Scanned { count } => vec![format!("Found {count} images")],
        AnalyzeEvent::Classified { record } => {
            let mut lines = vec![format!("{} → {}", record.identifier, record.group_label)];
            if let (Some(raw), Some(eq)) = (record.raw_focal_length, record.equivalent_focal_length) {
                lines.push(format!(
                    "{}Focal length: {raw}mm ({} equivalent)",
                    indent(1),
                    format_mm(eq)
                ));
            }
            if let Some(model) = &record.camera_model {
                lines.push(format!("{}Camera: {model}", indent(1)));
            }
            lines
        }
        AnalyzeEvent::Unreadable { candidate, error } => vec![
            format!("{} → no metadata", candidate.relative),
            format!("{}Unreadable: {error}", indent(1)),
        ],
        AnalyzeEvent::NoFocalLength { candidate } => {
            vec![format!("{} → no focal length", candidate.relative)]
        }
        AnalyzeEvent::ResolvingMissing { count } => {
            vec![String::new(), format!("{count} images have no focal length")]
        }
        AnalyzeEvent::Resolved {
            filename,
            resolution,
        } => match resolution {
            Resolution::FromCache {
                equivalent_focal_length,
            } => vec![format!(
                "{filename}: {} (entered previously)",
                format_mm(*equivalent_focal_length)
            )],
            Resolution::Fresh { entry, persisted } => {
                let mut lines = vec![format!(
                    "{filename}: {} ({}mm × {})",
                    format_mm(entry.equivalent_focal_length),
                    entry.raw_focal_length,
                    entry.crop_factor
                )];
                if !persisted {
                    lines.push(format!("{}Not saved; will ask again next run", indent(1)));
                }
                lines
            }
            Resolution::Skipped => vec![format!("{filename}: skipped")],
        },
    }
}

pub fn print_analyze_event(event: &AnalyzeEvent) {
    for line in format_analyze_event(event) {
        println!("{}", line);
    }
}

/// One-paragraph account of where every scanned image went.
pub fn format_run_summary(tally: &RunTally) -> Vec<String> {
    let mut lines = vec![format!(
        "Recorded {} of {} images: {} from metadata, {} entered previously, {} entered now, {} skipped",
        tally.recorded(),
        tally.scanned,
        tally.from_exif,
        tally.from_cache,
        tally.fresh,
        tally.skipped
    )];
    if tally.unreadable > 0 {
        lines.push(format!("{}{} files could not be read", indent(1), tally.unreadable));
    }
    if tally.unsaved > 0 {
        lines.push(format!(
            "{}{} answers could not be saved",
            indent(1),
            tally.unsaved
        ));
    }
    lines
}

pub fn print_run_summary(tally: &RunTally) {
    for line in format_run_summary(tally) {
        println!("{}", line);
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Format the statistics summary, ending with the upgrade suggestion.
pub fn format_statistics(result: &AnalysisResult) -> Vec<String> {
    let mut lines = vec![
        "Focal length statistics".to_string(),
        rule('=', 50),
        format!("{}{}", pad_right("Images:", 16), result.total),
        format!("{}{}", pad_right("Focal groups:", 16), result.groups.len()),
        format!("{}{}", pad_right("Focal lengths:", 16), result.focal_lengths.len()),
        String::new(),
        "By group".to_string(),
        rule('-', 30),
    ];
    for g in &result.groups {
        lines.push(format!(
            "{} {:>4}  ({:>5.1}%)",
            pad_right(&g.label, LABEL_COLUMN),
            g.count,
            g.percentage
        ));
    }

    lines.push(String::new());
    lines.push("By focal length".to_string());
    lines.push(rule('-', 30));
    for f in &result.focal_lengths {
        lines.push(format!(
            "{:>7} {:>5}  ({:>5.1}%)",
            format_mm(f.focal_length),
            f.count,
            f.percentage
        ));
    }

    lines.push(String::new());
    lines.push("Upgrade suggestion".to_string());
    lines.push(format!("• Most used focal group: {}", result.most_used_group));
    if let Some(focal) = result.most_used_focal_length {
        lines.push(format!("• Most used focal length: {}", format_mm(focal)));
    }
    lines.push(format!(
        "• Consider upgrading lenses in the {} range first",
        result.most_used_group
    ));
    lines
}

pub fn print_statistics(result: &AnalysisResult) {
    for line in format_statistics(result) {
        println!("{}", line);
    }
}

/// Horizontal bar chart of both distributions.
pub fn format_chart(result: &AnalysisResult) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Images per focal group".to_string());
    let width = result
        .groups
        .iter()
        .map(|g| display_width(&g.label))
        .max()
        .unwrap_or(0);
    let max = result.groups.iter().map(|g| g.count).max().unwrap_or(0);
    for g in &result.groups {
        lines.push(format!(
            "{} {} {}",
            pad_right(&g.label, width),
            rule('█', bar_len(g.count, max)),
            g.count
        ));
    }

    if !result.focal_lengths.is_empty() {
        lines.push(String::new());
        lines.push("Images per focal length".to_string());
        let labels: Vec<String> = result
            .focal_lengths
            .iter()
            .map(|f| format_mm(f.focal_length))
            .collect();
        let width = labels.iter().map(|l| l.len()).max().unwrap_or(0);
        let max = result.focal_lengths.iter().map(|f| f.count).max().unwrap_or(0);
        for (label, f) in labels.iter().zip(&result.focal_lengths) {
            lines.push(format!(
                "{label:>width$} {} {}",
                rule('█', bar_len(f.count, max)),
                f.count
            ));
        }
    }
    lines
}

pub fn print_chart(result: &AnalysisResult) {
    for line in format_chart(result) {
        println!("{}", line);
    }
}

/// Where the report files went.
pub fn format_report_files(files: &ReportFiles) -> Vec<String> {
    vec![
        format!("Report written to {}", files.dir.display()),
        format!("{}Details: {}", indent(1), file_name(&files.details_csv)),
        format!("{}Analysis: {}", indent(1), file_name(&files.analysis_json)),
        format!("{}Chart: {}", indent(1), file_name(&files.chart_txt)),
    ]
}

pub fn print_report_files(files: &ReportFiles) {
    for line in format_report_files(files) {
        println!("{}", line);
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Check and elicited listings
// ============================================================================

pub fn format_check_report(report: &CheckReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Scanned {} images: {} with focal length metadata",
        report.scanned, report.with_metadata
    )];
    if !report.cached.is_empty() {
        lines.push(format!("Answered previously ({})", report.cached.len()));
        for c in &report.cached {
            lines.push(format!("{}{}", indent(1), c.relative));
        }
    }
    if report.to_prompt.is_empty() {
        lines.push("Nothing to ask about".to_string());
    } else {
        lines.push(format!("Would ask about ({})", report.to_prompt.len()));
        for c in &report.to_prompt {
            lines.push(format!("{}{}", indent(1), c.relative));
        }
    }
    lines
}

pub fn print_check_report(report: &CheckReport) {
    for line in format_check_report(report) {
        println!("{}", line);
    }
}

/// List stored manual entries, one header per filename.
pub fn format_elicited(store: &ElicitedStore) -> Vec<String> {
    if store.is_empty() {
        return vec![format!("No manual entries in {}", store.path().display())];
    }
    let mut lines = vec![format!(
        "Manual entries ({}) in {}",
        store.len(),
        store.path().display()
    )];
    for (filename, entry) in store.iter() {
        lines.push(filename.to_string());
        lines.push(format!(
            "{}{}mm × {} = {} (sensor choice {:?})",
            indent(1),
            entry.raw_focal_length,
            entry.crop_factor,
            format_mm(entry.equivalent_focal_length),
            entry.sensor_choice_code
        ));
        let recorded = entry
            .recorded_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        lines.push(format!("{}Recorded: {recorded}", indent(1)));
    }
    lines
}

pub fn print_elicited(store: &ElicitedStore) {
    for line in format_elicited(store) {
        println!("{}", line);
    }
}
