//! The analysis run: discovery, classification, and missing-data resolution.
//!
//! Runs in two passes over the scanned images:
//!
//! ```text
//! scan ──▶ pass 1: read metadata ──┬── focal length ──▶ engine ──▶ ImageRecord
//!                                  └── none / unreadable ──▶ missing list
//!          pass 2: missing list ──▶ resolver ──┬── cached / fresh ──▶ ImageRecord
//!                                              └── skipped ──▶ dropped
//! ```
//!
//! Every question is asked after all metadata has been read, so the user
//! sees the progress listing first and then answers in one block.
//!
//! Records from pass 1 are identified by their path relative to the input
//! folder; records from pass 2 by the bare filename, which is also the
//! elicited-data store key.
//!
//! Progress is reported through an [`AnalyzeEvent`] callback rather than
//! printed here, so the CLI decides what to show and tests can record it.

use crate::engine::FocalEngine;
use crate::exif::{MetadataError, MetadataReader};
use crate::resolver::{MissingDataResolver, Resolution};
use crate::scan::{Candidate, ScanError, scan};
use crate::store::ElicitedStore;
use crate::types::{ImageRecord, RecordSource};
use serde::Serialize;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("Console error: {0}")]
    Console(#[from] io::Error),
}

/// Progress notification, emitted in run order.
#[derive(Debug)]
pub enum AnalyzeEvent<'a> {
    Scanned {
        count: usize,
    },
    Classified {
        record: &'a ImageRecord,
    },
    /// The file could not be read; it joins the missing list.
    Unreadable {
        candidate: &'a Candidate,
        error: &'a MetadataError,
    },
    NoFocalLength {
        candidate: &'a Candidate,
    },
    /// Pass 2 is about to start.
    ResolvingMissing {
        count: usize,
    },
    Resolved {
        filename: &'a str,
        resolution: &'a Resolution,
    },
}

/// How each scanned image was accounted for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunTally {
    pub scanned: usize,
    pub from_exif: usize,
    /// Missing a focal length; includes `unreadable`.
    pub missing: usize,
    pub unreadable: usize,
    pub from_cache: usize,
    pub fresh: usize,
    /// Fresh answers the store failed to save.
    pub unsaved: usize,
    pub skipped: usize,
}

impl RunTally {
    pub fn recorded(&self) -> usize {
        self.from_exif + self.from_cache + self.fresh
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub records: Vec<ImageRecord>,
    pub tally: RunTally,
}

/// Output of pass 1.
#[derive(Debug, Clone, Default)]
pub struct MetadataPass {
    pub records: Vec<ImageRecord>,
    /// Images without a focal length, in scan order.
    pub missing: Vec<Candidate>,
    pub unreadable: usize,
}

/// Pass 1: read metadata for every candidate and classify those that have a
/// focal length.
pub fn read_metadata_pass(
    candidates: &[Candidate],
    engine: &FocalEngine,
    reader: &dyn MetadataReader,
    on_event: &mut dyn FnMut(AnalyzeEvent),
) -> MetadataPass {
    let mut pass = MetadataPass::default();
    for candidate in candidates {
        let meta = match reader.read_metadata(&candidate.path) {
            Ok(meta) => meta,
            Err(error) => {
                tracing::debug!(path = %candidate.path.display(), error = %error, "metadata unreadable");
                on_event(AnalyzeEvent::Unreadable {
                    candidate,
                    error: &error,
                });
                pass.unreadable += 1;
                pass.missing.push(candidate.clone());
                continue;
            }
        };
        match meta.focal_length {
            Some(raw_focal) => {
                let record =
                    engine.record_from_exif(candidate.relative.clone(), raw_focal, meta.camera_model);
                on_event(AnalyzeEvent::Classified { record: &record });
                pass.records.push(record);
            }
            None => {
                on_event(AnalyzeEvent::NoFocalLength { candidate });
                pass.missing.push(candidate.clone());
            }
        }
    }
    pass
}

/// Scan `root` and classify every image, asking the resolver about those
/// without a focal length.
///
/// Console failures abort the run; everything else is recorded in the
/// [`RunTally`].
pub fn analyze_folder(
    root: &Path,
    extensions: &[String],
    engine: &FocalEngine,
    reader: &dyn MetadataReader,
    resolver: &mut MissingDataResolver,
    on_event: &mut dyn FnMut(AnalyzeEvent),
) -> Result<AnalysisRun, AnalyzeError> {
    let candidates = scan(root, extensions)?;
    on_event(AnalyzeEvent::Scanned {
        count: candidates.len(),
    });

    let pass = read_metadata_pass(&candidates, engine, reader, on_event);
    let mut tally = RunTally {
        scanned: candidates.len(),
        from_exif: pass.records.len(),
        missing: pass.missing.len(),
        unreadable: pass.unreadable,
        ..RunTally::default()
    };
    let mut records = pass.records;

    if !pass.missing.is_empty() {
        on_event(AnalyzeEvent::ResolvingMissing {
            count: pass.missing.len(),
        });
    }
    for candidate in &pass.missing {
        let resolution = resolver.resolve(&candidate.filename)?;
        on_event(AnalyzeEvent::Resolved {
            filename: &candidate.filename,
            resolution: &resolution,
        });
        let source = match &resolution {
            Resolution::FromCache { .. } => {
                tally.from_cache += 1;
                RecordSource::ElicitedCached
            }
            Resolution::Fresh { persisted, .. } => {
                tally.fresh += 1;
                if !persisted {
                    tally.unsaved += 1;
                }
                RecordSource::ElicitedFresh
            }
            Resolution::Skipped => {
                tally.skipped += 1;
                continue;
            }
        };
        if let Some(equivalent) = resolution.equivalent_focal_length() {
            records.push(engine.record_from_manual(candidate.filename.clone(), equivalent, source));
        }
    }

    Ok(AnalysisRun { records, tally })
}

/// What a dry run found: images that would be asked about, split by whether
/// the store already has an answer.
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub scanned: usize,
    pub with_metadata: usize,
    pub cached: Vec<Candidate>,
    pub to_prompt: Vec<Candidate>,
}

/// Scan and read metadata without prompting or writing anything.
pub fn check_folder(
    root: &Path,
    extensions: &[String],
    engine: &FocalEngine,
    reader: &dyn MetadataReader,
    store: &ElicitedStore,
) -> Result<CheckReport, ScanError> {
    let candidates = scan(root, extensions)?;
    let pass = read_metadata_pass(&candidates, engine, reader, &mut |_| {});
    let (cached, to_prompt): (Vec<Candidate>, Vec<Candidate>) = pass
        .missing
        .into_iter()
        .partition(|c| store.contains(&c.filename));
    Ok(CheckReport {
        scanned: candidates.len(),
        with_metadata: pass.records.len(),
        cached,
        to_prompt,
    })
}
