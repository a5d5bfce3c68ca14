//! Resolution of images whose metadata has no focal length.
//!
//! Each such image goes through a short state machine:
//!
//! ```text
//!            ┌── in store ──────────────────────────────▶ FromCache
//! lookup ────┤
//!            └── not in store ─▶ ask focal ─┬─ empty ───▶ Skipped
//!                                           └─ number ─▶ ask sensor ─▶ persist ─▶ Fresh
//! ```
//!
//! The store is keyed by filename and flushed after every fresh answer. A
//! flush failure is logged and the answer is still returned, so the current
//! run keeps it even if the next run will have to ask again.
//!
//! With [`Interaction::Disabled`] the resolver only consults the store;
//! anything not already answered is skipped without asking.

use crate::engine::round_to_tenth;
use crate::prompt::{Console, FocalAnswer, ask_focal_length, ask_sensor_class};
use crate::store::{ElicitedEntry, ElicitedStore};
use chrono::Local;
use std::io;

/// Outcome for one image.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Answered in an earlier run.
    FromCache { equivalent_focal_length: f64 },
    /// Answered just now and written to the store.
    Fresh { entry: ElicitedEntry, persisted: bool },
    /// The user chose not to answer, or prompting is disabled.
    Skipped,
}

impl Resolution {
    pub fn equivalent_focal_length(&self) -> Option<f64> {
        match self {
            Resolution::FromCache {
                equivalent_focal_length,
            } => Some(*equivalent_focal_length),
            Resolution::Fresh { entry, .. } => Some(entry.equivalent_focal_length),
            Resolution::Skipped => None,
        }
    }
}

/// Whether the resolver may ask questions.
pub enum Interaction<'c> {
    Prompt(&'c mut dyn Console),
    Disabled,
}

pub struct MissingDataResolver<'c> {
    store: ElicitedStore,
    interaction: Interaction<'c>,
}

impl<'c> MissingDataResolver<'c> {
    pub fn new(store: ElicitedStore, interaction: Interaction<'c>) -> Self {
        Self { store, interaction }
    }

    pub fn store(&self) -> &ElicitedStore {
        &self.store
    }

    pub fn into_store(self) -> ElicitedStore {
        self.store
    }

    /// Resolve one image by filename. Errors only come from the console.
    pub fn resolve(&mut self, filename: &str) -> io::Result<Resolution> {
        if let Some(entry) = self.store.get(filename) {
            return Ok(Resolution::FromCache {
                equivalent_focal_length: entry.equivalent_focal_length,
            });
        }

        let Interaction::Prompt(console) = &mut self.interaction else {
            return Ok(Resolution::Skipped);
        };

        console.say("")?;
        console.say(&format!("{filename} has no focal length in its metadata."))?;
        console.say("Enter it manually, or press Enter to skip this image.")?;

        let raw_focal = match ask_focal_length(&mut **console)? {
            FocalAnswer::Millimetres(mm) => mm,
            FocalAnswer::Skip => return Ok(Resolution::Skipped),
        };
        let sensor = ask_sensor_class(&mut **console)?;
        let crop_factor = sensor.class.crop_factor();

        let entry = ElicitedEntry {
            raw_focal_length: raw_focal,
            crop_factor,
            equivalent_focal_length: round_to_tenth(raw_focal * crop_factor),
            sensor_choice_code: sensor.raw_choice,
            recorded_at: Some(Local::now().naive_local()),
        };

        let persisted = match self.store.record(filename.to_string(), entry.clone()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    path = %self.store.path().display(),
                    error = %e,
                    "failed to save elicited data, the answer is kept for this run only"
                );
                false
            }
        };

        Ok(Resolution::Fresh { entry, persisted })
    }
}
