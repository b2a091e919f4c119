//! Report form state: cascading location pickers and submission shaping

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::datetime::parse_local_date;
use crate::hierarchy::LocationHierarchy;
use crate::models::ReportSubmission;

/// Location picked so far on the report form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSelection {
    pub kebun: Option<String>,
    pub afdeling: Option<String>,
    pub blok: Option<String>,
    /// Read-only on the form; filled from the hierarchy
    pub tahuntanam: Option<String>,
}

impl FormSelection {
    /// Start a form for a user, pre-selecting their own estate
    pub fn for_user(kebun: Option<&str>) -> Self {
        Self {
            kebun: kebun.filter(|k| !k.is_empty()).map(str::to_string),
            ..Default::default()
        }
    }

    /// Changing the estate clears everything below it
    pub fn select_kebun(&mut self, kebun: &str) {
        self.kebun = Some(kebun.to_string()).filter(|k| !k.is_empty());
        self.afdeling = None;
        self.blok = None;
        self.tahuntanam = None;
    }

    pub fn select_afdeling(&mut self, afdeling: &str) {
        self.afdeling = Some(afdeling.to_string()).filter(|a| !a.is_empty());
        self.blok = None;
        self.tahuntanam = None;
    }

    /// Picking a block fills in its planting year when the hierarchy has one
    pub fn select_blok(&mut self, blok: &str, hierarchy: &LocationHierarchy) {
        self.blok = Some(blok.to_string()).filter(|b| !b.is_empty());
        self.tahuntanam = match (&self.kebun, &self.afdeling, &self.blok) {
            (Some(kebun), Some(afdeling), Some(blok)) => hierarchy
                .planting_year_for(kebun, afdeling, blok)
                .map(str::to_string),
            _ => None,
        };
    }

    pub fn available_afdelings<'a>(&self, hierarchy: &'a LocationHierarchy) -> &'a [String] {
        self.kebun
            .as_deref()
            .map(|k| hierarchy.divisions_for(k))
            .unwrap_or(&[])
    }

    pub fn available_blocks<'a>(&self, hierarchy: &'a LocationHierarchy) -> &'a [String] {
        match (&self.kebun, &self.afdeling) {
            (Some(kebun), Some(afdeling)) => hierarchy.blocks_for(kebun, afdeling),
            _ => &[],
        }
    }

    pub fn is_complete(&self) -> bool {
        self.kebun.is_some()
            && self.afdeling.is_some()
            && self.blok.is_some()
            && self.tahuntanam.is_some()
    }
}

/// Join a form date and `HH:MM` time into `YYYY-MM-DDTHH:MM:00`
pub fn compose_waktu(tanggal: &str, waktu: &str) -> Result<String, &'static str> {
    if parse_local_date(tanggal).is_none() {
        return Err("Tanggal harus berformat YYYY-MM-DD");
    }
    let bytes = waktu.as_bytes();
    let shaped = bytes.len() == 5
        && bytes[2] == b':'
        && bytes[..2].iter().chain(&bytes[3..]).all(u8::is_ascii_digit);
    let in_range = shaped
        && waktu[..2].parse::<u32>().map_or(false, |h| h < 24)
        && waktu[3..].parse::<u32>().map_or(false, |m| m < 60);
    if !in_range {
        return Err("Waktu harus berformat HH:MM");
    }
    Ok(format!("{}T{}:00", tanggal, waktu))
}

/// Six decimal places, the precision of a map click
pub fn round_coordinate(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// A submission field that could not be completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct SubmissionError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Shape a validated submission for storage: planting year from the
/// hierarchy when missing, composed time, rounded coordinates.
pub fn prepare_submission(
    mut submission: ReportSubmission,
    hierarchy: &LocationHierarchy,
) -> Result<ReportSubmission, SubmissionError> {
    if submission.tahuntanam.as_deref().map_or(true, str::is_empty) {
        submission.tahuntanam = hierarchy
            .planting_year_for(&submission.kebun, &submission.afdeling, &submission.blok)
            .map(str::to_string);
    }
    if submission.tahuntanam.is_none() {
        return Err(SubmissionError {
            field: "tahuntanam",
            message: "Tahun tanam harus diisi",
        });
    }

    if !submission.waktu.contains('T') {
        submission.waktu = compose_waktu(&submission.tanggal, &submission.waktu)
            .map_err(|message| SubmissionError {
                field: "waktu",
                message,
            })?;
    }
    submission.koordinat_x = submission.koordinat_x.map(round_coordinate);
    submission.koordinat_y = submission.koordinat_y.map(round_coordinate);
    Ok(submission)
}
