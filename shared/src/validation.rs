//! Validation utilities for field report submissions

use std::borrow::Cow;

use rust_decimal::Decimal;
use validator::{ValidationError, ValidationErrors};

use crate::datetime::parse_local_date;
use crate::models::{ReportPatch, ReportSubmission, WeatherCondition, NOMOR_PP_RANGE};

// ============================================================================
// Field Rules
// ============================================================================

/// Validate a longitude / latitude pair. Both or neither must be present.
pub fn validate_coordinates(x: Option<f64>, y: Option<f64>) -> Result<(), &'static str> {
    match (x, y) {
        (None, None) => Ok(()),
        (Some(_), None) | (None, Some(_)) => {
            Err("Koordinat X dan Y harus diisi bersamaan")
        }
        (Some(lng), Some(lat)) => {
            if !(-180.0..=180.0).contains(&lng) {
                return Err("Koordinat X (longitude) harus antara -180 dan 180");
            }
            if !(-90.0..=90.0).contains(&lat) {
                return Err("Koordinat Y (latitude) harus antara -90 dan 90");
            }
            Ok(())
        }
    }
}

/// Validate the report series number
pub fn validate_nomor_pp(nomor_pp: i64) -> Result<(), &'static str> {
    if NOMOR_PP_RANGE.contains(&nomor_pp) {
        Ok(())
    } else {
        Err("Nomor PP harus antara 1 dan 35")
    }
}

/// Validate a planting year (four digits)
pub fn validate_tahuntanam(tahun: &str) -> Result<(), &'static str> {
    let tahun = tahun.trim();
    if tahun.is_empty() {
        return Err("Tahun tanam harus diisi");
    }
    if tahun.len() != 4 || !tahun.chars().all(|c| c.is_ascii_digit()) {
        return Err("Tahun tanam harus berupa 4 digit tahun");
    }
    Ok(())
}

/// Validate the RBT metric is not negative
pub fn validate_rbt(rbt: Decimal) -> Result<(), &'static str> {
    if rbt < Decimal::ZERO {
        return Err("RBT tidak boleh negatif");
    }
    Ok(())
}

/// Validate a report date from the form (`YYYY-MM-DD`)
pub fn validate_tanggal(tanggal: &str) -> Result<(), &'static str> {
    parse_local_date(tanggal)
        .map(|_| ())
        .ok_or("Tanggal harus berformat YYYY-MM-DD")
}

// ============================================================================
// Derive Hooks
// ============================================================================

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Longest location names the reports table stores
pub const KEBUN_MAX_LEN: usize = 16;
pub const AFDELING_MAX_LEN: usize = 32;
pub const BLOK_MAX_LEN: usize = 32;

/// Location names must fit their columns
pub fn validate_location_lengths(
    kebun: Option<&str>,
    afdeling: Option<&str>,
    blok: Option<&str>,
) -> Result<(), ValidationError> {
    let too_long = |value: Option<&str>, max: usize| value.map_or(false, |v| v.chars().count() > max);
    if too_long(kebun, KEBUN_MAX_LEN) {
        return Err(rule_error("kebun", "Kebun maksimal 16 karakter"));
    }
    if too_long(afdeling, AFDELING_MAX_LEN) {
        return Err(rule_error("afdeling", "Afdeling maksimal 32 karakter"));
    }
    if too_long(blok, BLOK_MAX_LEN) {
        return Err(rule_error("blok", "Blok maksimal 32 karakter"));
    }
    Ok(())
}

/// Weather must be one of the form choices
pub fn validate_weather_choice(value: &str) -> Result<(), ValidationError> {
    if WeatherCondition::from(value).is_standard() {
        Ok(())
    } else {
        Err(rule_error("kondisi_cuaca", "Kondisi cuaca tidak dikenal"))
    }
}

/// Cross-field rules for a new report
pub fn validate_submission_rules(input: &ReportSubmission) -> Result<(), ValidationError> {
    validate_location_lengths(Some(&input.kebun), Some(&input.afdeling), Some(&input.blok))?;
    validate_coordinates(input.koordinat_x, input.koordinat_y)
        .map_err(|m| rule_error("koordinat", m))?;
    validate_tanggal(&input.tanggal).map_err(|m| rule_error("tanggal", m))?;
    if let Some(tahun) = input.tahuntanam.as_deref() {
        validate_tahuntanam(tahun).map_err(|m| rule_error("tahuntanam", m))?;
    }
    if let Some(rbt) = input.rbt {
        validate_rbt(rbt).map_err(|m| rule_error("rbt", m))?;
    }
    Ok(())
}

/// Cross-field rules for an administrator's edit
pub fn validate_patch_rules(input: &ReportPatch) -> Result<(), ValidationError> {
    validate_location_lengths(
        input.kebun.as_deref(),
        input.afdeling.as_deref(),
        input.blok.as_deref(),
    )?;
    validate_coordinates(input.koordinat_x, input.koordinat_y)
        .map_err(|m| rule_error("koordinat", m))?;
    if let Some(tanggal) = input.tanggal.as_deref() {
        validate_tanggal(tanggal).map_err(|m| rule_error("tanggal", m))?;
    }
    if let Some(tahun) = input.tahuntanam.as_deref() {
        validate_tahuntanam(tahun).map_err(|m| rule_error("tahuntanam", m))?;
    }
    if let Some(rbt) = input.rbt {
        validate_rbt(rbt).map_err(|m| rule_error("rbt", m))?;
    }
    Ok(())
}

/// `estimasi_serangga` → `estimasiSerangga`, matching the JSON field names
pub fn wire_field_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// First human-readable message in a set of validation errors, with its
/// JSON field name. Cross-field rule errors are reported under their rule code.
pub fn first_validation_message(errors: &ValidationErrors) -> Option<(String, String)> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));
    fields.into_iter().find_map(|(field, errs)| {
        errs.first().map(|e| {
            let message = e
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| e.code.to_string());
            let field = if field == "__all__" { e.code.as_ref() } else { field };
            (wire_field_name(field), message)
        })
    })
}
