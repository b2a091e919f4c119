//! WebAssembly module for Hatch & Carry field reporting
//!
//! Provides client-side computation for:
//! - The kebun → afdeling → blok cascade of the report form
//! - Indonesian date and time display
//! - Report list filtering, map grouping and bounds
//! - Offline submission validation
//!
//! Values cross the boundary as JSON strings; errors come back as strings.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::{DateInput, DisplayZone, FilterQuery, FilterSpec, LocationHierarchy, ReportRecord};
use validator::Validate;
use wasm_bindgen::prelude::*;

fn parse<T: DeserializeOwned>(what: &str, json: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn render<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Cannot encode result: {}", e))
}

fn zone(utc_offset_hours: i32) -> Result<DisplayZone, String> {
    DisplayZone::from_offset_hours(utc_offset_hours)
        .ok_or_else(|| format!("Unsupported UTC offset: {}", utc_offset_hours))
}

fn to_js<T>(result: Result<T, String>) -> Result<T, JsValue> {
    result.map_err(|e| JsValue::from_str(&e))
}

fn warn(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&JsValue::from_str(message));
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

// ============================================================================
// Location hierarchy
// ============================================================================

/// Location index held on the JavaScript side for the report form
#[wasm_bindgen]
pub struct HierarchyHandle {
    inner: LocationHierarchy,
    skipped: usize,
}

impl HierarchyHandle {
    fn from_json(sources_json: &str) -> Result<Self, String> {
        let sources: Vec<Vec<Value>> = parse("reference sources", sources_json)?;
        let (inner, skips) = LocationHierarchy::build_with_report(&sources);
        for skip in &skips {
            warn(&format!(
                "Skipped reference entry {} of source {}: {}",
                skip.entry, skip.source, skip.reason
            ));
        }
        Ok(Self {
            inner,
            skipped: skips.len(),
        })
    }
}

#[wasm_bindgen]
impl HierarchyHandle {
    /// Build from a JSON array of sources, each an array of estate entries
    #[wasm_bindgen(constructor)]
    pub fn new(sources_json: &str) -> Result<HierarchyHandle, JsValue> {
        to_js(Self::from_json(sources_json))
    }

    pub fn estates(&self) -> Vec<String> {
        self.inner.estates().to_vec()
    }

    #[wasm_bindgen(js_name = divisionsFor)]
    pub fn divisions_for(&self, kebun: &str) -> Vec<String> {
        self.inner.divisions_for(kebun).to_vec()
    }

    #[wasm_bindgen(js_name = blocksFor)]
    pub fn blocks_for(&self, kebun: &str, afdeling: &str) -> Vec<String> {
        self.inner.blocks_for(kebun, afdeling).to_vec()
    }

    #[wasm_bindgen(js_name = plantingYearFor)]
    pub fn planting_year_for(&self, kebun: &str, afdeling: &str, blok: &str) -> Option<String> {
        self.inner
            .planting_year_for(kebun, afdeling, blok)
            .map(str::to_string)
    }

    /// Entries, divisions and blocks left out while building
    #[wasm_bindgen(getter)]
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

// ============================================================================
// Dates
// ============================================================================

fn date_display(value_json: &str, utc_offset_hours: i32) -> Result<String, String> {
    let value: Value = parse("date", value_json)?;
    Ok(shared::format_date_display(
        &DateInput::classify(&value),
        &zone(utc_offset_hours)?,
    ))
}

fn time_display(value_json: &str, utc_offset_hours: i32) -> Result<String, String> {
    let value: Value = parse("time", value_json)?;
    Ok(shared::format_time_display(
        &DateInput::classify(&value),
        &zone(utc_offset_hours)?,
    ))
}

/// `15 Mei 2023`, or the Indonesian message for a missing or bad value
#[wasm_bindgen(js_name = formatDateDisplay)]
pub fn format_date_display(value_json: &str, utc_offset_hours: i32) -> Result<String, JsValue> {
    to_js(date_display(value_json, utc_offset_hours))
}

/// `08:30`, or the Indonesian message for a missing or bad value
#[wasm_bindgen(js_name = formatTimeDisplay)]
pub fn format_time_display(value_json: &str, utc_offset_hours: i32) -> Result<String, JsValue> {
    to_js(time_display(value_json, utc_offset_hours))
}

// ============================================================================
// Report lists
// ============================================================================

fn filter(reports_json: &str, filter_json: &str, utc_offset_hours: i32) -> Result<String, String> {
    let reports: Vec<ReportRecord> = parse("reports", reports_json)?;
    let query: FilterQuery = parse("filter", filter_json)?;
    let filtered = shared::apply_filter(
        &reports,
        &FilterSpec::from(query),
        &zone(utc_offset_hours)?,
    );
    render(&filtered)
}

fn with_reports<T: Serialize>(
    reports_json: &str,
    f: impl FnOnce(&[ReportRecord]) -> T,
) -> Result<String, String> {
    let reports: Vec<ReportRecord> = parse("reports", reports_json)?;
    render(&f(&reports))
}

/// Reports matching the list page's filter form, in input order
#[wasm_bindgen(js_name = filterReports)]
pub fn filter_reports(
    reports_json: &str,
    filter_json: &str,
    utc_offset_hours: i32,
) -> Result<String, JsValue> {
    to_js(filter(reports_json, filter_json, utc_offset_hours))
}

/// kebun → afdeling → blok → reports, positioned reports only
#[wasm_bindgen(js_name = groupReports)]
pub fn group_reports(reports_json: &str) -> Result<String, JsValue> {
    to_js(with_reports(reports_json, shared::group_by_location))
}

#[wasm_bindgen(js_name = reportFilterOptions)]
pub fn report_filter_options(reports_json: &str) -> Result<String, JsValue> {
    to_js(with_reports(reports_json, shared::filter_options))
}

/// Bounds to fit the map to, `null` when nothing has a position
#[wasm_bindgen(js_name = reportMapBounds)]
pub fn report_map_bounds(reports_json: &str) -> Result<String, JsValue> {
    to_js(with_reports(reports_json, shared::map_bounds))
}

#[wasm_bindgen(js_name = reportSummary)]
pub fn report_summary(reports_json: &str) -> Result<String, JsValue> {
    to_js(with_reports(reports_json, shared::summarize))
}

// ============================================================================
// Report form
// ============================================================================

#[derive(Serialize)]
struct SubmissionCheck {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

fn check_submission(submission_json: &str) -> Result<String, String> {
    let submission: shared::ReportSubmission = parse("submission", submission_json)?;
    let check = match submission.validate() {
        Ok(()) => SubmissionCheck {
            valid: true,
            field: None,
            message: None,
        },
        Err(errors) => {
            let (field, message) = shared::first_validation_message(&errors).unzip();
            SubmissionCheck {
                valid: false,
                field,
                message,
            }
        }
    };
    render(&check)
}

/// `{ valid, field?, message? }` with the first Indonesian error message
#[wasm_bindgen(js_name = validateReportSubmission)]
pub fn validate_report_submission(submission_json: &str) -> Result<String, JsValue> {
    to_js(check_submission(submission_json))
}

/// `YYYY-MM-DD` and `HH:MM` joined as `YYYY-MM-DDTHH:MM:00`
#[wasm_bindgen(js_name = composeWaktu)]
pub fn compose_waktu(tanggal: &str, waktu: &str) -> Result<String, JsValue> {
    to_js(shared::compose_waktu(tanggal, waktu).map_err(str::to_string))
}

/// Catalog entry as JSON; unknown codes get an `Unknown` name and regional
#[wasm_bindgen(js_name = kebunDetail)]
pub fn kebun_detail(kebun_id: &str) -> Result<String, JsValue> {
    to_js(render(&shared::kebun_detail(kebun_id)))
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn exported_functions_round_trip_through_js() {
        assert_eq!(format_date_display("\"2023-05-15\"", 7).unwrap(), "15 Mei 2023");
        assert_eq!(compose_waktu("2023-05-15", "08:30").unwrap(), "2023-05-15T08:30:00");

        let handle = HierarchyHandle::new(r#"[[{"kebun":"1KSD","afdelings":[{"afdeling":"A","blocks":[{"blok":"1"}]}]}]]"#).unwrap();
        assert_eq!(handle.estates(), ["1KSD"]);
        assert_eq!(handle.blocks_for("1KSD", "A"), ["1"]);
    }

    #[wasm_bindgen_test]
    fn errors_arrive_as_js_strings() {
        let err = filter_reports("not json", "{}", 7).unwrap_err();
        assert!(err.as_string().unwrap().starts_with("Invalid reports JSON"));
        assert!(compose_waktu("2023-05-15", "24:00").is_err());
    }
}
