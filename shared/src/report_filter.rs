//! Filtering and aggregation over report lists
//!
//! Everything here is a pure function of the slice it is given. Records that
//! cannot be read for a constraint simply do not match it.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::datetime::{normalize_date, DisplayZone};
use crate::models::{active, FilterSpec, ReportRecord, TemporalFilter};
use crate::types::{MapBounds, UNKNOWN_LOCATION};

// ============================================================================
// Filtering
// ============================================================================

fn matches_search(report: &ReportRecord, term: &str) -> bool {
    let contains = |field: Option<&str>| {
        field
            .map(|value| value.to_lowercase().contains(term))
            .unwrap_or(false)
    };

    contains(report.kebun.as_deref())
        || contains(report.afdeling.as_deref())
        || contains(report.blok.as_deref())
        || report
            .nomor_pp
            .map(|n| n.to_string().contains(term))
            .unwrap_or(false)
        || contains(report.creator_name())
}

fn matches_exact(field: &Option<String>, wanted: &Option<String>) -> bool {
    match active(wanted) {
        Some(wanted) => field.as_deref() == Some(wanted),
        None => true,
    }
}

fn matches_temporal(report: &ReportRecord, temporal: &TemporalFilter, zone: &DisplayZone) -> bool {
    if !temporal.is_active() {
        return true;
    }
    let Ok(date) = normalize_date(&report.tanggal, zone) else {
        return false;
    };

    match *temporal {
        TemporalFilter::None => true,
        TemporalFilter::Range { start, end } => (start..=end).contains(&date.date()),
        TemporalFilter::MonthYear { month, year } => {
            month.map_or(true, |m| date.month0() == m) && year.map_or(true, |y| date.year() == y)
        }
    }
}

/// Reports satisfying every active constraint, in input order
pub fn apply_filter(
    reports: &[ReportRecord],
    spec: &FilterSpec,
    zone: &DisplayZone,
) -> Vec<ReportRecord> {
    let term = active(&spec.search_term).map(str::to_lowercase);

    reports
        .iter()
        .filter(|r| term.as_deref().map_or(true, |t| matches_search(r, t)))
        .filter(|r| matches_exact(&r.kebun, &spec.kebun))
        .filter(|r| matches_exact(&r.afdeling, &spec.afdeling))
        .filter(|r| matches_exact(&r.blok, &spec.blok))
        .filter(|r| matches_temporal(r, &spec.temporal, zone))
        .cloned()
        .collect()
}

// ============================================================================
// Grouping
// ============================================================================

/// kebun → afdeling → blok → reports
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LocationGroups(BTreeMap<String, BTreeMap<String, BTreeMap<String, Vec<ReportRecord>>>>);

impl LocationGroups {
    pub fn estates(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn get(&self, kebun: &str, afdeling: &str, blok: &str) -> Option<&[ReportRecord]> {
        self.0
            .get(kebun)?
            .get(afdeling)?
            .get(blok)
            .map(Vec::as_slice)
    }

    pub fn estate_count(&self) -> usize {
        self.0.len()
    }

    /// Reports under one estate
    pub fn estate_total(&self, kebun: &str) -> usize {
        self.0
            .get(kebun)
            .map(|afdelings| afdelings.values().flat_map(|b| b.values()).map(Vec::len).sum())
            .unwrap_or(0)
    }

    /// Divisions across every estate
    pub fn division_count(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    /// Reports across every bucket
    pub fn total(&self) -> usize {
        self.0
            .values()
            .flat_map(|afdelings| afdelings.values())
            .flat_map(|bloks| bloks.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn location_key(value: &Option<String>) -> String {
    active(value).unwrap_or(UNKNOWN_LOCATION).to_string()
}

/// Group reports that have a map position; missing keys go under `Unknown`
pub fn group_by_location(reports: &[ReportRecord]) -> LocationGroups {
    let mut groups = LocationGroups::default();
    for report in reports.iter().filter(|r| r.position().is_some()) {
        groups
            .0
            .entry(location_key(&report.kebun))
            .or_default()
            .entry(location_key(&report.afdeling))
            .or_default()
            .entry(location_key(&report.blok))
            .or_default()
            .push(report.clone());
    }
    groups
}

// ============================================================================
// Aggregates
// ============================================================================

/// Drop-down values present in a report list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub kebun: Vec<String>,
    pub afdeling: Vec<String>,
    pub blok: Vec<String>,
}

fn push_unique(list: &mut Vec<String>, value: &Option<String>) {
    if let Some(value) = active(value) {
        if !list.iter().any(|v| v == value) {
            list.push(value.to_string());
        }
    }
}

/// Unique non-empty location values in first-seen order
pub fn filter_options(reports: &[ReportRecord]) -> FilterOptions {
    let mut options = FilterOptions::default();
    for report in reports {
        push_unique(&mut options.kebun, &report.kebun);
        push_unique(&mut options.afdeling, &report.afdeling);
        push_unique(&mut options.blok, &report.blok);
    }
    options
}

/// Box around every report with a position
pub fn map_bounds(reports: &[ReportRecord]) -> Option<MapBounds> {
    MapBounds::from_points(reports.iter().filter_map(ReportRecord::position))
}

/// Headline numbers for a report list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total: usize,
    pub with_position: usize,
    pub per_kebun: BTreeMap<String, usize>,
    pub total_estimasi_serangga: i64,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub mean_rbt: Option<Decimal>,
}

pub fn summarize(reports: &[ReportRecord]) -> ReportSummary {
    let mut summary = ReportSummary {
        total: reports.len(),
        ..Default::default()
    };
    let mut rbt_sum = Decimal::ZERO;
    let mut rbt_count = 0u32;

    for report in reports {
        if report.position().is_some() {
            summary.with_position += 1;
        }
        *summary
            .per_kebun
            .entry(location_key(&report.kebun))
            .or_default() += 1;
        summary.total_estimasi_serangga += report.estimasi_serangga.unwrap_or(0);
        if let Some(rbt) = report.rbt {
            rbt_sum += rbt;
            rbt_count += 1;
        }
    }

    if rbt_count > 0 {
        summary.mean_rbt = Some((rbt_sum / Decimal::from(rbt_count)).round_dp(2));
    }
    summary
}

/// The ten most recent years, newest first
pub fn year_options(current_year: i32) -> Vec<i32> {
    (0..10).map(|offset| current_year - offset).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime::DateInput;
    use crate::models::CreatedBy;
    use crate::types::GeoPoint;
    use chrono::NaiveDate;

    fn report(id: &str, kebun: &str, tanggal: &str) -> ReportRecord {
        ReportRecord {
            id: id.into(),
            kebun: Some(kebun.into()),
            afdeling: Some("A".into()),
            blok: Some("1".into()),
            koordinat_x: Some(99.5),
            koordinat_y: Some(2.5),
            nomor_pp: Some(12),
            tanggal: DateInput::from(tanggal),
            ..Default::default()
        }
    }

    fn ids(reports: &[ReportRecord]) -> Vec<&str> {
        reports.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_scenario_d_exact_kebun() {
        let reports = vec![
            report("r1", "1KSD", "2023-05-15"),
            report("r2", "1KTO", "2023-05-15"),
            report("r3", "1KSD", "2023-06-01"),
        ];
        let spec = FilterSpec::new().with_kebun("1KSD");
        let result = apply_filter(&reports, &spec, &DisplayZone::wib());
        assert_eq!(ids(&result), ["r1", "r3"]);
    }

    #[test]
    fn test_empty_spec_is_identity() {
        let reports = vec![report("r1", "1KSD", "bad"), report("r2", "1KTO", "")];
        let result = apply_filter(&reports, &FilterSpec::new(), &DisplayZone::wib());
        assert_eq!(result, reports);
    }

    #[test]
    fn test_search_covers_creator_and_nomor_pp() {
        let mut by_budi = report("r1", "1KSD", "2023-05-15");
        by_budi.created_by = Some(CreatedBy {
            name: Some("Budi Santoso".into()),
            ..Default::default()
        });
        let mut other = report("r2", "1KTO", "2023-05-15");
        other.nomor_pp = Some(31);
        other.blok = None;

        let reports = vec![by_budi, other];
        let zone = DisplayZone::wib();
        assert_eq!(ids(&apply_filter(&reports, &FilterSpec::new().with_search("BUDI"), &zone)), ["r1"]);
        assert_eq!(ids(&apply_filter(&reports, &FilterSpec::new().with_search("31"), &zone)), ["r2"]);
        assert_eq!(ids(&apply_filter(&reports, &FilterSpec::new().with_search("kto"), &zone)), ["r2"]);
        assert!(apply_filter(&reports, &FilterSpec::new().with_search("zzz"), &zone).is_empty());
    }

    #[test]
    fn test_range_is_inclusive_by_day() {
        let mut late = report("r2", "1KSD", "");
        late.tanggal = DateInput::Freeform("2023-05-31T23:30:00".into());
        let reports = vec![
            report("r1", "1KSD", "2023-05-01"),
            late,
            report("r3", "1KSD", "2023-06-01"),
            report("r4", "1KSD", "not-a-date"),
        ];
        let spec = FilterSpec::new().with_range(
            NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 5, 31).unwrap(),
        );
        assert_eq!(ids(&apply_filter(&reports, &spec, &DisplayZone::wib())), ["r1", "r2"]);
    }

    #[test]
    fn test_month_is_zero_based() {
        let reports = vec![
            report("jan", "1KSD", "2024-01-10"),
            report("may", "1KSD", "2023-05-15"),
            report("none", "1KSD", ""),
        ];
        let zone = DisplayZone::wib();
        let january = FilterSpec::new().with_month_year(Some(0), None);
        assert_eq!(ids(&apply_filter(&reports, &january, &zone)), ["jan"]);
        let year = FilterSpec::new().with_month_year(None, Some(2023));
        assert_eq!(ids(&apply_filter(&reports, &year, &zone)), ["may"]);
        let both = FilterSpec::new().with_month_year(Some(4), Some(2024));
        assert!(apply_filter(&reports, &both, &zone).is_empty());
    }

    #[test]
    fn test_scenario_e_grouping_skips_missing_position() {
        let mut unplaced = report("r2", "1KSD", "2023-05-15");
        unplaced.koordinat_x = None;
        unplaced.koordinat_y = None;
        let mut unnamed = report("r3", "1KTO", "2023-05-15");
        unnamed.afdeling = None;

        let groups = group_by_location(&[report("r1", "1KSD", "2023-05-15"), unplaced, unnamed]);
        assert_eq!(groups.total(), 2);
        assert_eq!(ids(groups.get("1KSD", "A", "1").unwrap()), ["r1"]);
        assert_eq!(ids(groups.get("1KTO", UNKNOWN_LOCATION, "1").unwrap()), ["r3"]);
        assert_eq!(groups.estate_count(), 2);
        assert_eq!(groups.division_count(), 2);
        assert_eq!(groups.estate_total("1KSD"), 1);
    }

    #[test]
    fn test_filter_options_first_seen() {
        let mut b = report("r2", "1KTO", "");
        b.afdeling = Some("B".into());
        b.blok = Some(String::new());
        let options = filter_options(&[report("r1", "1KTO", ""), b, report("r3", "1KSD", "")]);
        assert_eq!(options.kebun, ["1KTO", "1KSD"]);
        assert_eq!(options.afdeling, ["A", "B"]);
        assert_eq!(options.blok, ["1"]);
    }

    #[test]
    fn test_map_bounds() {
        let mut far = report("r2", "1KSD", "");
        far.koordinat_x = Some(101.0);
        far.koordinat_y = Some(-1.0);
        let mut unplaced = report("r3", "1KSD", "");
        unplaced.koordinat_x = None;

        let bounds = map_bounds(&[report("r1", "1KSD", ""), far, unplaced]).unwrap();
        assert_eq!(bounds.south_west, GeoPoint::new(-1.0, 99.5));
        assert_eq!(bounds.north_east, GeoPoint::new(2.5, 101.0));
        assert!(map_bounds(&[]).is_none());
    }

    #[test]
    fn test_summarize() {
        let mut a = report("r1", "1KSD", "");
        a.estimasi_serangga = Some(1000);
        a.rbt = Some(Decimal::new(20, 0));
        let mut b = report("r2", "1KSD", "");
        b.estimasi_serangga = Some(500);
        b.rbt = Some(Decimal::new(25, 0));
        b.koordinat_y = None;
        let c = report("r3", "1KTO", "");

        let summary = summarize(&[a, b, c]);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.with_position, 2);
        assert_eq!(summary.per_kebun.get("1KSD"), Some(&2));
        assert_eq!(summary.total_estimasi_serangga, 1500);
        assert_eq!(summary.mean_rbt, Some(Decimal::new(225, 1)));
    }

    #[test]
    fn test_year_options() {
        let years = year_options(2025);
        assert_eq!(years.len(), 10);
        assert_eq!(years.first(), Some(&2025));
        assert_eq!(years.last(), Some(&2016));
    }
}
