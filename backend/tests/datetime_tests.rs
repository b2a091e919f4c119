//! Date and time normalization tests
//!
//! Property-based and unit tests for:
//! - Idempotent normalization through the ISO date form
//! - Every recognised input shape
//! - Indonesian display strings and messages

use chrono::NaiveDate;
use proptest::prelude::*;
use serde_json::{json, Value};
use shared::{
    format_date_display, format_time_display, normalize_date, normalize_time, DateInput,
    DisplayZone, NormalizeError, MSG_INVALID_DATE, MSG_INVALID_TIME, MSG_NO_DATA,
};

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Seconds between 2000-01-01 and 2040-01-01
fn epoch_strategy() -> impl Strategy<Value = i64> {
    946_684_800i64..2_208_988_800i64
}

fn calendar_date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2040, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn zone_strategy() -> impl Strategy<Value = DisplayZone> {
    (-12i32..=14).prop_map(|h| DisplayZone::from_offset_hours(h).unwrap())
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// Normalizing the ISO form of a normalized date gives the same day
    #[test]
    fn test_normalize_is_idempotent_for_timestamps(
        seconds in epoch_strategy(),
        nanos in 0u32..1_000_000_000,
        zone in zone_strategy(),
    ) {
        let first = normalize_date(&DateInput::Epoch { seconds, nanos }, &zone).unwrap();
        let again = normalize_date(&DateInput::from_text(&first.to_iso_date()), &zone).unwrap();
        prop_assert_eq!(first.date(), again.date());
    }

    #[test]
    fn test_iso_dates_are_read_as_local_calendar_days(
        date in calendar_date_strategy(),
        zone in zone_strategy(),
    ) {
        let text = date.format("%Y-%m-%d").to_string();
        let normalized = normalize_date(&DateInput::from_text(&text), &zone).unwrap();
        prop_assert_eq!(normalized.date(), date);
        prop_assert_eq!(normalized.to_iso_date(), text);
    }

    /// Raw JSON survives a classify / serialize round
    #[test]
    fn test_classified_input_keeps_its_json(seconds in epoch_strategy()) {
        let raw = json!({ "_seconds": seconds, "_nanoseconds": 0 });
        let input = DateInput::classify(&raw);
        prop_assert_eq!(input.to_json(), raw);
    }

    /// Every two-digit `HH:MM` is taken verbatim, in range or not
    #[test]
    fn test_clock_times_are_verbatim(hour in 0u8..100, minute in 0u8..100) {
        let text = format!("{:02}:{:02}", hour, minute);
        let time = normalize_time(&DateInput::from_text(&text), &DisplayZone::wib()).unwrap();
        prop_assert_eq!(time.display(), text);
    }
}

// ============================================================================
// Unit Tests: Input Shapes
// ============================================================================

#[cfg(test)]
mod shape_tests {
    use super::*;

    fn wib() -> DisplayZone {
        DisplayZone::wib()
    }

    #[test]
    fn test_timestamp_object_and_iso_date_agree() {
        let from_object = normalize_date(
            &DateInput::classify(&json!({ "_seconds": 1684108800, "_nanoseconds": 0 })),
            &wib(),
        )
        .unwrap();
        let from_text = normalize_date(&DateInput::from_text("2023-05-15"), &wib()).unwrap();

        let expected = NaiveDate::from_ymd_opt(2023, 5, 15).unwrap();
        assert_eq!(from_object.date(), expected);
        assert_eq!(from_text.date(), expected);
        assert_eq!(from_object.display(), "15 Mei 2023");
    }

    #[test]
    fn test_absent_and_unparseable() {
        assert_eq!(
            normalize_date(&DateInput::classify(&Value::Null), &wib()),
            Err(NormalizeError::NoData)
        );
        assert_eq!(
            normalize_date(&DateInput::from_text(""), &wib()),
            Err(NormalizeError::NoData)
        );
        assert_eq!(
            normalize_date(&DateInput::from_text("not-a-date"), &wib()),
            Err(NormalizeError::InvalidFormat)
        );
        assert_eq!(
            normalize_date(&DateInput::from_text("2023-02-30"), &wib()),
            Err(NormalizeError::InvalidFormat)
        );
    }

    #[test]
    fn test_time_only_has_no_date() {
        assert_eq!(
            normalize_date(&DateInput::from_text("08:30"), &wib()),
            Err(NormalizeError::InvalidFormat)
        );
        // Stored times are shown as written, even off the clock
        assert_eq!(normalize_time(&DateInput::from_text("25:10"), &wib()).unwrap().display(), "25:10");
        assert_eq!(
            normalize_time(&DateInput::TimeOnly("1é:xx".into()), &wib()),
            Err(NormalizeError::InvalidFormat)
        );
    }

    #[test]
    fn test_numbers_are_epoch_millis() {
        let date = normalize_date(&DateInput::classify(&json!(1684108800000i64)), &wib()).unwrap();
        assert_eq!(date.to_iso_date(), "2023-05-15");
        assert_eq!(date.time().display(), "07:00");
    }

    #[test]
    fn test_slashed_and_named_month_dates() {
        for text in ["2023/05/15", "May 15, 2023", "Mon May 15 2023 08:30:00 GMT+0700"] {
            let date = normalize_date(&DateInput::from_text(text), &wib()).unwrap();
            assert_eq!(date.to_iso_date(), "2023-05-15", "{text}");
        }
        let offset = normalize_date(&DateInput::from_text("2023-05-14T20:30:00+0000"), &wib()).unwrap();
        assert_eq!(offset.to_iso_date(), "2023-05-15");
        assert_eq!(offset.time().display(), "03:30");
    }

    #[test]
    fn test_offset_timestamps_shift_into_display_zone() {
        let input = DateInput::from_text("2023-05-14T20:30:00Z");
        let date = normalize_date(&input, &wib()).unwrap();
        assert_eq!(date.to_iso_date(), "2023-05-15");
        assert_eq!(normalize_time(&input, &wib()).unwrap().display(), "03:30");

        let utc = normalize_date(&input, &DisplayZone::utc()).unwrap();
        assert_eq!(utc.to_iso_date(), "2023-05-14");
    }

    #[test]
    fn test_month_is_zero_based() {
        let date = normalize_date(&DateInput::from_text("2023-01-31"), &wib()).unwrap();
        assert_eq!(date.month0(), 0);
        assert_eq!(date.year(), 2023);
    }
}

// ============================================================================
// Unit Tests: Display Strings
// ============================================================================

#[cfg(test)]
mod display_tests {
    use super::*;

    #[test]
    fn test_display_fallback_messages() {
        let zone = DisplayZone::wib();
        assert_eq!(format_date_display(&DateInput::Absent, &zone), MSG_NO_DATA);
        assert_eq!(format_date_display(&DateInput::from_text("kemarin"), &zone), MSG_INVALID_DATE);
        assert_eq!(format_time_display(&DateInput::Absent, &zone), MSG_NO_DATA);
        assert_eq!(format_time_display(&DateInput::from_text("pagi"), &zone), MSG_INVALID_TIME);
    }

    #[test]
    fn test_display_formats() {
        let zone = DisplayZone::wib();
        assert_eq!(
            format_date_display(&DateInput::from_text("2023-12-01"), &zone),
            "1 Desember 2023"
        );
        assert_eq!(
            format_time_display(&DateInput::from_text("2023-12-01T06:05:00"), &zone),
            "06:05"
        );
        // A bare date reads as local midnight
        assert_eq!(format_time_display(&DateInput::from_text("2023-12-01"), &zone), "00:00");
    }
}
