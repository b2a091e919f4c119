//! Date and time normalization for report timestamps
//!
//! Report dates arrive in several shapes: remote-database timestamps carrying
//! `_seconds`, bare `YYYY-MM-DD` strings from the form, `HH:MM` strings,
//! ISO / RFC strings and epoch milliseconds. [`DateInput`] names each shape
//! and the normalizers turn them into comparable values and Indonesian
//! display strings.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Offset, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Indonesian month names, January first
pub const MONTHS_ID: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// User-facing message for absent values
pub const MSG_NO_DATA: &str = "Data tidak tersedia";
/// User-facing message for unparseable dates
pub const MSG_INVALID_DATE: &str = "Format tanggal tidak valid";
/// User-facing message for unparseable times
pub const MSG_INVALID_TIME: &str = "Format waktu tidak valid";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    // Date.prototype.toString, once the zone name in parentheses is dropped
    "%a %b %d %Y %H:%M:%S GMT%z",
];

/// Calendar dates without a time, read as local midnight
const NAIVE_DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y"];

/// Why a value could not be normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// Value was absent, null or an empty string
    #[error("data not available")]
    NoData,
    /// Value was present but could not be read as a date or time
    #[error("invalid format")]
    InvalidFormat,
}

impl NormalizeError {
    /// Indonesian message shown in place of a date
    pub fn date_message(&self) -> &'static str {
        match self {
            NormalizeError::NoData => MSG_NO_DATA,
            NormalizeError::InvalidFormat => MSG_INVALID_DATE,
        }
    }

    /// Indonesian message shown in place of a time
    pub fn time_message(&self) -> &'static str {
        match self {
            NormalizeError::NoData => MSG_NO_DATA,
            NormalizeError::InvalidFormat => MSG_INVALID_TIME,
        }
    }
}

/// Timezone in which instants are rendered and compared.
///
/// Bare dates and naive datetimes are already wall-clock values and are never
/// shifted; only instants (epoch values, strings with an offset) are converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayZone(FixedOffset);

impl DisplayZone {
    /// Western Indonesia Time, UTC+07:00
    pub fn wib() -> Self {
        Self(FixedOffset::east_opt(7 * 3600).unwrap_or_else(utc_offset))
    }

    pub fn utc() -> Self {
        Self(utc_offset())
    }

    /// Zone at a whole-hour offset from UTC, `None` outside -12..=14
    pub fn from_offset_hours(hours: i32) -> Option<Self> {
        if !(-12..=14).contains(&hours) {
            return None;
        }
        FixedOffset::east_opt(hours * 3600).map(Self)
    }

    pub fn offset(&self) -> FixedOffset {
        self.0
    }

    fn localize(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.0).naive_local()
    }
}

impl Default for DisplayZone {
    fn default() -> Self {
        Self::wib()
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

/// The recognised shapes of a date or time value, in dispatch priority order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DateInput {
    /// Remote timestamp object `{ "_seconds": .., "_nanoseconds": .. }`
    Epoch { seconds: i64, nanos: u32 },
    /// Exactly `YYYY-MM-DD`
    IsoDateOnly(String),
    /// Exactly `HH:MM`
    TimeOnly(String),
    /// Any other non-empty string
    Freeform(String),
    /// A JSON number, read as epoch milliseconds
    Millis(i64),
    /// Null, missing or empty
    #[default]
    Absent,
}

impl DateInput {
    /// Classify a raw JSON value. First match wins.
    pub fn classify(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Object(map) => match map.get("_seconds").and_then(Value::as_i64) {
                Some(seconds) => {
                    let nanos = map
                        .get("_nanoseconds")
                        .and_then(Value::as_u64)
                        .and_then(|n| u32::try_from(n).ok())
                        .unwrap_or(0);
                    DateInput::Epoch { seconds, nanos }
                }
                None => DateInput::Freeform(value.to_string()),
            },
            Value::String(text) => Self::from_text(text),
            Value::Number(number) => match number.as_i64() {
                Some(millis) => DateInput::Millis(millis),
                None => number
                    .as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| DateInput::Millis(f.trunc() as i64))
                    .unwrap_or_else(|| DateInput::Freeform(number.to_string())),
            },
            Value::Null => DateInput::Absent,
            other => DateInput::Freeform(other.to_string()),
        }
    }

    /// Classify a string value
    pub fn from_text(text: &str) -> Self {
        if text.is_empty() {
            DateInput::Absent
        } else if is_iso_date_only(text) {
            DateInput::IsoDateOnly(text.to_string())
        } else if is_time_only(text) {
            DateInput::TimeOnly(text.to_string())
        } else {
            DateInput::Freeform(text.to_string())
        }
    }

    pub fn epoch(seconds: i64) -> Self {
        DateInput::Epoch { seconds, nanos: 0 }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, DateInput::Absent)
    }

    /// The raw JSON shape this value was read from
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::{json, Value};

        match self {
            DateInput::Epoch { seconds, nanos } => {
                json!({ "_seconds": seconds, "_nanoseconds": nanos })
            }
            DateInput::IsoDateOnly(s) | DateInput::TimeOnly(s) | DateInput::Freeform(s) => {
                Value::String(s.clone())
            }
            DateInput::Millis(ms) => json!(ms),
            DateInput::Absent => Value::Null,
        }
    }
}

impl From<&str> for DateInput {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

impl From<Option<&str>> for DateInput {
    fn from(text: Option<&str>) -> Self {
        text.map(Self::from_text).unwrap_or_default()
    }
}

impl Serialize for DateInput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DateInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self::classify(&value))
    }
}

fn is_iso_date_only(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn is_time_only(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 5
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 => *b == b':',
            _ => b.is_ascii_digit(),
        })
}

/// A normalized report date, held as wall-clock time in the display zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalDate(NaiveDateTime);

impl CanonicalDate {
    pub fn from_local(local: NaiveDateTime) -> Self {
        Self(local)
    }

    pub fn local(&self) -> NaiveDateTime {
        self.0
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month, January = 0
    pub fn month0(&self) -> u32 {
        self.0.month0()
    }

    /// Long Indonesian form, e.g. `15 Mei 2023`
    pub fn display(&self) -> String {
        let month = MONTHS_ID[self.month0() as usize];
        format!("{} {} {}", self.0.day(), month, self.year())
    }

    /// `YYYY-MM-DD`, which normalizes back to the same calendar date
    pub fn to_iso_date(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    pub fn time(&self) -> CanonicalTime {
        CanonicalTime::new(self.0.hour() as u8, self.0.minute() as u8)
    }
}

/// A normalized clock time. Values read from `HH:MM` text keep the digits
/// as written, so `25:30` stays `25:30`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalTime {
    hour: u8,
    minute: u8,
}

impl CanonicalTime {
    pub fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// `HH:MM`
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

/// Normalize a date value.
///
/// A bare `HH:MM` carries no calendar date and is reported as
/// [`NormalizeError::InvalidFormat`].
pub fn normalize_date(input: &DateInput, zone: &DisplayZone) -> Result<CanonicalDate, NormalizeError> {
    match input {
        DateInput::Absent => Err(NormalizeError::NoData),
        DateInput::Epoch { seconds, nanos } => epoch_to_local(*seconds, *nanos, zone),
        DateInput::IsoDateOnly(text) => parse_local_date(text)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(CanonicalDate)
            .ok_or(NormalizeError::InvalidFormat),
        DateInput::TimeOnly(_) => Err(NormalizeError::InvalidFormat),
        DateInput::Freeform(text) => parse_freeform(text, zone).ok_or(NormalizeError::InvalidFormat),
        DateInput::Millis(ms) => DateTime::<Utc>::from_timestamp_millis(*ms)
            .map(|dt| CanonicalDate(zone.localize(dt)))
            .ok_or(NormalizeError::InvalidFormat),
    }
}

/// Normalize a time value.
///
/// `HH:MM` strings are taken verbatim, even outside the 24-hour clock;
/// a bare date reads as local midnight.
pub fn normalize_time(input: &DateInput, zone: &DisplayZone) -> Result<CanonicalTime, NormalizeError> {
    match input {
        DateInput::TimeOnly(text) => {
            let digits = |range: std::ops::Range<usize>| {
                text.get(range)
                    .filter(|d: &&str| d.bytes().all(|b| b.is_ascii_digit()))
                    .and_then(|d| d.parse::<u8>().ok())
                    .ok_or(NormalizeError::InvalidFormat)
            };
            if text.get(2..3) != Some(":") || text.len() != 5 {
                return Err(NormalizeError::InvalidFormat);
            }
            Ok(CanonicalTime::new(digits(0..2)?, digits(3..5)?))
        }
        other => normalize_date(other, zone).map(|date| date.time()),
    }
}

/// Display string for a date, or the Indonesian message for why there is none
pub fn format_date_display(input: &DateInput, zone: &DisplayZone) -> String {
    match normalize_date(input, zone) {
        Ok(date) => date.display(),
        Err(e) => e.date_message().to_string(),
    }
}

/// Display string for a time, or the Indonesian message for why there is none
pub fn format_time_display(input: &DateInput, zone: &DisplayZone) -> String {
    match normalize_time(input, zone) {
        Ok(time) => time.display(),
        Err(e) => e.time_message().to_string(),
    }
}

/// Parse `YYYY-MM-DD` as a local calendar date
pub fn parse_local_date(text: &str) -> Option<NaiveDate> {
    if !is_iso_date_only(text) {
        return None;
    }
    let year = text[0..4].parse().ok()?;
    let month = text[5..7].parse().ok()?;
    let day = text[8..10].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn epoch_to_local(seconds: i64, nanos: u32, zone: &DisplayZone) -> Result<CanonicalDate, NormalizeError> {
    let millis = seconds
        .checked_mul(1000)
        .and_then(|ms| ms.checked_add(i64::from(nanos / 1_000_000)))
        .ok_or(NormalizeError::InvalidFormat)?;
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| CanonicalDate(zone.localize(dt)))
        .ok_or(NormalizeError::InvalidFormat)
}

fn parse_freeform(text: &str, zone: &DisplayZone) -> Option<CanonicalDate> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(CanonicalDate(zone.localize(dt.with_timezone(&Utc))));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(CanonicalDate(zone.localize(dt.with_timezone(&Utc))));
    }

    let without_zone_name = text.split(" (").next().unwrap_or(text);
    if let Some(dt) = OFFSET_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(without_zone_name, fmt).ok())
    {
        return Some(CanonicalDate(zone.localize(dt.with_timezone(&Utc))));
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NAIVE_DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(CanonicalDate)
}
