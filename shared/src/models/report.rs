//! Field report models

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::datetime::DateInput;
use crate::types::GeoPoint;
use crate::validation::{
    validate_patch_rules, validate_submission_rules, validate_weather_choice,
};

/// One field submission as the API and reference exports carry it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub kebun: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub afdeling: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub blok: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub tahuntanam: Option<String>,

    /// Longitude
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub koordinat_x: Option<f64>,
    /// Latitude
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub koordinat_y: Option<f64>,

    #[serde(default, rename = "nomorPP", deserialize_with = "lenient_integer")]
    pub nomor_pp: Option<i64>,
    #[serde(default)]
    pub tanggal: DateInput,
    #[serde(default)]
    pub waktu: DateInput,
    #[serde(default, deserialize_with = "lenient_weather")]
    pub kondisi_cuaca: Option<WeatherCondition>,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub estimasi_serangga: Option<i64>,
    /// Fruit-bunch weight metric
    #[serde(
        default,
        deserialize_with = "lenient_decimal",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub rbt: Option<Decimal>,

    #[serde(default, deserialize_with = "lenient_created_by")]
    pub created_by: Option<CreatedBy>,
    #[serde(default)]
    pub created_at: DateInput,
    #[serde(default)]
    pub updated_at: DateInput,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ReportRecord {
    /// Map position, present only when both coordinates are
    pub fn position(&self) -> Option<GeoPoint> {
        match (self.koordinat_y, self.koordinat_x) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            _ => None,
        }
    }

    pub fn creator_name(&self) -> Option<&str> {
        self.created_by.as_ref().and_then(|c| c.name.as_deref())
    }
}

/// Author of a report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CreatedBy {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Weather at the time of release
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WeatherCondition {
    Cerah,
    Panas,
    Berawan,
    Dingin,
    Hujan,
    Mendung,
    Berangin,
    /// Value recorded by an older client outside the current list
    Other(String),
}

impl WeatherCondition {
    /// Choices offered by the report form, in display order
    pub const CHOICES: [WeatherCondition; 7] = [
        WeatherCondition::Cerah,
        WeatherCondition::Panas,
        WeatherCondition::Berawan,
        WeatherCondition::Dingin,
        WeatherCondition::Hujan,
        WeatherCondition::Mendung,
        WeatherCondition::Berangin,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            WeatherCondition::Cerah => "Cerah",
            WeatherCondition::Panas => "Panas",
            WeatherCondition::Berawan => "Berawan",
            WeatherCondition::Dingin => "Dingin",
            WeatherCondition::Hujan => "Hujan",
            WeatherCondition::Mendung => "Mendung",
            WeatherCondition::Berangin => "Berangin",
            WeatherCondition::Other(other) => other,
        }
    }

    pub fn is_standard(&self) -> bool {
        !matches!(self, WeatherCondition::Other(_))
    }
}

impl From<&str> for WeatherCondition {
    fn from(value: &str) -> Self {
        WeatherCondition::CHOICES
            .iter()
            .find(|c| c.as_str() == value)
            .cloned()
            .unwrap_or_else(|| WeatherCondition::Other(value.to_string()))
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for WeatherCondition {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WeatherCondition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(WeatherCondition::from(value.as_str()))
    }
}

/// Report series numbers in use
pub const NOMOR_PP_RANGE: std::ops::RangeInclusive<i64> = 1..=35;

/// A new report as composed by the submission form
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_submission_rules", skip_on_field_errors = false))]
pub struct ReportSubmission {
    #[validate(length(min = 1, message = "Kebun harus diisi"))]
    pub kebun: String,
    #[validate(length(min = 1, message = "Afdeling harus diisi"))]
    pub afdeling: String,
    #[validate(length(min = 1, message = "Blok harus diisi"))]
    pub blok: String,
    /// Filled from the location hierarchy when the client leaves it out
    #[serde(default, deserialize_with = "lenient_text")]
    pub tahuntanam: Option<String>,

    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub koordinat_x: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub koordinat_y: Option<f64>,

    #[serde(rename = "nomorPP")]
    #[validate(range(min = 1, max = 35, message = "Nomor PP harus antara 1 dan 35"))]
    pub nomor_pp: i64,
    #[validate(range(min = 0, message = "Estimasi serangga tidak boleh negatif"))]
    pub estimasi_serangga: i64,

    #[validate(length(min = 1, message = "Tanggal harus diisi"))]
    pub tanggal: String,
    /// `HH:MM` or an already composed `YYYY-MM-DDTHH:MM:SS`
    #[validate(length(min = 1, message = "Waktu harus diisi"))]
    pub waktu: String,
    #[validate(custom = "validate_weather_choice")]
    pub kondisi_cuaca: String,

    #[serde(default, deserialize_with = "lenient_decimal")]
    pub rbt: Option<Decimal>,

    /// Base64 data URL of a photo taken in the field
    #[serde(default)]
    pub image: Option<String>,
}

/// Fields an administrator may change on an existing report
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_patch_rules", skip_on_field_errors = false))]
pub struct ReportPatch {
    #[serde(default, deserialize_with = "lenient_text")]
    pub kebun: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub afdeling: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub blok: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub tahuntanam: Option<String>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub koordinat_x: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub koordinat_y: Option<f64>,
    #[serde(default, rename = "nomorPP", deserialize_with = "lenient_integer")]
    #[validate(range(min = 1, max = 35, message = "Nomor PP harus antara 1 dan 35"))]
    pub nomor_pp: Option<i64>,
    #[serde(default, deserialize_with = "lenient_integer")]
    #[validate(range(min = 0, message = "Estimasi serangga tidak boleh negatif"))]
    pub estimasi_serangga: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub tanggal: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub waktu: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    #[validate(custom = "validate_weather_choice")]
    pub kondisi_cuaca: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub rbt: Option<Decimal>,
    #[serde(default)]
    pub image: Option<String>,
}

// ----------------------------------------------------------------------------
// Lenient field readers
//
// Records written by older clients carry numbers as strings, coordinates as
// `toFixed` strings, and `createdBy` as a JSON string when sent via
// form-data. Unreadable values become `None` instead of failing the record.
// ----------------------------------------------------------------------------

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

pub(crate) fn lenient_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    use serde_json::Value;

    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

pub(crate) fn lenient_coordinate<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    use serde_json::Value;

    let value = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    // Exact zero is what an untouched form field produces
    Ok(value.filter(|v| v.is_finite() && *v != 0.0))
}

fn lenient_integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    use serde_json::Value;

    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

fn lenient_decimal<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Decimal>, D::Error> {
    use serde_json::Value;

    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .to_string()
            .parse::<Decimal>()
            .ok()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64)),
        Value::String(s) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    })
}

fn lenient_weather<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<WeatherCondition>, D::Error> {
    Ok(lenient_text(deserializer)?.map(|s| WeatherCondition::from(s.as_str())))
}

fn lenient_created_by<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<CreatedBy>, D::Error> {
    use serde_json::Value;

    Ok(match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).ok(),
        Value::String(s) => serde_json::from_str(&s).ok(),
        _ => None,
    })
}

/// RBT as a float for chart and spreadsheet consumers
pub fn rbt_as_f64(rbt: Option<Decimal>) -> Option<f64> {
    rbt.and_then(|d| d.to_f64())
}
