//! Database models for the Hatch & Carry reporting server
//!
//! Re-exports models from the shared crate and adds the stored report row

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

pub use shared::models::*;
use shared::DateInput;

/// A row of the `reports` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReportRow {
    pub id: Uuid,
    pub kebun: String,
    pub afdeling: String,
    pub blok: String,
    pub tahuntanam: Option<String>,
    pub koordinat_x: Option<f64>,
    pub koordinat_y: Option<f64>,
    pub nomor_pp: i32,
    /// Kept as JSON so legacy timestamp objects survive unchanged
    pub tanggal: serde_json::Value,
    pub waktu: serde_json::Value,
    pub kondisi_cuaca: String,
    pub estimasi_serangga: i64,
    pub rbt: Option<Decimal>,
    pub created_by: Option<serde_json::Value>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn instant(at: DateTime<Utc>) -> DateInput {
    DateInput::Epoch {
        seconds: at.timestamp(),
        nanos: at.timestamp_subsec_nanos(),
    }
}

fn non_empty(value: String) -> Option<String> {
    Some(value).filter(|v| !v.is_empty())
}

impl From<ReportRow> for ReportRecord {
    fn from(row: ReportRow) -> Self {
        Self {
            id: row.id.to_string(),
            kebun: non_empty(row.kebun),
            afdeling: non_empty(row.afdeling),
            blok: non_empty(row.blok),
            tahuntanam: row.tahuntanam.and_then(non_empty),
            koordinat_x: row.koordinat_x,
            koordinat_y: row.koordinat_y,
            nomor_pp: Some(i64::from(row.nomor_pp)),
            tanggal: DateInput::classify(&row.tanggal),
            waktu: DateInput::classify(&row.waktu),
            kondisi_cuaca: Some(WeatherCondition::from(row.kondisi_cuaca.as_str())),
            estimasi_serangga: Some(row.estimasi_serangga),
            rbt: row.rbt,
            created_by: row
                .created_by
                .and_then(|value| serde_json::from_value(value).ok()),
            created_at: instant(row.created_at),
            updated_at: instant(row.updated_at),
            image_url: row.image_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_row_to_record() {
        let created = Utc.with_ymd_and_hms(2023, 5, 15, 1, 0, 0).unwrap();
        let row = ReportRow {
            id: Uuid::nil(),
            kebun: "1KSD".into(),
            afdeling: "A".into(),
            blok: "1".into(),
            tahuntanam: Some(String::new()),
            koordinat_x: Some(99.1),
            koordinat_y: Some(2.1),
            nomor_pp: 4,
            tanggal: json!({ "_seconds": 1684108800, "_nanoseconds": 0 }),
            waktu: json!("2023-05-15T08:30:00"),
            kondisi_cuaca: "Mendung".into(),
            estimasi_serangga: 250,
            rbt: None,
            created_by: Some(json!({ "name": "Sari", "avatar": null })),
            image_url: None,
            created_at: created,
            updated_at: created,
        };

        let record = ReportRecord::from(row);
        assert_eq!(record.tahuntanam, None);
        assert_eq!(record.tanggal, DateInput::epoch(1684108800));
        assert_eq!(record.waktu, DateInput::Freeform("2023-05-15T08:30:00".into()));
        assert_eq!(record.kondisi_cuaca, Some(WeatherCondition::Mendung));
        assert_eq!(record.creator_name(), Some("Sari"));
        assert_eq!(record.created_at, DateInput::epoch(created.timestamp()));
    }
}
