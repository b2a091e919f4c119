//! Spreadsheet export of report lists

use serde::Serialize;
use shared::{
    format_date_display, format_time_display, kebun_detail, rbt_as_f64, DisplayZone, ReportRecord,
};

use crate::error::{AppError, AppResult};

/// One spreadsheet row with Indonesian column headers
#[derive(Debug, Serialize)]
pub struct ExportRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Kebun")]
    pub kebun: String,
    #[serde(rename = "Nama Kebun")]
    pub nama_kebun: String,
    #[serde(rename = "Afdeling")]
    pub afdeling: String,
    #[serde(rename = "Blok")]
    pub blok: String,
    #[serde(rename = "Tahun Tanam")]
    pub tahuntanam: String,
    #[serde(rename = "Nomor PP")]
    pub nomor_pp: Option<i64>,
    #[serde(rename = "Tanggal")]
    pub tanggal: String,
    #[serde(rename = "Waktu")]
    pub waktu: String,
    #[serde(rename = "Kondisi Cuaca")]
    pub kondisi_cuaca: String,
    #[serde(rename = "Estimasi Serangga")]
    pub estimasi_serangga: Option<i64>,
    #[serde(rename = "RBT")]
    pub rbt: Option<f64>,
    #[serde(rename = "Koordinat X")]
    pub koordinat_x: Option<f64>,
    #[serde(rename = "Koordinat Y")]
    pub koordinat_y: Option<f64>,
    #[serde(rename = "Dibuat Oleh")]
    pub dibuat_oleh: String,
}

impl ExportRow {
    pub fn from_record(record: &ReportRecord, zone: &DisplayZone) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();

        Self {
            id: record.id.clone(),
            kebun: text(&record.kebun),
            nama_kebun: record
                .kebun
                .as_deref()
                .map(|k| kebun_detail(k).name)
                .unwrap_or_default(),
            afdeling: text(&record.afdeling),
            blok: text(&record.blok),
            tahuntanam: text(&record.tahuntanam),
            nomor_pp: record.nomor_pp,
            tanggal: format_date_display(&record.tanggal, zone),
            waktu: format_time_display(&record.waktu, zone),
            kondisi_cuaca: record
                .kondisi_cuaca
                .as_ref()
                .map(|w| w.to_string())
                .unwrap_or_default(),
            estimasi_serangga: record.estimasi_serangga,
            rbt: rbt_as_f64(record.rbt),
            koordinat_x: record.koordinat_x,
            koordinat_y: record.koordinat_y,
            dibuat_oleh: record.creator_name().unwrap_or_default().to_string(),
        }
    }
}

/// Serialize rows as CSV with a header line
pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in data {
        wtr.serialize(record)
            .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
}

/// File name for an export made on `date`, e.g. `laporan-hatch-carry-2023-05-15.csv`
pub fn export_file_name(date: chrono::NaiveDate) -> String {
    format!("laporan-hatch-carry-{}.csv", date.format("%Y-%m-%d"))
}
