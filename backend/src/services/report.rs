//! Report storage service

use serde_json::Value;
use shared::{
    compose_waktu, normalize_date, round_coordinate, CreatedBy, DateInput, DisplayZone,
    LocationHierarchy, ReportPatch, ReportRecord, ReportSubmission,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::ReportRow;

const REPORT_COLUMNS: &str = "id, kebun, afdeling, blok, tahuntanam, koordinat_x, koordinat_y, \
     nomor_pp, tanggal, waktu, kondisi_cuaca, estimasi_serangga, rbt, created_by, image_url, \
     created_at, updated_at";

/// Report service for field submissions
#[derive(Clone)]
pub struct ReportService {
    db: PgPool,
}

impl ReportService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Newest reports first
    pub async fn list_recent(&self, limit: i64) -> AppResult<Vec<ReportRecord>> {
        let rows = sqlx::query_as::<_, ReportRow>(&format!(
            "SELECT {} FROM reports ORDER BY created_at DESC LIMIT $1",
            REPORT_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(ReportRecord::from).collect())
    }

    /// Every stored report, newest first; input to search, grouping and export
    pub async fn list_all(&self) -> AppResult<Vec<ReportRecord>> {
        let rows = sqlx::query_as::<_, ReportRow>(&format!(
            "SELECT {} FROM reports ORDER BY created_at DESC",
            REPORT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(ReportRecord::from).collect())
    }

    pub async fn get(&self, id: Uuid) -> AppResult<ReportRecord> {
        self.fetch_row(id).await.map(ReportRecord::from)
    }

    async fn fetch_row(&self, id: Uuid) -> AppResult<ReportRow> {
        sqlx::query_as::<_, ReportRow>(&format!(
            "SELECT {} FROM reports WHERE id = $1",
            REPORT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Report".to_string()))
    }

    /// Store a validated and prepared submission
    pub async fn create(
        &self,
        submission: ReportSubmission,
        created_by: CreatedBy,
        image_url: Option<String>,
    ) -> AppResult<ReportRecord> {
        let created_by = serde_json::to_value(&created_by)
            .map_err(|e| AppError::Internal(format!("Cannot encode author: {}", e)))?;

        let row = sqlx::query_as::<_, ReportRow>(&format!(
            r#"
            INSERT INTO reports (
                id, kebun, afdeling, blok, tahuntanam, koordinat_x, koordinat_y,
                nomor_pp, tanggal, waktu, kondisi_cuaca, estimasi_serangga, rbt,
                created_by, image_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&submission.kebun)
        .bind(&submission.afdeling)
        .bind(&submission.blok)
        .bind(&submission.tahuntanam)
        .bind(submission.koordinat_x)
        .bind(submission.koordinat_y)
        .bind(series_number(submission.nomor_pp)?)
        .bind(Value::String(submission.tanggal))
        .bind(Value::String(submission.waktu))
        .bind(&submission.kondisi_cuaca)
        .bind(submission.estimasi_serangga)
        .bind(submission.rbt)
        .bind(created_by)
        .bind(image_url)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            "Report {} stored for {}/{}/{}",
            row.id,
            row.kebun,
            row.afdeling,
            row.blok
        );
        Ok(row.into())
    }

    /// Apply an administrator's partial update
    pub async fn update(
        &self,
        id: Uuid,
        patch: ReportPatch,
        hierarchy: &LocationHierarchy,
        zone: &DisplayZone,
        image_url: Option<String>,
    ) -> AppResult<ReportRecord> {
        let current = self.fetch_row(id).await?;
        let merged = merge_patch(current, patch, hierarchy, zone, image_url)?;

        let row = sqlx::query_as::<_, ReportRow>(&format!(
            r#"
            UPDATE reports SET
                kebun = $2, afdeling = $3, blok = $4, tahuntanam = $5,
                koordinat_x = $6, koordinat_y = $7, nomor_pp = $8,
                tanggal = $9, waktu = $10, kondisi_cuaca = $11,
                estimasi_serangga = $12, rbt = $13, image_url = $14,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(id)
        .bind(&merged.kebun)
        .bind(&merged.afdeling)
        .bind(&merged.blok)
        .bind(&merged.tahuntanam)
        .bind(merged.koordinat_x)
        .bind(merged.koordinat_y)
        .bind(merged.nomor_pp)
        .bind(&merged.tanggal)
        .bind(&merged.waktu)
        .bind(&merged.kondisi_cuaca)
        .bind(merged.estimasi_serangga)
        .bind(merged.rbt)
        .bind(&merged.image_url)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Report".to_string()))?;

        tracing::info!("Report {} updated", id);
        Ok(row.into())
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Report".to_string()));
        }

        tracing::info!("Report {} deleted", id);
        Ok(())
    }
}

fn series_number(nomor_pp: i64) -> AppResult<i32> {
    i32::try_from(nomor_pp).map_err(|_| AppError::field("nomorPP", "Nomor PP harus antara 1 dan 35"))
}

/// Fold a patch into a stored row. A changed location re-reads the planting
/// year from the hierarchy unless the patch sets one; a bare `HH:MM` time is
/// composed with the patched or stored date.
pub(crate) fn merge_patch(
    mut row: ReportRow,
    patch: ReportPatch,
    hierarchy: &LocationHierarchy,
    zone: &DisplayZone,
    image_url: Option<String>,
) -> AppResult<ReportRow> {
    let location_changed = [
        (&patch.kebun, &row.kebun),
        (&patch.afdeling, &row.afdeling),
        (&patch.blok, &row.blok),
    ]
    .iter()
    .any(|(new, old)| new.as_deref().map_or(false, |n| n != old.as_str()));

    if let Some(kebun) = patch.kebun {
        row.kebun = kebun;
    }
    if let Some(afdeling) = patch.afdeling {
        row.afdeling = afdeling;
    }
    if let Some(blok) = patch.blok {
        row.blok = blok;
    }
    if patch.tahuntanam.is_some() {
        row.tahuntanam = patch.tahuntanam;
    } else if location_changed {
        row.tahuntanam = hierarchy
            .planting_year_for(&row.kebun, &row.afdeling, &row.blok)
            .map(str::to_string);
    }

    if patch.koordinat_x.is_some() || patch.koordinat_y.is_some() {
        row.koordinat_x = patch.koordinat_x.map(round_coordinate);
        row.koordinat_y = patch.koordinat_y.map(round_coordinate);
    }
    if let Some(nomor_pp) = patch.nomor_pp {
        row.nomor_pp = series_number(nomor_pp)?;
    }
    if let Some(estimasi) = patch.estimasi_serangga {
        row.estimasi_serangga = estimasi;
    }
    if let Some(kondisi) = patch.kondisi_cuaca {
        row.kondisi_cuaca = kondisi;
    }
    if patch.rbt.is_some() {
        row.rbt = patch.rbt;
    }

    let new_tanggal = patch.tanggal.clone();
    if let Some(tanggal) = patch.tanggal {
        row.tanggal = Value::String(tanggal);
    }
    if let Some(waktu) = patch.waktu {
        let waktu = if waktu.contains('T') {
            waktu
        } else {
            let tanggal = match new_tanggal {
                Some(tanggal) => tanggal,
                None => normalize_date(&DateInput::classify(&row.tanggal), zone)
                    .map_err(|e| AppError::field("tanggal", e.date_message()))?
                    .to_iso_date(),
            };
            compose_waktu(&tanggal, &waktu).map_err(|message| AppError::field("waktu", message))?
        };
        row.waktu = Value::String(waktu);
    }

    if image_url.is_some() {
        row.image_url = image_url;
    }

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn hierarchy() -> LocationHierarchy {
        LocationHierarchy::build(&[vec![json!({
            "kebun": "1KSD",
            "afdelings": [
                { "afdeling": "A", "blocks": [{ "blok": "1", "tahuntanam": "2010" }] },
                { "afdeling": "B", "blocks": [{ "blok": "7", "tahuntanam": "2016" }] }
            ]
        })]])
    }

    fn stored() -> ReportRow {
        ReportRow {
            id: Uuid::new_v4(),
            kebun: "1KSD".into(),
            afdeling: "A".into(),
            blok: "1".into(),
            tahuntanam: Some("2010".into()),
            koordinat_x: Some(99.5),
            koordinat_y: Some(2.5),
            nomor_pp: 3,
            tanggal: json!({ "_seconds": 1684108800, "_nanoseconds": 0 }),
            waktu: json!("2023-05-15T08:30:00"),
            kondisi_cuaca: "Cerah".into(),
            estimasi_serangga: 100,
            rbt: None,
            created_by: None,
            image_url: Some("/media/old.png".into()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_merge_relocates_and_refills_planting_year() {
        let patch = ReportPatch {
            afdeling: Some("B".into()),
            blok: Some("7".into()),
            ..Default::default()
        };
        let row = merge_patch(stored(), patch, &hierarchy(), &DisplayZone::wib(), None).unwrap();
        assert_eq!(row.afdeling, "B");
        assert_eq!(row.tahuntanam.as_deref(), Some("2016"));
        assert_eq!(row.image_url.as_deref(), Some("/media/old.png"));
    }

    #[test]
    fn test_merge_keeps_planting_year_when_location_unchanged() {
        let patch = ReportPatch {
            kebun: Some("1KSD".into()),
            estimasi_serangga: Some(50),
            ..Default::default()
        };
        let mut current = stored();
        current.tahuntanam = Some("2011".into());
        let row = merge_patch(current, patch, &hierarchy(), &DisplayZone::wib(), None).unwrap();
        assert_eq!(row.tahuntanam.as_deref(), Some("2011"));
        assert_eq!(row.estimasi_serangga, 50);
    }

    #[test]
    fn test_merge_composes_time_with_stored_date() {
        let patch = ReportPatch {
            waktu: Some("10:15".into()),
            ..Default::default()
        };
        let row = merge_patch(stored(), patch, &hierarchy(), &DisplayZone::wib(), None).unwrap();
        // 1684108800 is 2023-05-15 00:00 UTC, 07:00 WIB
        assert_eq!(row.waktu, json!("2023-05-15T10:15:00"));
    }

    #[test]
    fn test_merge_composes_time_with_patched_date() {
        let patch = ReportPatch {
            tanggal: Some("2023-06-01".into()),
            waktu: Some("06:00".into()),
            ..Default::default()
        };
        let row = merge_patch(stored(), patch, &hierarchy(), &DisplayZone::wib(), None).unwrap();
        assert_eq!(row.tanggal, json!("2023-06-01"));
        assert_eq!(row.waktu, json!("2023-06-01T06:00:00"));
    }

    #[test]
    fn test_merge_rejects_bad_time() {
        let patch = ReportPatch {
            waktu: Some("6 pagi".into()),
            ..Default::default()
        };
        let err = merge_patch(stored(), patch, &hierarchy(), &DisplayZone::wib(), None).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "waktu"));
    }

    #[test]
    fn test_merge_rounds_coordinates_and_swaps_image() {
        let patch = ReportPatch {
            koordinat_x: Some(100.1234567),
            koordinat_y: Some(-1.0000004),
            ..Default::default()
        };
        let row = merge_patch(
            stored(),
            patch,
            &hierarchy(),
            &DisplayZone::wib(),
            Some("/media/new.png".into()),
        )
        .unwrap();
        assert_eq!(row.koordinat_x, Some(100.123457));
        assert_eq!(row.koordinat_y, Some(-1.0));
        assert_eq!(row.image_url.as_deref(), Some("/media/new.png"));
    }
}
