//! Field report HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    apply_filter, filter_options, group_by_location, map_bounds, prepare_submission, summarize,
    year_options, ApiResponse, FilterOptions, FilterQuery, FilterSpec, LocationGroups, MapBounds,
    ReportPatch, ReportRecord, ReportSubmission, ReportSummary,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::{export_file_name, export_to_csv, ExportRow, ReportService};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

/// Reports grouped for the map page
#[derive(Debug, Serialize)]
pub struct GroupedReports {
    pub total: usize,
    pub bounds: Option<MapBounds>,
    pub groups: LocationGroups,
}

/// Headline numbers plus the drop-down values for the list page
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: ReportSummary,
    pub options: FilterOptions,
    pub years: Vec<i32>,
}

/// Stored reports matching a filter query, newest first
async fn filtered_reports(state: &AppState, query: FilterQuery) -> AppResult<Vec<ReportRecord>> {
    let spec = FilterSpec::from(query);
    let reports = ReportService::new(state.db.clone()).list_all().await?;
    let filtered = apply_filter(&reports, &spec, &state.zone);

    tracing::debug!("Filter {:?} kept {} of {} reports", spec, filtered.len(), reports.len());
    Ok(filtered)
}

/// Most recent reports
pub async fn list_reports(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    let service = ReportService::new(state.db.clone());
    let limit = state.config.reports.clamp_limit(query.limit);

    match service.list_recent(limit).await {
        Ok(reports) => (StatusCode::OK, Json(ApiResponse::ok(reports))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_report(
    State(state): State<AppState>,
    Path(report_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ReportService::new(state.db.clone());

    match service.get(report_id).await {
        Ok(report) => (StatusCode::OK, Json(ApiResponse::ok(report))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Submit a new field report
pub async fn create_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<ReportSubmission>,
) -> AppResult<Response> {
    input.validate()?;
    let mut submission = prepare_submission(input, &state.hierarchy)
        .map_err(|e| AppError::field(e.field, e.message))?;

    let image_url = match submission.image.take() {
        Some(data_url) if !data_url.is_empty() => Some(state.media.save_data_url(&data_url).await?),
        _ => None,
    };

    let service = ReportService::new(state.db.clone());
    let report = service
        .create(submission, user.created_by(), image_url)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(report).with_message("Laporan berhasil disimpan")),
    )
        .into_response())
}

/// Partial update of a report (admin)
pub async fn update_report(
    State(state): State<AppState>,
    Path(report_id): Path<Uuid>,
    Json(mut patch): Json<ReportPatch>,
) -> AppResult<Response> {
    patch.validate()?;

    let image_url = match patch.image.take() {
        Some(data_url) if !data_url.is_empty() => Some(state.media.save_data_url(&data_url).await?),
        _ => None,
    };

    let service = ReportService::new(state.db.clone());
    let report = service
        .update(report_id, patch, &state.hierarchy, &state.zone, image_url)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::ok(report).with_message("Laporan berhasil diperbarui")),
    )
        .into_response())
}

/// Delete a report (admin)
pub async fn delete_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(report_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ReportService::new(state.db.clone());

    match service.delete(report_id).await {
        Ok(()) => {
            tracing::info!("Report {} deleted by {}", report_id, user.user_id);
            (
                StatusCode::OK,
                Json(ApiResponse::ok(serde_json::Value::Null).with_message("Laporan berhasil dihapus")),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Reports matching the list page filter
pub async fn search_reports(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> AppResult<Json<ApiResponse<Vec<ReportRecord>>>> {
    let reports = filtered_reports(&state, query).await?;
    Ok(Json(ApiResponse::ok(reports)))
}

/// Filtered reports bucketed by kebun, afdeling and blok for the map page
pub async fn grouped_reports(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> AppResult<Json<ApiResponse<GroupedReports>>> {
    let reports = filtered_reports(&state, query).await?;
    let groups = group_by_location(&reports);

    Ok(Json(ApiResponse::ok(GroupedReports {
        total: groups.total(),
        bounds: map_bounds(&reports),
        groups,
    })))
}

pub async fn report_summary(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> AppResult<Json<ApiResponse<SummaryResponse>>> {
    let reports = filtered_reports(&state, query).await?;
    let current_year = Utc::now().with_timezone(&state.zone.offset()).year();

    Ok(Json(ApiResponse::ok(SummaryResponse {
        summary: summarize(&reports),
        options: filter_options(&reports),
        years: year_options(current_year),
    })))
}

/// Filtered reports as a CSV attachment (admin)
pub async fn export_reports(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> AppResult<Response> {
    let reports = filtered_reports(&state, query).await?;
    let rows: Vec<ExportRow> = reports
        .iter()
        .map(|r| ExportRow::from_record(r, &state.zone))
        .collect();
    let csv = export_to_csv(&rows)?;

    let today = Utc::now().with_timezone(&state.zone.offset()).date_naive();
    let disposition = format!("attachment; filename=\"{}\"", export_file_name(today));

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}
