//! Location details for a picked map position

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use shared::{validate_coordinates, ApiResponse};

use crate::error::{AppError, AppResult};
use crate::external::LocationDetails;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub lat: f64,
    pub lng: f64,
}

/// Administrative areas and elevation; upstream failures yield placeholders
pub async fn location_details(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> AppResult<Json<ApiResponse<LocationDetails>>> {
    validate_coordinates(Some(query.lng), Some(query.lat))
        .map_err(|message| AppError::field("koordinat", message))?;

    let details = state.geocoder.location_details(query.lat, query.lng).await;
    Ok(Json(ApiResponse::ok(details)))
}
