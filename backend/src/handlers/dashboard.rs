//! Estate asset dashboard handlers

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde::Serialize;
use shared::{
    district_stats, group_houses, inventory_progress, top_estates_by_area,
    top_estates_by_inventory, ApiResponse, DistrictHouses, DistrictStats, EstateAsset,
    DEFAULT_INVENTORY_TARGET,
};

use crate::AppState;

const TOP_ESTATES: usize = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub districts: Vec<DistrictStats>,
    pub top_by_area: Vec<EstateAsset>,
    pub top_by_inventory: Vec<EstateAsset>,
    pub inventory_target: i64,
    /// Percent of the target, capped at 100
    pub inventory_progress: f64,
}

pub async fn dashboard_summary(State(state): State<AppState>) -> Json<ApiResponse<DashboardSummary>> {
    let assets = state.assets.as_slice();

    Json(ApiResponse::ok(DashboardSummary {
        districts: district_stats(assets),
        top_by_area: top_estates_by_area(assets, TOP_ESTATES),
        top_by_inventory: top_estates_by_inventory(assets, TOP_ESTATES),
        inventory_target: DEFAULT_INVENTORY_TARGET,
        inventory_progress: inventory_progress(assets, DEFAULT_INVENTORY_TARGET),
    }))
}

/// district → estate → house markers for the overview map
pub async fn dashboard_houses(
    State(state): State<AppState>,
) -> Json<ApiResponse<BTreeMap<String, DistrictHouses>>> {
    Json(ApiResponse::ok(group_houses(&state.assets)))
}
