//! Estate reference HTTP handlers: catalog and the location cascade

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use shared::{kebun_detail, ApiResponse, KebunDetail, KebunInfo, WeatherCondition, KEBUN_CATALOG};

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PlantingYear {
    pub kebun: String,
    pub afdeling: String,
    pub blok: String,
    pub tahuntanam: Option<String>,
}

pub async fn list_kebun() -> Json<ApiResponse<&'static [KebunInfo]>> {
    Json(ApiResponse::ok(KEBUN_CATALOG))
}

/// Catalog entry; codes outside the catalog come back as `Unknown`
pub async fn get_kebun(Path(kebun): Path<String>) -> Json<ApiResponse<KebunDetail>> {
    Json(ApiResponse::ok(kebun_detail(&kebun)))
}

pub async fn list_afdelings(
    State(state): State<AppState>,
    Path(kebun): Path<String>,
) -> Json<ApiResponse<Vec<String>>> {
    Json(ApiResponse::ok(state.hierarchy.divisions_for(&kebun).to_vec()))
}

pub async fn list_blocks(
    State(state): State<AppState>,
    Path((kebun, afdeling)): Path<(String, String)>,
) -> Json<ApiResponse<Vec<String>>> {
    Json(ApiResponse::ok(
        state.hierarchy.blocks_for(&kebun, &afdeling).to_vec(),
    ))
}

/// Planting year for the form's read-only field; `null` when unknown
pub async fn get_planting_year(
    State(state): State<AppState>,
    Path((kebun, afdeling, blok)): Path<(String, String, String)>,
) -> Json<ApiResponse<PlantingYear>> {
    let tahuntanam = state
        .hierarchy
        .planting_year_for(&kebun, &afdeling, &blok)
        .map(str::to_string);

    Json(ApiResponse::ok(PlantingYear {
        kebun,
        afdeling,
        blok,
        tahuntanam,
    }))
}

pub async fn list_weather() -> Json<ApiResponse<Vec<WeatherCondition>>> {
    Json(ApiResponse::ok(WeatherCondition::CHOICES.to_vec()))
}
