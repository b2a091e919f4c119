//! Route definitions for the Hatch & Carry reporting server

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use crate::{
    handlers,
    middleware::{auth_middleware, require_admin},
    AppState,
};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - field reports
        .nest("/reports", report_routes(state.clone()))
        // Protected routes - estate reference data
        .nest("/reference", reference_routes(state.clone()))
        // Protected routes - estate asset dashboard
        .nest("/dashboard", dashboard_routes(state.clone()))
        // Protected routes - reverse geocoding
        .route(
            "/location-details",
            get(handlers::location_details)
                .route_layer(middleware::from_fn_with_state(state, auth_middleware)),
        )
}

/// Field report routes (protected; edits and export are admin only)
fn report_routes(state: AppState) -> Router<AppState> {
    let admin_edits = put(handlers::update_report)
        .delete(handlers::delete_report)
        .route_layer(middleware::from_fn(require_admin));

    Router::new()
        .route("/", get(handlers::list_reports).post(handlers::create_report))
        .route("/search", get(handlers::search_reports))
        .route("/grouped", get(handlers::grouped_reports))
        .route("/summary", get(handlers::report_summary))
        .route(
            "/export",
            get(handlers::export_reports).route_layer(middleware::from_fn(require_admin)),
        )
        .route("/:report_id", get(handlers::get_report).merge(admin_edits))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Estate catalog and location cascade routes (protected)
fn reference_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/kebun", get(handlers::list_kebun))
        .route("/kebun/:kebun", get(handlers::get_kebun))
        .route("/kebun/:kebun/afdelings", get(handlers::list_afdelings))
        .route(
            "/kebun/:kebun/afdelings/:afdeling/blocks",
            get(handlers::list_blocks),
        )
        .route(
            "/kebun/:kebun/afdelings/:afdeling/blocks/:blok",
            get(handlers::get_planting_year),
        )
        .route("/weather", get(handlers::list_weather))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Dashboard routes (protected)
fn dashboard_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/summary", get(handlers::dashboard_summary))
        .route("/houses", get(handlers::dashboard_houses))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
