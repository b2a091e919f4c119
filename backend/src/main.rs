//! Hatch & Carry field reporting - Backend Server
//!
//! Collects pest release reports from estate field staff and serves the
//! estate reference data, filtered views and exports used by the web client.

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use shared::{DisplayZone, EstateAsset, LocationHierarchy};
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod external;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;

pub use config::Config;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    /// Estate → division → block index, read-only after startup
    pub hierarchy: Arc<LocationHierarchy>,
    pub assets: Arc<Vec<EstateAsset>>,
    pub zone: DisplayZone,
    pub geocoder: external::GeocodingClient,
    pub media: services::MediaStore,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hc_server=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;
    let zone = config.display_zone()?;

    tracing::info!("Starting Hatch & Carry Reporting Server");
    tracing::info!("Environment: {}", config.environment);

    // Reference data is loaded once and shared read-only
    let hierarchy = services::load_hierarchy(&config.reference.data_dir).await?;
    let assets = services::load_assets(config.reference.assets_file.as_deref()).await?;

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    // Run migrations in development
    if config.environment == "development" {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    let state = AppState {
        db: db_pool,
        geocoder: external::GeocodingClient::new(&config.geocoding)?,
        media: services::MediaStore::new(&config.media),
        hierarchy: Arc::new(hierarchy),
        assets: Arc::new(assets),
        zone,
        config: Arc::new(config.clone()),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let media_route = state.config.media.public_base_url.clone();
    let media_files = ServeDir::new(&state.config.media.dir);
    // Photos arrive base64 encoded inside the JSON body
    let body_limit = state.config.media.max_image_bytes / 3 * 4 + 64 * 1024;

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api", routes::api_routes(state.clone()))
        .nest_service(&media_route, media_files)
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Hatch & Carry Reporting API"
}
