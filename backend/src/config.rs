//! Configuration management for the Hatch & Carry reporting server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with HC__ prefix (e.g. HC__DATABASE__URL)

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::DisplayZone;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    pub server: ServerConfig,

    pub database: DatabaseConfig,

    /// Verification of tokens issued by the identity service
    pub jwt: JwtConfig,

    /// Estate reference files
    pub reference: ReferenceConfig,

    pub display: DisplayConfig,

    /// Uploaded report photos
    pub media: MediaConfig,

    /// Reverse geocoding and elevation lookups
    pub geocoding: GeocodingConfig,

    pub reports: ReportsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Shared HS256 secret
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReferenceConfig {
    /// Directory of estate → division → block JSON arrays, one file per region
    pub data_dir: String,

    /// Per-house asset rows for the dashboard
    pub assets_file: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    /// Whole hours east of UTC used for dates and times (7 = WIB)
    pub utc_offset_hours: i32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MediaConfig {
    pub dir: String,
    pub public_base_url: String,
    pub max_image_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocodingConfig {
    pub nominatim_url: String,
    pub elevation_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportsConfig {
    pub default_limit: i64,
    pub max_limit: i64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("HC_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            .set_default("environment", environment.clone())?
            .set_default("server.port", 8080)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("reference.data_dir", "data/reference")?
            .set_default("display.utc_offset_hours", 7)?
            .set_default("media.dir", "media")?
            .set_default("media.public_base_url", "/media")?
            .set_default("media.max_image_bytes", 5 * 1024 * 1024)?
            .set_default(
                "geocoding.nominatim_url",
                "https://nominatim.openstreetmap.org/reverse",
            )?
            .set_default(
                "geocoding.elevation_url",
                "https://api.open-elevation.com/api/v1/lookup",
            )?
            .set_default("geocoding.user_agent", "hatch-carry-monitoring/0.1")?
            .set_default("geocoding.timeout_secs", 10)?
            .set_default("reports.default_limit", 28)?
            .set_default("reports.max_limit", 500)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (HC__ prefix)
            .add_source(
                Environment::with_prefix("HC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Zone used to render and compare report dates
    pub fn display_zone(&self) -> Result<DisplayZone, ConfigError> {
        DisplayZone::from_offset_hours(self.display.utc_offset_hours).ok_or_else(|| {
            ConfigError::Message(format!(
                "display.utc_offset_hours must be between -12 and 14, got {}",
                self.display.utc_offset_hours
            ))
        })
    }
}

impl ReportsConfig {
    /// Requested page size, defaulted and clamped to `1..=max_limit`
    pub fn clamp_limit(&self, requested: Option<i64>) -> i64 {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1))
    }
}
