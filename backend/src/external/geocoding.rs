//! Reverse geocoding and elevation client
//!
//! Address details come from Nominatim (OpenStreetMap), elevation from the
//! Open Elevation API. Lookups never fail from the caller's point of view:
//! an unreachable or unreadable upstream yields the "unknown" placeholders.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::GeocodingConfig;
use crate::error::{AppError, AppResult};

/// Placeholder for an administrative area that could not be resolved
pub const UNKNOWN_PLACE: &str = "Tidak diketahui";

/// Administrative areas and elevation of a map position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDetails {
    pub kota: String,
    pub kecamatan: String,
    pub kabupaten: String,
    pub provinsi: String,
    /// Metres above sea level
    pub elevation: f64,
}

impl LocationDetails {
    pub fn unknown() -> Self {
        Self::from_address(&NominatimAddress::default(), 0.0)
    }

    /// Pick the most specific available name for each level
    pub fn from_address(address: &NominatimAddress, elevation: f64) -> Self {
        let first = |candidates: &[&Option<String>]| {
            candidates
                .iter()
                .find_map(|c| c.as_deref().filter(|s| !s.is_empty()))
                .unwrap_or(UNKNOWN_PLACE)
                .to_string()
        };

        Self {
            kota: first(&[&address.city, &address.town, &address.village]),
            kecamatan: first(&[&address.suburb, &address.county]),
            kabupaten: first(&[&address.state_district]),
            provinsi: first(&[&address.state]),
            elevation,
        }
    }
}

/// Address block of a Nominatim reverse lookup
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NominatimAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub suburb: Option<String>,
    pub county: Option<String>,
    pub state_district: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    #[serde(default)]
    address: NominatimAddress,
}

#[derive(Debug, Deserialize)]
struct ElevationResponse {
    #[serde(default)]
    results: Vec<ElevationResult>,
}

#[derive(Debug, Deserialize)]
struct ElevationResult {
    elevation: Option<f64>,
}

/// Geocoding API client
#[derive(Clone)]
pub struct GeocodingClient {
    client: Client,
    nominatim_url: String,
    elevation_url: String,
}

impl GeocodingClient {
    pub fn new(config: &GeocodingConfig) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            nominatim_url: config.nominatim_url.clone(),
            elevation_url: config.elevation_url.clone(),
        })
    }

    /// Address and elevation for a position, with placeholders on failure
    pub async fn location_details(&self, lat: f64, lng: f64) -> LocationDetails {
        let (address, elevation) =
            tokio::join!(self.reverse_geocode(lat, lng), self.elevation(lat, lng));

        let address = address.unwrap_or_else(|e| {
            tracing::warn!("Reverse geocoding failed for {},{}: {}", lat, lng, e);
            NominatimAddress::default()
        });
        let elevation = elevation.unwrap_or_else(|e| {
            tracing::warn!("Elevation lookup failed for {},{}: {}", lat, lng, e);
            0.0
        });

        LocationDetails::from_address(&address, elevation)
    }

    async fn reverse_geocode(&self, lat: f64, lng: f64) -> AppResult<NominatimAddress> {
        let response = self
            .client
            .get(&self.nominatim_url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", lat.to_string()),
                ("lon", lng.to_string()),
                ("zoom", "18".to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Nominatim error: {}",
                response.status()
            )));
        }

        let data: NominatimResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse Nominatim response: {}", e)))?;

        Ok(data.address)
    }

    async fn elevation(&self, lat: f64, lng: f64) -> AppResult<f64> {
        let response = self
            .client
            .get(&self.elevation_url)
            .query(&[("locations", format!("{},{}", lat, lng))])
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Elevation request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Elevation API error: {}",
                response.status()
            )));
        }

        let data: ElevationResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse elevation response: {}", e)))?;

        Ok(data
            .results
            .first()
            .and_then(|r| r.elevation)
            .unwrap_or(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_fallback_chain() {
        let address = NominatimAddress {
            village: Some("Sei Daun".into()),
            county: Some("Torgamba".into()),
            state: Some("Sumatera Utara".into()),
            city: Some(String::new()),
            ..Default::default()
        };
        let details = LocationDetails::from_address(&address, 42.0);
        assert_eq!(details.kota, "Sei Daun");
        assert_eq!(details.kecamatan, "Torgamba");
        assert_eq!(details.kabupaten, UNKNOWN_PLACE);
        assert_eq!(details.provinsi, "Sumatera Utara");
        assert_eq!(details.elevation, 42.0);
    }

    #[test]
    fn test_unknown_placeholders() {
        let details = LocationDetails::unknown();
        assert_eq!(details.kota, UNKNOWN_PLACE);
        assert_eq!(details.provinsi, UNKNOWN_PLACE);
        assert_eq!(details.elevation, 0.0);
    }

    #[test]
    fn test_unreachable_upstream_falls_back() {
        let client = GeocodingClient::new(&GeocodingConfig {
            nominatim_url: "http://127.0.0.1:1/reverse".into(),
            elevation_url: "http://127.0.0.1:1/lookup".into(),
            user_agent: "test".into(),
            timeout_secs: 1,
        })
        .unwrap();

        let details = tokio_test::block_on(client.location_details(2.5, 99.5));
        assert_eq!(details, LocationDetails::unknown());
    }
}
