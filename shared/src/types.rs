//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Placeholder used when a location field is missing
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// Geographic position in decimal degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Bounding box of a set of points
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MapBounds {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl MapBounds {
    /// Smallest box holding every point, `None` for no points
    pub fn from_points<I: IntoIterator<Item = GeoPoint>>(points: I) -> Option<Self> {
        points.into_iter().fold(None, |bounds, p| {
            Some(match bounds {
                None => MapBounds {
                    south_west: p,
                    north_east: p,
                },
                Some(b) => MapBounds {
                    south_west: GeoPoint::new(b.south_west.lat.min(p.lat), b.south_west.lng.min(p.lng)),
                    north_east: GeoPoint::new(b.north_east.lat.max(p.lat), b.north_east.lng.max(p.lng)),
                },
            })
        })
    }

    pub fn contains(&self, p: GeoPoint) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&p.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&p.lng)
    }
}

/// Response envelope read by the web client as `response.data.data`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
