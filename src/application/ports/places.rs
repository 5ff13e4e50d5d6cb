use async_trait::async_trait;
use thiserror::Error;

use crate::domain::geo::Coordinates;

pub const STATUS_OK: &str = "OK";
pub const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyQuery {
    pub origin: Coordinates,
    /// Search radius in metres
    pub radius_m: u32,
}

/// One place as returned by the nearby search
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceResult {
    pub place_id: String,
    pub name: String,
    pub vicinity: String,
    pub latitude: f64,
    pub longitude: f64,
    pub business_status: Option<String>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<i32>,
}

/// Upstream answer before interpretation
#[derive(Debug, Clone, PartialEq)]
pub struct PlacesResponse {
    pub status: String,
    pub results: Vec<PlaceResult>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Error)]
pub enum PlacesError {
    /// The request never produced a readable answer
    #[error("places request failed: {0}")]
    Transport(String),
    /// The service answered with a non-OK status
    #[error("places search returned {status}: {message}")]
    Upstream { status: String, message: String },
}

#[async_trait]
pub trait PlacesClient: Send + Sync {
    async fn nearby_search(&self, query: NearbyQuery) -> Result<PlacesResponse, PlacesError>;
}
