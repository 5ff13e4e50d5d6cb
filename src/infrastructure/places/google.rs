//! Google Places "nearby search" client
//!
//! The API key stays on the server; callers only pass coordinates.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::application::ports::{
    NearbyQuery, PlaceResult, PlacesClient, PlacesError, PlacesResponse,
};

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";
const PLACE_TYPE: &str = "gas_station";
const KEYWORD: &str = "electric vehicle charging";

#[derive(Clone)]
pub struct GooglePlacesConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for GooglePlacesConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

pub struct GooglePlacesClient {
    client: Client,
    config: GooglePlacesConfig,
}

impl GooglePlacesClient {
    pub fn new(config: GooglePlacesConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn query_params(&self, query: &NearbyQuery) -> Vec<(&'static str, String)> {
        vec![
            (
                "location",
                format!("{},{}", query.origin.latitude, query.origin.longitude),
            ),
            ("radius", query.radius_m.to_string()),
            ("type", PLACE_TYPE.to_string()),
            ("keyword", KEYWORD.to_string()),
            ("key", self.config.api_key.clone()),
        ]
    }
}

// ── Wire format ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    results: Vec<RawPlace>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPlace {
    place_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    vicinity: String,
    geometry: RawGeometry,
    #[serde(default)]
    business_status: Option<String>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    user_ratings_total: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    location: RawLatLng,
}

#[derive(Debug, Deserialize)]
struct RawLatLng {
    lat: f64,
    lng: f64,
}

fn parse_response(body: &str) -> Result<PlacesResponse, PlacesError> {
    let raw: RawResponse = serde_json::from_str(body)
        .map_err(|e| PlacesError::Transport(format!("invalid places response: {}", e)))?;

    Ok(PlacesResponse {
        status: raw.status.unwrap_or_else(|| "ERROR".to_string()),
        results: raw
            .results
            .into_iter()
            .map(|p| PlaceResult {
                place_id: p.place_id,
                name: p.name,
                vicinity: p.vicinity,
                latitude: p.geometry.location.lat,
                longitude: p.geometry.location.lng,
                business_status: p.business_status,
                rating: p.rating,
                user_ratings_total: p.user_ratings_total,
            })
            .collect(),
        error_message: raw.error_message,
    })
}

#[async_trait]
impl PlacesClient for GooglePlacesClient {
    async fn nearby_search(&self, query: NearbyQuery) -> Result<PlacesResponse, PlacesError> {
        if self.config.api_key.is_empty() {
            warn!("Places API key is not configured");
            return Ok(PlacesResponse {
                status: "REQUEST_DENIED".to_string(),
                results: Vec::new(),
                error_message: Some("Places API key is not configured".to_string()),
            });
        }

        debug!(
            latitude = query.origin.latitude,
            longitude = query.origin.longitude,
            radius_m = query.radius_m,
            "Places nearby search"
        );

        let body = self
            .client
            .get(&self.config.base_url)
            .query(&self.query_params(&query))
            .send()
            .await
            .map_err(|e| PlacesError::Transport(e.to_string()))?
            .text()
            .await
            .map_err(|e| PlacesError::Transport(e.to_string()))?;

        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geo::Coordinates;

    const SAMPLE: &str = r#"{
        "status": "OK",
        "results": [
            {
                "place_id": "ChIJ1",
                "name": "Supercharger",
                "vicinity": "12 High St",
                "geometry": { "location": { "lat": 51.5, "lng": -0.12 } },
                "business_status": "OPERATIONAL",
                "rating": 4.6,
                "user_ratings_total": 88
            },
            {
                "place_id": "ChIJ2",
                "name": "Car park chargers",
                "vicinity": "Market Sq",
                "geometry": { "location": { "lat": 51.6, "lng": -0.1 } }
            }
        ]
    }"#;

    #[test]
    fn parses_nearby_results() {
        let response = parse_response(SAMPLE).unwrap();
        assert_eq!(response.status, "OK");
        assert_eq!(response.results.len(), 2);

        let first = &response.results[0];
        assert_eq!(first.place_id, "ChIJ1");
        assert_eq!(first.vicinity, "12 High St");
        assert_eq!(first.latitude, 51.5);
        assert_eq!(first.business_status.as_deref(), Some("OPERATIONAL"));
        assert_eq!(first.user_ratings_total, Some(88));

        let second = &response.results[1];
        assert_eq!(second.rating, None);
        assert_eq!(second.business_status, None);
    }

    #[test]
    fn error_status_keeps_message() {
        let body = r#"{"status":"REQUEST_DENIED","results":[],"error_message":"bad key"}"#;
        let response = parse_response(body).unwrap();
        assert_eq!(response.status, "REQUEST_DENIED");
        assert_eq!(response.error_message.as_deref(), Some("bad key"));
    }

    #[test]
    fn missing_status_becomes_error() {
        let response = parse_response("{}").unwrap();
        assert_eq!(response.status, "ERROR");
    }

    #[test]
    fn garbage_is_transport_failure() {
        assert!(matches!(
            parse_response("<html>"),
            Err(PlacesError::Transport(_))
        ));
    }

    #[test]
    fn query_carries_search_parameters() {
        let client = GooglePlacesClient::new(GooglePlacesConfig {
            api_key: "k".into(),
            ..Default::default()
        })
        .unwrap();
        let params = client.query_params(&NearbyQuery {
            origin: Coordinates::new(40.7, -74.0).unwrap(),
            radius_m: 20000,
        });
        assert!(params.contains(&("location", "40.7,-74".to_string())));
        assert!(params.contains(&("radius", "20000".to_string())));
        assert!(params.contains(&("type", "gas_station".to_string())));
        assert!(params.contains(&("keyword", "electric vehicle charging".to_string())));
        assert!(params.contains(&("key", "k".to_string())));
    }

    #[tokio::test]
    async fn missing_key_is_request_denied() {
        let client = GooglePlacesClient::new(GooglePlacesConfig::default()).unwrap();
        let response = client
            .nearby_search(NearbyQuery {
                origin: Coordinates::new(0.0, 0.0).unwrap(),
                radius_m: 1000,
            })
            .await
            .unwrap();
        assert_eq!(response.status, "REQUEST_DENIED");
    }
}
