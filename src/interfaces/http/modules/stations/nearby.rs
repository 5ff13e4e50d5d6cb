//! `POST /api/v1/stations/nearby`
//!
//! Keeps the proxy's own wire shape instead of the `ApiResponse` envelope:
//! `{status, results, count}` on success, `{status, results: [], count: 0,
//! message}` with 200 when the upstream answered without results, and
//! `{error, message}` with 500 when the upstream could not be reached.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::dto::StationDto;
use crate::application::nearby::NO_STATIONS_MESSAGE;
use crate::application::ports::{PlacesError, STATUS_OK, STATUS_ZERO_RESULTS};
use crate::application::{NearbyOutcome, NearbyService};
use crate::domain::geo::Coordinates;
use crate::domain::station::StationWithConnectors;

/// Upper bound the places backend accepts
pub const MAX_RADIUS_M: u32 = 50_000;

#[derive(Clone)]
pub struct NearbyHandlerState {
    pub nearby: Arc<NearbyService>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct NearbyRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Metres, default 20000
    pub radius: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NearbyResponse {
    pub status: String,
    pub results: Vec<StationDto>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Local stations within the radius when the upstream failed
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fallback: Vec<StationDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NearbyErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fallback: Vec<StationDto>,
}

impl NearbyErrorResponse {
    fn bad_request(error: impl Into<String>) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(Self {
                error: error.into(),
                message: None,
                fallback: Vec::new(),
            }),
        )
            .into_response()
    }
}

fn fallback_dtos(fallback: Vec<(StationWithConnectors, f64)>) -> Vec<StationDto> {
    fallback
        .into_iter()
        .map(|(s, d)| StationDto::with_distance(s, Some(d)))
        .collect()
}

/// Render an outcome in the proxy's wire shape
pub fn outcome_response(outcome: NearbyOutcome) -> Response {
    match outcome {
        NearbyOutcome::Found(stations) => {
            let results: Vec<StationDto> = stations.into_iter().map(StationDto::from).collect();
            Json(NearbyResponse {
                status: STATUS_OK.to_string(),
                count: results.len(),
                results,
                message: None,
                fallback: Vec::new(),
            })
            .into_response()
        }
        NearbyOutcome::Empty => Json(NearbyResponse {
            status: STATUS_ZERO_RESULTS.to_string(),
            results: Vec::new(),
            count: 0,
            message: Some(NO_STATIONS_MESSAGE.to_string()),
            fallback: Vec::new(),
        })
        .into_response(),
        NearbyOutcome::Failed {
            error: PlacesError::Upstream { status, message },
            fallback,
        } => Json(NearbyResponse {
            status,
            results: Vec::new(),
            count: 0,
            message: Some(message),
            fallback: fallback_dtos(fallback),
        })
        .into_response(),
        NearbyOutcome::Failed {
            error: PlacesError::Transport(message),
            fallback,
        } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(NearbyErrorResponse {
                error: "Internal server error".to_string(),
                message: Some(message),
                fallback: fallback_dtos(fallback),
            }),
        )
            .into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/stations/nearby",
    tag = "Stations",
    request_body = NearbyRequest,
    responses(
        (status = 200, description = "Search finished; `status` tells OK, ZERO_RESULTS or the upstream error", body = NearbyResponse),
        (status = 400, description = "Latitude and longitude are required", body = NearbyErrorResponse),
        (status = 500, description = "Places backend unreachable", body = NearbyErrorResponse)
    )
)]
pub async fn nearby_stations(
    State(state): State<NearbyHandlerState>,
    Json(request): Json<NearbyRequest>,
) -> Response {
    let (Some(latitude), Some(longitude)) = (request.latitude, request.longitude) else {
        return NearbyErrorResponse::bad_request("Latitude and longitude are required");
    };
    let origin = match Coordinates::new(latitude, longitude) {
        Ok(origin) => origin,
        Err(e) => return NearbyErrorResponse::bad_request(e.to_string()),
    };
    if let Some(radius) = request.radius {
        if radius == 0 || radius > MAX_RADIUS_M {
            return NearbyErrorResponse::bad_request(format!(
                "radius must be between 1 and {} metres",
                MAX_RADIUS_M
            ));
        }
    }

    outcome_response(state.nearby.search(origin, request.radius).await)
}
