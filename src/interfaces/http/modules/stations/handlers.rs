use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;

use super::dto::{ListStationsQuery, StationDto};
use crate::application::{Proximity, ReviewService, StationQuery, StationService};
use crate::domain::geo::Coordinates;
use crate::domain::station::{ConnectorType, PowerBand, StationFilter};
use crate::interfaces::http::common::{bad_request, domain_error, ApiResponse, ApiResult};
use crate::interfaces::http::modules::reviews::ReviewDto;

#[derive(Clone)]
pub struct StationHandlerState {
    pub stations: Arc<StationService>,
    pub reviews: Arc<ReviewService>,
}

impl ListStationsQuery {
    /// Turn raw query parameters into a typed query, rejecting unknown values
    pub fn to_query(&self) -> Result<StationQuery, String> {
        let connector_type = self
            .connector_type
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::parse::<ConnectorType>)
            .transpose()
            .map_err(|e| e.to_string())?;
        let power_band = self
            .power
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::parse::<PowerBand>)
            .transpose()
            .map_err(|e| e.to_string())?;

        let near = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => {
                let origin = Coordinates::new(lat, lng).map_err(|e| e.to_string())?;
                if let Some(r) = self.radius_km {
                    if r.is_nan() || r <= 0.0 {
                        return Err("radius_km must be positive".to_string());
                    }
                }
                Some(Proximity {
                    origin,
                    radius_km: self.radius_km,
                })
            }
            (None, None) if self.radius_km.is_some() => {
                return Err("radius_km requires lat and lng".to_string())
            }
            (None, None) => None,
            _ => return Err("lat and lng must be given together".to_string()),
        };

        Ok(StationQuery {
            filter: StationFilter {
                connector_type,
                power_band,
                available_only: self.available.unwrap_or(false),
                free_only: self.free_only.unwrap_or(false),
                query: self.q.clone(),
            },
            near,
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/stations",
    tag = "Stations",
    params(ListStationsQuery),
    responses(
        (status = 200, description = "Stations ordered by name, or by distance when lat/lng given", body = ApiResponse<Vec<StationDto>>),
        (status = 400, description = "Unknown filter value or bad coordinates")
    )
)]
pub async fn list_stations(
    State(state): State<StationHandlerState>,
    Query(params): Query<ListStationsQuery>,
) -> ApiResult<Vec<StationDto>> {
    let query = params.to_query().map_err(bad_request)?;
    let listed = state.stations.list(&query).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        listed.into_iter().map(StationDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/{id}",
    tag = "Stations",
    params(("id" = String, Path, description = "Station id")),
    responses(
        (status = 200, description = "Station with connectors", body = ApiResponse<StationDto>),
        (status = 404, description = "Unknown station")
    )
)]
pub async fn get_station(
    State(state): State<StationHandlerState>,
    Path(id): Path<String>,
) -> ApiResult<StationDto> {
    let station = state.stations.get(&id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(station.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/{id}/reviews",
    tag = "Stations",
    params(("id" = String, Path, description = "Station id")),
    responses(
        (status = 200, description = "Reviews, newest first", body = ApiResponse<Vec<ReviewDto>>),
        (status = 404, description = "Unknown station")
    )
)]
pub async fn list_station_reviews(
    State(state): State<StationHandlerState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<ReviewDto>> {
    let reviews = state.reviews.for_station(&id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        reviews.into_iter().map(ReviewDto::from).collect(),
    )))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::application::create_event_bus;
    use crate::application::stations::tests::service_with_catalog;

    async fn state() -> StationHandlerState {
        let (repos, stations) = service_with_catalog().await;
        let reviews = Arc::new(ReviewService::new(repos, stations.clone(), create_event_bus()));
        StationHandlerState { stations, reviews }
    }

    async fn list(params: ListStationsQuery) -> ApiResult<Vec<StationDto>> {
        list_stations(State(state().await), Query(params)).await
    }

    #[tokio::test]
    async fn lists_everything_by_name() {
        let Json(body) = list(ListStationsQuery::default()).await.unwrap();
        let ids: Vec<String> = body.data.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["berlin", "hamburg", "potsdam"]);
    }

    #[tokio::test]
    async fn filters_by_connector_label() {
        let Json(body) = list(ListStationsQuery {
            connector_type: Some("type-2".into()),
            ..Default::default()
        })
        .await
        .unwrap();
        let ids: Vec<String> = body.data.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["berlin", "potsdam"]);
    }

    #[tokio::test]
    async fn distance_sort_and_radius() {
        let Json(body) = list(ListStationsQuery {
            lat: Some(52.39),
            lng: Some(13.06),
            radius_km: Some(50.0),
            ..Default::default()
        })
        .await
        .unwrap();
        let stations = body.data.unwrap();
        let ids: Vec<&str> = stations.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["potsdam", "berlin"]);
        assert!(stations[0].distance_km.unwrap() < 1.0);
    }

    #[tokio::test]
    async fn unknown_power_band_is_400() {
        let (status, _) = list(ListStationsQuery {
            power: Some("warp".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn lone_latitude_is_400() {
        let (status, _) = list(ListStationsQuery {
            lat: Some(52.0),
            ..Default::default()
        })
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_station_is_404() {
        let (status, _) = get_station(State(state().await), Path("nowhere".into()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn station_detail_carries_connector_labels() {
        let Json(body) = get_station(State(state().await), Path("berlin".into()))
            .await
            .unwrap();
        let station = body.data.unwrap();
        let labels: Vec<&str> = station
            .connectors
            .iter()
            .map(|c| c.connector_type.as_str())
            .collect();
        assert_eq!(labels, vec!["CCS", "Type 2"]);
        assert!(station.distance_km.is_none());
    }
}
