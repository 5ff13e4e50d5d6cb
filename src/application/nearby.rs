//! Nearby-station search through the places backend
//!
//! External results are reshaped into the local station shape. When the
//! backend fails, the local catalog ranked by distance is offered instead.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::ports::{
    NearbyQuery, PlaceResult, PlacesClient, PlacesError, STATUS_OK, STATUS_ZERO_RESULTS,
};
use super::stations::StationService;
use crate::domain::geo::{rank_by_distance, Coordinates};
use crate::domain::station::{Connector, ConnectorType, Station, StationWithConnectors};

pub const DEFAULT_RADIUS_M: u32 = 20_000;
pub const NO_STATIONS_MESSAGE: &str = "No stations found";

const EXTERNAL_PRICE_PER_KWH: f64 = 0.40;
const EXTERNAL_DEFAULT_RATING: f64 = 4.0;
const EXTERNAL_CONNECTOR_KW: f64 = 22.0;
const OPERATIONAL: &str = "OPERATIONAL";

#[derive(Debug)]
pub enum NearbyOutcome {
    Found(Vec<StationWithConnectors>),
    /// The backend answered but has nothing in range
    Empty,
    Failed {
        error: PlacesError,
        /// Local stations within the radius, nearest first
        fallback: Vec<(StationWithConnectors, f64)>,
    },
}

impl NearbyOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Found(_) => "found",
            Self::Empty => "empty",
            Self::Failed {
                error: PlacesError::Transport(_),
                ..
            } => "transport_error",
            Self::Failed { .. } => "upstream_error",
        }
    }
}

/// Map one external place onto the local station shape
pub fn reshape_place(place: PlaceResult, now: DateTime<Utc>) -> StationWithConnectors {
    let connector = Connector {
        id: format!("{}_1", place.place_id),
        station_id: place.place_id.clone(),
        connector_type: ConnectorType::Type2,
        power_output: EXTERNAL_CONNECTOR_KW,
        available: true,
        created_at: now,
    };
    let station = Station {
        available: place.business_status.as_deref() == Some(OPERATIONAL),
        rating: place.rating.unwrap_or(EXTERNAL_DEFAULT_RATING),
        total_reviews: place.user_ratings_total.unwrap_or(0),
        id: place.place_id,
        name: place.name,
        address: place.vicinity,
        latitude: place.latitude,
        longitude: place.longitude,
        price_per_kwh: EXTERNAL_PRICE_PER_KWH,
        created_at: now,
        updated_at: now,
    };
    StationWithConnectors {
        station,
        connectors: vec![connector],
    }
}

pub struct NearbyService {
    places: Arc<dyn PlacesClient>,
    stations: Arc<StationService>,
    default_radius_m: u32,
}

impl NearbyService {
    pub fn new(
        places: Arc<dyn PlacesClient>,
        stations: Arc<StationService>,
        default_radius_m: u32,
    ) -> Self {
        Self {
            places,
            stations,
            default_radius_m,
        }
    }

    pub fn default_radius_m(&self) -> u32 {
        self.default_radius_m
    }

    pub async fn search(&self, origin: Coordinates, radius_m: Option<u32>) -> NearbyOutcome {
        let radius_m = radius_m.unwrap_or(self.default_radius_m);
        let query = NearbyQuery { origin, radius_m };

        let outcome = match self.places.nearby_search(query).await {
            Ok(response) if response.status == STATUS_OK => {
                let now = Utc::now();
                NearbyOutcome::Found(
                    response
                        .results
                        .into_iter()
                        .map(|p| reshape_place(p, now))
                        .collect(),
                )
            }
            Ok(response) if response.status == STATUS_ZERO_RESULTS => NearbyOutcome::Empty,
            Ok(response) => {
                let error = PlacesError::Upstream {
                    message: response
                        .error_message
                        .unwrap_or_else(|| NO_STATIONS_MESSAGE.to_string()),
                    status: response.status,
                };
                self.failed(error, &query).await
            }
            Err(error) => self.failed(error, &query).await,
        };

        metrics::counter!("nearby_search_total", "outcome" => outcome.label()).increment(1);
        info!(
            latitude = origin.latitude,
            longitude = origin.longitude,
            radius_m,
            outcome = outcome.label(),
            "Nearby search finished"
        );
        outcome
    }

    async fn failed(&self, error: PlacesError, query: &NearbyQuery) -> NearbyOutcome {
        warn!(error = %error, "Nearby search failed, falling back to local catalog");

        let fallback = match self.stations.catalog().await {
            Ok(catalog) => rank_by_distance(
                catalog,
                &query.origin,
                query.radius_m as f64 / 1000.0,
                |s| s.station.coordinates(),
            ),
            Err(e) => {
                warn!(error = %e, "Local catalog unavailable for fallback");
                Vec::new()
            }
        };

        NearbyOutcome::Failed { error, fallback }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::application::ports::PlacesResponse;
    use crate::application::stations::tests::service_with_catalog;

    /// Replays one canned answer and remembers the queries it saw
    pub(crate) struct FakePlaces {
        answer: Result<PlacesResponse, PlacesError>,
        pub seen: Mutex<Vec<NearbyQuery>>,
    }

    impl FakePlaces {
        pub(crate) fn new(answer: Result<PlacesResponse, PlacesError>) -> Self {
            Self {
                answer,
                seen: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn status(status: &str, results: Vec<PlaceResult>) -> Self {
            Self::new(Ok(PlacesResponse {
                status: status.into(),
                results,
                error_message: None,
            }))
        }
    }

    #[async_trait]
    impl PlacesClient for FakePlaces {
        async fn nearby_search(&self, query: NearbyQuery) -> Result<PlacesResponse, PlacesError> {
            self.seen.lock().unwrap().push(query);
            self.answer.clone()
        }
    }

    pub(crate) fn place(id: &str, status: Option<&str>) -> PlaceResult {
        PlaceResult {
            place_id: id.into(),
            name: format!("Place {}", id),
            vicinity: "Somewhere 1".into(),
            latitude: 52.5,
            longitude: 13.4,
            business_status: status.map(String::from),
            rating: None,
            user_ratings_total: None,
        }
    }

    fn berlin() -> Coordinates {
        Coordinates::new(52.52, 13.405).unwrap()
    }

    #[test]
    fn reshape_applies_defaults() {
        let now = Utc::now();
        let s = reshape_place(place("abc", Some("OPERATIONAL")), now);
        assert_eq!(s.station.id, "abc");
        assert_eq!(s.station.address, "Somewhere 1");
        assert_eq!(s.station.price_per_kwh, 0.40);
        assert_eq!(s.station.rating, 4.0);
        assert_eq!(s.station.total_reviews, 0);
        assert!(s.station.available);
        assert_eq!(s.connectors.len(), 1);
        assert_eq!(s.connectors[0].id, "abc_1");
        assert_eq!(s.connectors[0].station_id, "abc");
        assert_eq!(s.connectors[0].connector_type, ConnectorType::Type2);
        assert_eq!(s.connectors[0].power_output, 22.0);

        let closed = reshape_place(place("x", Some("CLOSED_TEMPORARILY")), now);
        assert!(!closed.station.available);
        assert!(!reshape_place(place("y", None), now).station.available);
    }

    #[test]
    fn reshape_keeps_upstream_rating() {
        let mut p = place("abc", None);
        p.rating = Some(3.2);
        p.user_ratings_total = Some(17);
        let s = reshape_place(p, Utc::now());
        assert_eq!(s.station.rating, 3.2);
        assert_eq!(s.station.total_reviews, 17);
    }

    #[tokio::test]
    async fn ok_results_are_found() {
        let (_, stations) = service_with_catalog().await;
        let places = Arc::new(FakePlaces::status(
            "OK",
            vec![place("a", Some("OPERATIONAL")), place("b", None)],
        ));
        let service = NearbyService::new(places.clone(), stations, DEFAULT_RADIUS_M);

        match service.search(berlin(), None).await {
            NearbyOutcome::Found(found) => assert_eq!(found.len(), 2),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(places.seen.lock().unwrap()[0].radius_m, 20_000);
    }

    #[tokio::test]
    async fn zero_results_is_empty_not_failed() {
        let (_, stations) = service_with_catalog().await;
        let places = Arc::new(FakePlaces::status("ZERO_RESULTS", vec![]));
        let service = NearbyService::new(places, stations, DEFAULT_RADIUS_M);

        assert!(matches!(
            service.search(berlin(), Some(500)).await,
            NearbyOutcome::Empty
        ));
    }

    #[tokio::test]
    async fn upstream_error_falls_back_to_local_catalog() {
        let (_, stations) = service_with_catalog().await;
        let places = Arc::new(FakePlaces::status("OVER_QUERY_LIMIT", vec![]));
        let service = NearbyService::new(places, stations, DEFAULT_RADIUS_M);

        match service.search(berlin(), Some(50_000)).await {
            NearbyOutcome::Failed { error, fallback } => {
                match error {
                    PlacesError::Upstream { status, message } => {
                        assert_eq!(status, "OVER_QUERY_LIMIT");
                        assert_eq!(message, NO_STATIONS_MESSAGE);
                    }
                    other => panic!("unexpected error {:?}", other),
                }
                let ids: Vec<&str> = fallback.iter().map(|(s, _)| s.station.id.as_str()).collect();
                assert_eq!(ids, vec!["berlin", "potsdam"]);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn transport_error_is_failed() {
        let (_, stations) = service_with_catalog().await;
        let places = Arc::new(FakePlaces::new(Err(PlacesError::Transport(
            "connection refused".into(),
        ))));
        let service = NearbyService::new(places, stations, DEFAULT_RADIUS_M);

        let outcome = service.search(berlin(), Some(1_000)).await;
        assert_eq!(outcome.label(), "transport_error");
        if let NearbyOutcome::Failed { fallback, .. } = outcome {
            assert_eq!(fallback.len(), 1);
        }
    }
}
