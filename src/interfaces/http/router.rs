//! Route table, shared state and the OpenAPI document

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::common::ApiResponse;
use super::middleware::{auth_middleware, AuthState};
use super::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use super::modules::request_id::request_id_middleware;
use super::modules::{auth, bookings, health, location, profiles, reviews, stations};
use crate::application::{
    BookingService, IdentityService, LocationService, NearbyService, ReviewService,
    SharedEventBus, StationService,
};
use crate::interfaces::ws::{create_notification_state, ws_notifications_handler, NotificationState};

/// Everything the handlers need. Each handler extracts its own slice via `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub auth: AuthState,
    pub identity: Arc<IdentityService>,
    pub stations: Arc<StationService>,
    pub nearby: Arc<NearbyService>,
    pub bookings: Arc<BookingService>,
    pub reviews: Arc<ReviewService>,
    pub location: Arc<LocationService>,
    pub event_bus: SharedEventBus,
    pub started_at: Arc<Instant>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(s: &AppState) -> Self {
        s.auth.clone()
    }
}

impl FromRef<AppState> for auth::AuthHandlerState {
    fn from_ref(s: &AppState) -> Self {
        Self {
            identity: s.identity.clone(),
        }
    }
}

impl FromRef<AppState> for profiles::ProfileHandlerState {
    fn from_ref(s: &AppState) -> Self {
        Self {
            identity: s.identity.clone(),
        }
    }
}

impl FromRef<AppState> for stations::StationHandlerState {
    fn from_ref(s: &AppState) -> Self {
        Self {
            stations: s.stations.clone(),
            reviews: s.reviews.clone(),
        }
    }
}

impl FromRef<AppState> for stations::NearbyHandlerState {
    fn from_ref(s: &AppState) -> Self {
        Self {
            nearby: s.nearby.clone(),
        }
    }
}

impl FromRef<AppState> for bookings::BookingHandlerState {
    fn from_ref(s: &AppState) -> Self {
        Self {
            bookings: s.bookings.clone(),
        }
    }
}

impl FromRef<AppState> for reviews::ReviewHandlerState {
    fn from_ref(s: &AppState) -> Self {
        Self {
            reviews: s.reviews.clone(),
        }
    }
}

impl FromRef<AppState> for location::LocationHandlerState {
    fn from_ref(s: &AppState) -> Self {
        Self {
            location: s.location.clone(),
        }
    }
}

impl FromRef<AppState> for health::HealthState {
    fn from_ref(s: &AppState) -> Self {
        Self {
            db: s.db.clone(),
            event_bus: s.event_bus.clone(),
            started_at: s.started_at.clone(),
        }
    }
}

impl FromRef<AppState> for NotificationState {
    fn from_ref(s: &AppState) -> Self {
        create_notification_state(s.event_bus.clone())
    }
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from /api/v1/auth/login or /signup"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::signup,
        auth::login,
        auth::get_current_user,
        auth::rate_password,
        stations::list_stations,
        stations::get_station,
        stations::list_station_reviews,
        stations::nearby_stations,
        bookings::booking_options,
        bookings::quote_booking,
        bookings::list_my_bookings,
        bookings::create_booking,
        reviews::create_review,
        profiles::get_my_profile,
        profiles::update_my_profile,
        location::report_location,
        location::get_location,
    ),
    components(
        schemas(
            ApiResponse<String>,
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            auth::PasswordStrengthRequest,
            auth::PasswordStrengthResponse,
            profiles::ProfileDto,
            profiles::UpdateProfileRequest,
            stations::StationDto,
            stations::ConnectorDto,
            stations::NearbyRequest,
            stations::NearbyResponse,
            stations::NearbyErrorResponse,
            bookings::BookingFormRequest,
            bookings::BookingDto,
            bookings::BookingConfirmationDto,
            bookings::QuoteDto,
            bookings::BookingOptionsDto,
            bookings::DurationOption,
            reviews::ReviewDto,
            reviews::CreateReviewRequest,
            location::LocationReportRequest,
            location::LocationDto,
            health::HealthResponse,
            health::ComponentHealth,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and database reachability"),
        (name = "Authentication", description = "Sign-up, login and the current identity"),
        (name = "Stations", description = "Station catalog, filters and nearby search"),
        (name = "Bookings", description = "Booking form options, quotes and reservations"),
        (name = "Reviews", description = "Station reviews and ratings"),
        (name = "Profiles", description = "The signed-in user's profile"),
        (name = "Location", description = "Last-known position of the signed-in user"),
    ),
    info(
        title = "EV Charge Platform API",
        version = "1.0.0",
        description = "Find charging stations nearby and book a connector"
    )
)]
pub struct ApiDoc;

/// Build the full router. `/metrics` is mounted only when a Prometheus
/// handle is supplied.
pub fn create_api_router(state: AppState, prometheus: Option<PrometheusHandle>) -> Router {
    let require_auth = middleware::from_fn_with_state(state.auth.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/password-strength", post(auth::rate_password))
        .merge(
            Router::new()
                .route("/me", get(auth::get_current_user))
                .route_layer(require_auth.clone()),
        );

    let station_routes = Router::new()
        .route("/", get(stations::list_stations))
        .route("/nearby", post(stations::nearby_stations))
        .route("/{id}", get(stations::get_station))
        .route("/{id}/reviews", get(stations::list_station_reviews));

    let booking_routes = Router::new()
        .route("/options", get(bookings::booking_options))
        .route("/quote", post(bookings::quote_booking))
        .merge(
            Router::new()
                .route(
                    "/",
                    get(bookings::list_my_bookings).post(bookings::create_booking),
                )
                .route_layer(require_auth.clone()),
        );

    let review_routes = Router::new()
        .route("/", post(reviews::create_review))
        .route_layer(require_auth.clone());

    let profile_routes = Router::new()
        .route(
            "/me",
            get(profiles::get_my_profile).put(profiles::update_my_profile),
        )
        .route_layer(require_auth.clone());

    let location_routes = Router::new()
        .route(
            "/",
            get(location::get_location).put(location::report_location),
        )
        .route_layer(require_auth);

    let notification_routes = Router::new().route("/ws", get(ws_notifications_handler));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/stations", station_routes)
        .nest("/api/v1/bookings", booking_routes)
        .nest("/api/v1/reviews", review_routes)
        .nest("/api/v1/profiles", profile_routes)
        .nest("/api/v1/location", location_routes)
        .nest("/api/v1/notifications", notification_routes)
        .with_state(state);

    if let Some(handle) = prometheus {
        router = router.route(
            "/metrics",
            get(prometheus_metrics).with_state(MetricsState { handle }),
        );
    }

    router
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};

    use super::*;
    use crate::application::create_event_bus;
    use crate::application::nearby::tests::FakePlaces;
    use crate::application::nearby::DEFAULT_RADIUS_M;
    use crate::application::stations::tests::service_with_catalog;
    use crate::domain::booking::PricingPolicy;
    use crate::infrastructure::crypto::jwt::JwtConfig;
    use crate::infrastructure::database::test_db;
    use crate::infrastructure::LocationStore;

    async fn app() -> Router {
        let (repos, stations) = service_with_catalog().await;
        let events = create_event_bus();
        let jwt = JwtConfig::new("router-test", 1);
        let state = AppState {
            db: test_db().await,
            auth: AuthState {
                jwt_config: jwt.clone(),
            },
            identity: Arc::new(IdentityService::with_cost(repos.clone(), jwt, 4)),
            nearby: Arc::new(NearbyService::new(
                Arc::new(FakePlaces::status("ZERO_RESULTS", vec![])),
                stations.clone(),
                DEFAULT_RADIUS_M,
            )),
            bookings: Arc::new(BookingService::new(
                repos.clone(),
                stations.clone(),
                events.clone(),
                PricingPolicy::default(),
            )),
            reviews: Arc::new(ReviewService::new(repos, stations.clone(), events.clone())),
            location: Arc::new(LocationService::new(Arc::new(LocationStore::in_memory()))),
            stations,
            event_bus: events,
            started_at: Arc::new(Instant::now()),
        };
        create_api_router(state, None)
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        use tower::Service;
        let mut svc = app.clone().into_service();
        let resp = svc.call(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn protected_routes_need_a_token() {
        let app = app().await;
        let (status, body) = send(
            &app,
            Request::get("/api/v1/bookings").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn public_catalog_routes() {
        let app = app().await;
        let (status, body) = send(
            &app,
            Request::get("/api/v1/stations?connector_type=CCS")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["id"], "berlin");

        let (status, body) = send(
            &app,
            Request::get("/api/v1/bookings/options")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["time_slots"][0], "09:00 AM");
    }

    #[tokio::test]
    async fn nearby_keeps_proxy_shape() {
        let app = app().await;
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/stations/nearby",
                None,
                json!({"latitude": 52.52, "longitude": 13.405}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ZERO_RESULTS");
        assert!(body.get("success").is_none());
    }

    #[tokio::test]
    async fn signup_book_and_review() {
        let app = app().await;
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/auth/signup",
                None,
                json!({
                    "name": "Ada",
                    "email": "ada@example.com",
                    "password": "secret1",
                    "confirm_password": "secret1"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let date = (Utc::now().date_naive() + Duration::days(14)).to_string();
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/bookings",
                Some(&token),
                json!({
                    "station_id": "berlin",
                    "booking_date": date,
                    "time_slot": "09:00 AM",
                    "duration_minutes": 90,
                    "vehicle_type": "Nissan Leaf",
                    "connector_type": "CCS"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["booking"]["start_time"], "09:00");
        assert_eq!(body["data"]["booking"]["end_time"], "10:30");
        let booking_id = body["data"]["booking"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/reviews",
                Some(&token),
                json!({"station_id": "berlin", "booking_id": booking_id, "rating": 5}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["rating"], 5);

        let (_, body) = send(
            &app,
            Request::get("/api/v1/stations/berlin")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(body["data"]["total_reviews"], 1);
        assert_eq!(body["data"]["rating"], 5.0);
    }

    #[tokio::test]
    async fn review_rating_out_of_range_is_422() {
        let app = app().await;
        let token = crate::infrastructure::crypto::jwt::create_token(
            "u-1",
            "ada@example.com",
            &JwtConfig::new("router-test", 1),
        )
        .unwrap();
        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/reviews",
                Some(&token),
                json!({"station_id": "berlin", "rating": 7}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        use tower::Service;
        let app = app().await;
        let mut svc = app.into_service();
        let resp = svc
            .call(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(resp.headers().contains_key("x-request-id"));
    }
}
