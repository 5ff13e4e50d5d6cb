use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;

use super::dto::{
    BookingConfirmationDto, BookingDto, BookingFormRequest, BookingOptionsDto, DurationOption,
    QuoteDto,
};
use crate::application::BookingService;
use crate::domain::booking::form::OFFERED_TIME_SLOTS;
use crate::domain::booking::SessionDuration;
use crate::domain::station::ConnectorType;
use crate::interfaces::http::common::{domain_error, ApiResponse, ApiResult};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct BookingHandlerState {
    pub bookings: Arc<BookingService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/options",
    tag = "Bookings",
    responses(
        (status = 200, description = "Choices offered by the booking form", body = ApiResponse<BookingOptionsDto>)
    )
)]
pub async fn booking_options(
    State(state): State<BookingHandlerState>,
) -> Json<ApiResponse<BookingOptionsDto>> {
    let pricing = state.bookings.pricing();
    Json(ApiResponse::success(BookingOptionsDto {
        time_slots: OFFERED_TIME_SLOTS.iter().map(|s| s.to_string()).collect(),
        durations: SessionDuration::ALL
            .iter()
            .map(|d| DurationOption {
                minutes: d.minutes(),
                label: d.to_string(),
            })
            .collect(),
        default_duration_minutes: SessionDuration::default().minutes(),
        connector_types: ConnectorType::ALL
            .iter()
            .map(|t| t.as_str().to_string())
            .collect(),
        default_draw_kw: pricing.default_draw_kw,
        tesla_draw_kw: pricing.tesla_draw_kw,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/quote",
    tag = "Bookings",
    request_body = BookingFormRequest,
    responses(
        (status = 200, description = "Times and estimated price", body = ApiResponse<QuoteDto>),
        (status = 400, description = "Incomplete or invalid form"),
        (status = 404, description = "Unknown station")
    )
)]
pub async fn quote_booking(
    State(state): State<BookingHandlerState>,
    Json(request): Json<BookingFormRequest>,
) -> ApiResult<QuoteDto> {
    let form = request.to_form().map_err(domain_error)?;
    let quote = state
        .bookings
        .quote(&form, Utc::now().date_naive())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(quote.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's bookings, newest first", body = ApiResponse<Vec<BookingDto>>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_my_bookings(
    State(state): State<BookingHandlerState>,
    user: AuthenticatedUser,
) -> ApiResult<Vec<BookingDto>> {
    let bookings = state
        .bookings
        .my_bookings(&user.user_id)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        bookings.into_iter().map(BookingDto::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    request_body = BookingFormRequest,
    responses(
        (status = 200, description = "Booking confirmed", body = ApiResponse<BookingConfirmationDto>),
        (status = 400, description = "Incomplete form or no connector of that type"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Unknown station"),
        (status = 409, description = "Every matching connector is taken for that time")
    )
)]
pub async fn create_booking(
    State(state): State<BookingHandlerState>,
    user: AuthenticatedUser,
    Json(request): Json<BookingFormRequest>,
) -> ApiResult<BookingConfirmationDto> {
    let form = request.to_form().map_err(domain_error)?;
    let confirmation = state
        .bookings
        .create(&user.user_id, form, Utc::now().date_naive())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(confirmation.into())))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::Duration;

    use super::*;
    use crate::application::create_event_bus;
    use crate::application::stations::tests::service_with_catalog;
    use crate::domain::booking::PricingPolicy;

    async fn state() -> BookingHandlerState {
        let (repos, stations) = service_with_catalog().await;
        BookingHandlerState {
            bookings: Arc::new(BookingService::new(
                repos,
                stations,
                create_event_bus(),
                PricingPolicy::default(),
            )),
        }
    }

    fn user(id: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: id.into(),
            email: format!("{}@example.com", id),
        }
    }

    fn form() -> BookingFormRequest {
        let date = Utc::now().date_naive() + Duration::days(30);
        BookingFormRequest {
            station_id: "berlin".into(),
            booking_date: Some(date.to_string()),
            time_slot: Some("01:00 PM".into()),
            duration_minutes: Some(60),
            vehicle_type: Some("Tesla Model 3".into()),
            connector_type: Some("Type 2".into()),
            special_requests: None,
        }
    }

    #[test]
    fn blank_selections_count_as_missing() {
        let mut request = form();
        request.vehicle_type = Some("   ".into());
        let parsed = request.to_form().unwrap();
        assert!(parsed.vehicle_type.is_none());
        assert_eq!(parsed.missing_fields(), vec!["vehicle_type"]);
    }

    #[test]
    fn malformed_date_is_rejected() {
        let mut request = form();
        request.booking_date = Some("01/07/2030".into());
        assert!(request.to_form().is_err());
    }

    #[tokio::test]
    async fn options_list_slots_and_durations() {
        let Json(body) = booking_options(State(state().await)).await;
        let options = body.data.unwrap();
        assert_eq!(options.time_slots.first().map(String::as_str), Some("09:00 AM"));
        assert_eq!(options.durations.len(), 4);
        assert_eq!(options.default_duration_minutes, 30);
        assert!(options.connector_types.contains(&"CHAdeMO".to_string()));
    }

    #[tokio::test]
    async fn quote_uses_24_hour_times() {
        let Json(body) = quote_booking(State(state().await), Json(form()))
            .await
            .unwrap();
        let quote = body.data.unwrap();
        assert_eq!(quote.start_time, "13:00");
        assert_eq!(quote.end_time, "14:00");
        assert_eq!(quote.estimated_price, 4.05);
    }

    #[tokio::test]
    async fn create_then_list() {
        let state = state().await;
        let Json(body) = create_booking(State(state.clone()), user("u-1"), Json(form()))
            .await
            .unwrap();
        let confirmation = body.data.unwrap();
        assert_eq!(confirmation.connector.connector_type, "Type 2");
        assert_eq!(confirmation.booking.status, "pending");

        let Json(mine) = list_my_bookings(State(state.clone()), user("u-1"))
            .await
            .unwrap();
        assert_eq!(mine.data.unwrap().len(), 1);

        let Json(theirs) = list_my_bookings(State(state), user("u-2")).await.unwrap();
        assert!(theirs.data.unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_booking_for_same_slot_conflicts() {
        let state = state().await;
        let Json(first) = create_booking(State(state.clone()), user("u-1"), Json(form()))
            .await
            .unwrap();
        assert!(first.success);
        let (status, _) = create_booking(State(state), user("u-2"), Json(form()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn incomplete_form_is_400() {
        let mut request = form();
        request.connector_type = None;
        let (status, Json(body)) = create_booking(State(state().await), user("u-1"), Json(request))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.unwrap().contains("connector_type"));
    }
}
