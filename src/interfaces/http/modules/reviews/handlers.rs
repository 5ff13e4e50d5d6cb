use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use super::dto::{CreateReviewRequest, ReviewDto};
use crate::application::ReviewService;
use crate::interfaces::http::common::{domain_error, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct ReviewHandlerState {
    pub reviews: Arc<ReviewService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/reviews",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    request_body = CreateReviewRequest,
    responses(
        (status = 200, description = "Review stored, station rating recomputed", body = ApiResponse<ReviewDto>),
        (status = 400, description = "Booking does not match user and station"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Unknown station or booking"),
        (status = 422, description = "Rating out of range")
    )
)]
pub async fn create_review(
    State(state): State<ReviewHandlerState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateReviewRequest>,
) -> ApiResult<ReviewDto> {
    let review = state
        .reviews
        .create(&user.user_id, request.into())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(review.into())))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::application::create_event_bus;
    use crate::application::stations::tests::service_with_catalog;

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: "u-1".into(),
            email: "ada@example.com".into(),
        }
    }

    fn request(station: &str, booking: Option<&str>) -> CreateReviewRequest {
        CreateReviewRequest {
            station_id: station.into(),
            booking_id: booking.map(String::from),
            rating: 4,
            comment: Some("  quick and clean  ".into()),
        }
    }

    async fn state() -> ReviewHandlerState {
        let (repos, stations) = service_with_catalog().await;
        ReviewHandlerState {
            reviews: Arc::new(ReviewService::new(repos, stations, create_event_bus())),
        }
    }

    #[tokio::test]
    async fn creates_review() {
        let Json(body) = create_review(
            State(state().await),
            user(),
            ValidatedJson(request("berlin", None)),
        )
        .await
        .unwrap();
        let review = body.data.unwrap();
        assert_eq!(review.rating, 4);
        assert_eq!(review.comment.as_deref(), Some("quick and clean"));
        assert_eq!(review.user_id, "u-1");
    }

    #[tokio::test]
    async fn blank_booking_id_is_ignored() {
        let result = create_review(
            State(state().await),
            user(),
            ValidatedJson(request("berlin", Some(" "))),
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn unknown_booking_is_404() {
        let (status, _) = create_review(
            State(state().await),
            user(),
            ValidatedJson(request("berlin", Some("missing"))),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_station_is_404() {
        let (status, _) = create_review(
            State(state().await),
            user(),
            ValidatedJson(request("atlantis", None)),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
