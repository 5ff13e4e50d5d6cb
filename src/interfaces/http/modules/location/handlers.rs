use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use super::dto::{LocationDto, LocationReportRequest};
use crate::application::LocationService;
use crate::interfaces::http::common::{domain_error, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::shared::errors::DomainError;

#[derive(Clone)]
pub struct LocationHandlerState {
    pub location: Arc<LocationService>,
}

#[utoipa::path(
    put,
    path = "/api/v1/location",
    tag = "Location",
    security(("bearer_auth" = [])),
    request_body = LocationReportRequest,
    responses(
        (status = 200, description = "Fix stored as last-known location", body = ApiResponse<LocationDto>),
        (status = 400, description = "Client reported a geolocation error; `error` holds the message to show"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn report_location(
    State(state): State<LocationHandlerState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<LocationReportRequest>,
) -> ApiResult<LocationDto> {
    let report = request.to_report().map_err(domain_error)?;
    let location = state
        .location
        .report(&user.user_id, report)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(location.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/location",
    tag = "Location",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Last-known location", body = ApiResponse<LocationDto>),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Nothing reported yet")
    )
)]
pub async fn get_location(
    State(state): State<LocationHandlerState>,
    user: AuthenticatedUser,
) -> ApiResult<LocationDto> {
    let location = state
        .location
        .last_known(&user.user_id)
        .ok_or_else(|| DomainError::not_found("Location", "user_id", user.user_id.clone()))
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(location.into())))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::infrastructure::LocationStore;

    fn state() -> LocationHandlerState {
        LocationHandlerState {
            location: Arc::new(LocationService::new(Arc::new(LocationStore::in_memory()))),
        }
    }

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: "u-1".into(),
            email: "ada@example.com".into(),
        }
    }

    #[tokio::test]
    async fn fix_is_remembered() {
        let state = state();
        let Json(reported) = report_location(
            State(state.clone()),
            user(),
            ValidatedJson(LocationReportRequest {
                latitude: Some(52.52),
                longitude: Some(13.405),
                error_code: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(reported.data.unwrap().longitude, 13.405);

        let Json(body) = get_location(State(state), user()).await.unwrap();
        assert_eq!(body.data.unwrap().latitude, 52.52);
    }

    #[tokio::test]
    async fn nothing_reported_is_404() {
        let (status, _) = get_location(State(state()), user()).await.unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn permission_denied_surfaces_message() {
        let (status, Json(body)) = report_location(
            State(state()),
            user(),
            ValidatedJson(LocationReportRequest {
                error_code: Some(1),
                ..Default::default()
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body.error.as_deref(),
            Some("Please allow location access to find nearby stations")
        );
    }

    #[tokio::test]
    async fn empty_report_is_400() {
        let (status, _) = report_location(
            State(state()),
            user(),
            ValidatedJson(LocationReportRequest::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
