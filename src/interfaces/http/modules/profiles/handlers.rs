use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use super::dto::{ProfileDto, UpdateProfileRequest};
use crate::application::IdentityService;
use crate::interfaces::http::common::{domain_error, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Clone)]
pub struct ProfileHandlerState {
    pub identity: Arc<IdentityService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/profiles/me",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current profile", body = ApiResponse<ProfileDto>),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Profile missing")
    )
)]
pub async fn get_my_profile(
    State(state): State<ProfileHandlerState>,
    user: AuthenticatedUser,
) -> ApiResult<ProfileDto> {
    let profile = state
        .identity
        .profile(&user.user_id)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(profile.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/profiles/me",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ApiResponse<ProfileDto>),
        (status = 401, description = "Not authenticated"),
        (status = 422, description = "Field too long")
    )
)]
pub async fn update_my_profile(
    State(state): State<ProfileHandlerState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<ProfileDto> {
    let profile = state
        .identity
        .update_profile(&user.user_id, request.into())
        .await
        .map_err(domain_error)?;
    tracing::info!(user_id = %user.user_id, "Profile updated");
    Ok(Json(ApiResponse::success(profile.into())))
}
