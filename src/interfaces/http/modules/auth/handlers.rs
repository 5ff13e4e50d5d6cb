use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use super::dto::{
    AuthResponse, LoginRequest, PasswordStrengthRequest, PasswordStrengthResponse, SignupRequest,
};
use crate::application::IdentityService;
use crate::interfaces::http::common::{domain_error, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::modules::profiles::ProfileDto;

#[derive(Clone)]
pub struct AuthHandlerState {
    pub identity: Arc<IdentityService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    tag = "Authentication",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Account created and signed in", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Missing field, password mismatch or too short"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn signup(
    State(state): State<AuthHandlerState>,
    Json(request): Json<SignupRequest>,
) -> ApiResult<AuthResponse> {
    let result = state
        .identity
        .signup(request.into())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(result.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let result = state
        .identity
        .login(&request.email, &request.password)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(result.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile of the token holder", body = ApiResponse<ProfileDto>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_current_user(
    State(state): State<AuthHandlerState>,
    user: AuthenticatedUser,
) -> ApiResult<ProfileDto> {
    let profile = state
        .identity
        .profile(&user.user_id)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(profile.into())))
}

/// Live strength meter for the sign-up form
#[utoipa::path(
    post,
    path = "/api/v1/auth/password-strength",
    tag = "Authentication",
    request_body = PasswordStrengthRequest,
    responses(
        (status = 200, description = "Strength rating", body = ApiResponse<PasswordStrengthResponse>)
    )
)]
pub async fn rate_password(
    Json(request): Json<PasswordStrengthRequest>,
) -> Json<ApiResponse<PasswordStrengthResponse>> {
    Json(ApiResponse::success(PasswordStrengthResponse::rate(&request.password)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::infrastructure::crypto::jwt::JwtConfig;
    use crate::infrastructure::database::{test_db, SeaOrmRepositoryProvider};

    async fn state() -> AuthHandlerState {
        let repos = Arc::new(SeaOrmRepositoryProvider::new(test_db().await));
        AuthHandlerState {
            identity: Arc::new(IdentityService::with_cost(
                repos,
                JwtConfig::new("test", 1),
                4,
            )),
        }
    }

    fn request(password: &str, confirm: &str) -> SignupRequest {
        SignupRequest {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    #[tokio::test]
    async fn signup_then_me() {
        let state = state().await;
        let Json(body) = signup(State(state.clone()), Json(request("secret1", "secret1")))
            .await
            .unwrap();
        let auth = body.data.unwrap();
        assert_eq!(auth.token_type, "Bearer");

        let user = AuthenticatedUser {
            user_id: auth.profile.id.clone(),
            email: auth.profile.email.clone(),
        };
        let Json(me) = get_current_user(State(state), user).await.unwrap();
        assert_eq!(me.data.unwrap().full_name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn signup_mismatch_is_400() {
        let (status, Json(body)) = signup(State(state().await), Json(request("secret1", "secret2")))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.as_deref(), Some("Passwords do not match"));
    }

    #[tokio::test]
    async fn duplicate_signup_is_409() {
        let state = state().await;
        let Json(first) = signup(State(state.clone()), Json(request("secret1", "secret1")))
            .await
            .unwrap();
        assert!(first.success);
        let (status, _) = signup(State(state), Json(request("secret1", "secret1")))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn wrong_password_is_401() {
        let state = state().await;
        let Json(first) = signup(State(state.clone()), Json(request("secret1", "secret1")))
            .await
            .unwrap();
        assert!(first.success);
        let (status, _) = login(
            State(state),
            ValidatedJson(LoginRequest {
                email: "ada@example.com".into(),
                password: "nope".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn strength_meter() {
        let Json(body) = rate_password(Json(PasswordStrengthRequest {
            password: "abc".into(),
        }))
        .await;
        let rating = body.data.unwrap();
        assert_eq!(rating.strength, "weak");
        assert!(!rating.acceptable);
    }
}
