use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::identity::{password_strength, AuthResult, PasswordStrength, SignUp};
use crate::interfaces::http::modules::profiles::ProfileDto;

/// Missing fields deserialize as empty so the sign-up rules report them
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl From<SignupRequest> for SignUp {
    fn from(r: SignupRequest) -> Self {
        Self {
            name: r.name,
            email: r.email,
            password: r.password,
            confirm_password: r.confirm_password,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub profile: ProfileDto,
}

impl From<AuthResult> for AuthResponse {
    fn from(r: AuthResult) -> Self {
        Self {
            token: r.token,
            token_type: r.token_type,
            expires_in: r.expires_in,
            profile: r.profile.into(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PasswordStrengthRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PasswordStrengthResponse {
    /// `none`, `weak`, `medium` or `strong`
    pub strength: String,
    pub acceptable: bool,
}

impl PasswordStrengthResponse {
    pub fn rate(password: &str) -> Self {
        let strength = password_strength(password);
        Self {
            strength: strength.as_str().to_string(),
            acceptable: strength >= PasswordStrength::Medium,
        }
    }
}
