//! Identity service
//!
//! HTTP handlers stay thin and delegate here.

use std::sync::Arc;

use tracing::info;

use crate::domain::profile::{Profile, ProfileUpdate};
use crate::domain::user::CreateUserDto;
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
use crate::infrastructure::crypto::password::{hash_password, verify_password, DEFAULT_COST};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
pub struct SignUp {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordStrength {
    None,
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Weak => "weak",
            Self::Medium => "medium",
            Self::Strong => "strong",
        }
    }
}

pub fn password_strength(password: &str) -> PasswordStrength {
    match password.chars().count() {
        0 => PasswordStrength::None,
        n if n < MIN_PASSWORD_LEN => PasswordStrength::Weak,
        n if n < 10 => PasswordStrength::Medium,
        _ => PasswordStrength::Strong,
    }
}

#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub profile: Profile,
}

pub struct IdentityService {
    repos: Arc<dyn RepositoryProvider>,
    jwt_config: JwtConfig,
    bcrypt_cost: u32,
}

impl IdentityService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, jwt_config: JwtConfig) -> Self {
        Self::with_cost(repos, jwt_config, DEFAULT_COST)
    }

    pub fn with_cost(
        repos: Arc<dyn RepositoryProvider>,
        jwt_config: JwtConfig,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            repos,
            jwt_config,
            bcrypt_cost,
        }
    }

    pub fn jwt_config(&self) -> &JwtConfig {
        &self.jwt_config
    }

    fn issue(&self, profile: Profile) -> DomainResult<AuthResult> {
        let token = create_token(&profile.id, &profile.email, &self.jwt_config)
            .map_err(|e| DomainError::Storage(format!("Failed to create token: {}", e)))?;
        Ok(AuthResult {
            token,
            token_type: "Bearer".into(),
            expires_in: self.jwt_config.expiration_hours * 3600,
            profile,
        })
    }

    pub async fn signup(&self, input: SignUp) -> DomainResult<AuthResult> {
        if input.name.trim().is_empty()
            || input.email.trim().is_empty()
            || input.password.is_empty()
            || input.confirm_password.is_empty()
        {
            return Err(DomainError::Validation("Please fill all required fields".into()));
        }
        if input.password != input.confirm_password {
            return Err(DomainError::Validation("Passwords do not match".into()));
        }
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::Validation(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LEN
            )));
        }
        if !input.email.contains('@') {
            return Err(DomainError::Validation("Invalid email address".into()));
        }

        let password_hash = hash_password(&input.password, self.bcrypt_cost)
            .map_err(|e| DomainError::Storage(format!("Failed to hash password: {}", e)))?;

        let (user, profile) = self
            .repos
            .users()
            .create_user(CreateUserDto {
                email: input.email,
                full_name: input.name,
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, email = %user.email, "New user registered");
        self.issue(profile)
    }

    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthResult> {
        let Some(user) = self.repos.users().get_user_by_email(email).await? else {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        };

        if !verify_password(password, &user.password_hash).unwrap_or(false) {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        }

        self.repos.users().touch_last_login(&user.id).await?;
        let profile = self.profile(&user.id).await?;
        info!(user_id = %user.id, "User logged in");
        self.issue(profile)
    }

    pub async fn profile(&self, user_id: &str) -> DomainResult<Profile> {
        self.repos
            .profiles()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Profile", "id", user_id))
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        update: ProfileUpdate,
    ) -> DomainResult<Profile> {
        let mut profile = self.profile(user_id).await?;
        profile.apply(update);
        self.repos.profiles().update(profile.clone()).await?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::crypto::jwt::verify_token;
    use crate::infrastructure::database::{test_db, SeaOrmRepositoryProvider};

    async fn service() -> IdentityService {
        let repos = Arc::new(SeaOrmRepositoryProvider::new(test_db().await));
        IdentityService::with_cost(repos, JwtConfig::new("test", 1), 4)
    }

    fn signup(password: &str, confirm: &str) -> SignUp {
        SignUp {
            name: "Grace Hopper".into(),
            email: "grace@example.com".into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    #[test]
    fn strength_levels() {
        assert_eq!(password_strength(""), PasswordStrength::None);
        assert_eq!(password_strength("abc"), PasswordStrength::Weak);
        assert_eq!(password_strength("abcdef"), PasswordStrength::Medium);
        assert_eq!(password_strength("abcdefghij"), PasswordStrength::Strong);
    }

    #[tokio::test]
    async fn signup_rules() {
        let svc = service().await;
        let err = svc.signup(signup("secret1", "secret2")).await.unwrap_err();
        assert_eq!(err.to_string(), "Validation: Passwords do not match");

        let err = svc.signup(signup("abc", "abc")).await.unwrap_err();
        assert!(err.to_string().contains("at least 6"));

        let mut blank = signup("secret1", "secret1");
        blank.name = " ".into();
        assert!(svc.signup(blank).await.is_err());
    }

    #[tokio::test]
    async fn signup_then_login() {
        let svc = service().await;
        let created = svc.signup(signup("secret1", "secret1")).await.unwrap();
        assert_eq!(created.profile.full_name.as_deref(), Some("Grace Hopper"));
        let claims = verify_token(&created.token, svc.jwt_config()).unwrap();
        assert_eq!(claims.sub, created.profile.id);

        let logged_in = svc.login("GRACE@example.com", "secret1").await.unwrap();
        assert_eq!(logged_in.profile.id, created.profile.id);
        assert_eq!(logged_in.expires_in, 3600);

        assert!(matches!(
            svc.login("grace@example.com", "wrong").await,
            Err(DomainError::Unauthorized(_))
        ));
        assert!(matches!(
            svc.login("nobody@example.com", "secret1").await,
            Err(DomainError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_signup_conflicts() {
        let svc = service().await;
        svc.signup(signup("secret1", "secret1")).await.unwrap();
        assert!(matches!(
            svc.signup(signup("secret1", "secret1")).await,
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn profile_update() {
        let svc = service().await;
        let created = svc.signup(signup("secret1", "secret1")).await.unwrap();
        let updated = svc
            .update_profile(
                &created.profile.id,
                ProfileUpdate {
                    full_name: None,
                    phone: Some("+44 20 7946 0000".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.phone.as_deref(), Some("+44 20 7946 0000"));
        assert_eq!(
            svc.profile(&created.profile.id).await.unwrap().phone,
            updated.phone
        );
        assert!(svc.profile("ghost").await.is_err());
    }
}
