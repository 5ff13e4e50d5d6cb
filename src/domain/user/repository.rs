use async_trait::async_trait;

use super::{AuthUser, CreateUserDto};
use crate::domain::profile::Profile;
use crate::domain::DomainResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert the identity and its profile together. Duplicate email maps to `Conflict`.
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<(AuthUser, Profile)>;

    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<AuthUser>>;
    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<AuthUser>>;

    async fn touch_last_login(&self, id: &str) -> DomainResult<()>;
}
