use async_trait::async_trait;

use super::Profile;
use crate::domain::DomainResult;

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Profile>>;

    /// Overwrite name, phone and `updated_at`
    async fn update(&self, profile: Profile) -> DomainResult<()>;
}
