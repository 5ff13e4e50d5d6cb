use async_trait::async_trait;

use super::Review;
use crate::domain::DomainResult;

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn save(&self, review: Review) -> DomainResult<()>;

    /// Reviews of a station, newest first
    async fn find_for_station(&self, station_id: &str) -> DomainResult<Vec<Review>>;
}
