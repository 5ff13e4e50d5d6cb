//! Station repository interface

use async_trait::async_trait;

use super::model::{Connector, Station};
use crate::domain::DomainResult;

#[async_trait]
pub trait StationRepository: Send + Sync {
    /// All stations ordered by name
    async fn find_all(&self) -> DomainResult<Vec<Station>>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Station>>;

    /// Every connector of every station
    async fn find_all_connectors(&self) -> DomainResult<Vec<Connector>>;

    async fn find_connectors_for_station(&self, station_id: &str) -> DomainResult<Vec<Connector>>;

    /// Insert a station (catalog seeding)
    async fn save(&self, station: Station) -> DomainResult<()>;

    /// Insert a connector (catalog seeding)
    async fn save_connector(&self, connector: Connector) -> DomainResult<()>;

    /// Insert a station and all of its connectors atomically; nothing is
    /// stored if any insert fails.
    async fn save_with_connectors(
        &self,
        station: Station,
        connectors: Vec<Connector>,
    ) -> DomainResult<()>;

    /// Overwrite the aggregate review figures of a station
    async fn update_rating(
        &self,
        station_id: &str,
        rating: f64,
        total_reviews: i32,
    ) -> DomainResult<()>;
}
