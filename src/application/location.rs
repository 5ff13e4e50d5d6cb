//! The last-known-location lifecycle for client-reported fixes

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::domain::geo::Coordinates;
use crate::domain::location::{LastKnownLocation, PositionReport};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::location_store::LocationStore;

pub struct LocationService {
    store: Arc<LocationStore>,
}

impl LocationService {
    pub fn new(store: Arc<LocationStore>) -> Self {
        Self { store }
    }

    pub fn last_known(&self, user_id: &str) -> Option<LastKnownLocation> {
        self.store.get(user_id)
    }

    /// Record a client-reported fix, or surface the client's geolocation error.
    pub async fn report(
        &self,
        user_id: &str,
        report: PositionReport,
    ) -> DomainResult<LastKnownLocation> {
        match report {
            PositionReport::Fix(coordinates) => self.remember(user_id, coordinates).await,
            PositionReport::Failed(error) => {
                info!(user_id, code = error.code(), "Client could not get a position");
                Err(DomainError::Validation(error.to_string()))
            }
        }
    }

    async fn remember(
        &self,
        user_id: &str,
        coordinates: Coordinates,
    ) -> DomainResult<LastKnownLocation> {
        let location = LastKnownLocation {
            user_id: user_id.to_string(),
            coordinates,
            recorded_at: Utc::now(),
        };
        self.store.record(location.clone()).await?;
        debug!(user_id, "Recorded last-known location");
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::location::GeolocationError;

    fn service() -> LocationService {
        LocationService::new(Arc::new(LocationStore::in_memory()))
    }

    #[tokio::test]
    async fn reported_fix_becomes_last_known() {
        let svc = service();
        let here = Coordinates::new(48.85, 2.35).unwrap();
        svc.report("u1", PositionReport::Fix(here)).await.unwrap();
        assert_eq!(svc.last_known("u1").unwrap().coordinates, here);
    }

    #[tokio::test]
    async fn reported_error_carries_user_message() {
        let svc = service();
        let err = svc
            .report("u1", PositionReport::Failed(GeolocationError::PermissionDenied))
            .await
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("Please allow location access to find nearby stations"));
        assert!(svc.last_known("u1").is_none());
    }

    #[tokio::test]
    async fn failed_store_write_is_reported_and_not_remembered() {
        let dir = std::env::temp_dir().join(format!("evcharge-loc-{}", uuid::Uuid::new_v4()));
        let store = LocationStore::load(dir.join("locations.json")).await.unwrap();
        let svc = LocationService::new(Arc::new(store));
        std::fs::write(&dir, b"").unwrap();

        let here = Coordinates::new(48.85, 2.35).unwrap();
        assert!(svc.report("u1", PositionReport::Fix(here)).await.is_err());
        assert!(svc.last_known("u1").is_none());

        let _ = std::fs::remove_file(&dir);
    }
}
