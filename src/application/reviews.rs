//! Station reviews and the rating aggregate they drive

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::info;

use super::events::{Event, ReviewCreatedEvent, SharedEventBus, StationsInvalidatedEvent};
use super::stations::StationService;
use crate::domain::review::{aggregate_rating, Rating, Review};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};

#[derive(Debug, Clone)]
pub struct NewReview {
    pub station_id: String,
    pub booking_id: Option<String>,
    pub rating: i32,
    pub comment: Option<String>,
}

pub struct ReviewService {
    repos: Arc<dyn RepositoryProvider>,
    stations: Arc<StationService>,
    events: SharedEventBus,
    station_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ReviewService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        stations: Arc<StationService>,
        events: SharedEventBus,
    ) -> Self {
        Self {
            repos,
            stations,
            events,
            station_locks: DashMap::new(),
        }
    }

    pub async fn for_station(&self, station_id: &str) -> DomainResult<Vec<Review>> {
        self.stations.get(station_id).await?;
        self.repos.reviews().find_for_station(station_id).await
    }

    /// Store a review and recompute the station's rating and review count.
    pub async fn create(&self, user_id: &str, input: NewReview) -> DomainResult<Review> {
        let rating = Rating::new(input.rating)?;
        self.stations.get(&input.station_id).await?;

        if let Some(booking_id) = &input.booking_id {
            let booking = self
                .repos
                .bookings()
                .find_by_id(booking_id)
                .await?
                .ok_or_else(|| DomainError::not_found("Booking", "id", booking_id.clone()))?;
            if booking.user_id != user_id || booking.station_id != input.station_id {
                return Err(DomainError::Validation(
                    "booking does not belong to this user and station".into(),
                ));
            }
        }

        let review = Review {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            station_id: input.station_id.clone(),
            booking_id: input.booking_id,
            rating,
            comment: input
                .comment
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            created_at: Utc::now(),
        };

        let lock = self
            .station_locks
            .entry(review.station_id.clone())
            .or_default()
            .clone();
        let _guard = lock.lock().await;

        self.repos.reviews().save(review.clone()).await?;
        let all = self.repos.reviews().find_for_station(&review.station_id).await?;
        let (average, count) = aggregate_rating(all.iter().map(|r| &r.rating));
        self.repos
            .stations()
            .update_rating(&review.station_id, average, count)
            .await?;

        info!(
            review_id = %review.id,
            station_id = %review.station_id,
            rating = rating.value(),
            average,
            count,
            "Review created"
        );

        self.stations.invalidate();
        let now = Utc::now();
        self.events.publish(Event::ReviewCreated(ReviewCreatedEvent {
            review_id: review.id.clone(),
            station_id: review.station_id.clone(),
            rating: rating.value(),
            station_rating: average,
            total_reviews: count,
            timestamp: now,
        }));
        self.events
            .publish(Event::StationsInvalidated(StationsInvalidatedEvent {
                station_id: Some(review.station_id.clone()),
                reason: "review_created".into(),
                timestamp: now,
            }));

        Ok(review)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::create_event_bus;
    use crate::application::stations::tests::service_with_catalog;

    async fn setup() -> (Arc<StationService>, ReviewService) {
        let (repos, stations) = service_with_catalog().await;
        let service = ReviewService::new(repos, stations.clone(), create_event_bus());
        (stations, service)
    }

    fn review(station: &str, rating: i32) -> NewReview {
        NewReview {
            station_id: station.into(),
            booking_id: None,
            rating,
            comment: Some("  fast and clean ".into()),
        }
    }

    #[tokio::test]
    async fn reviews_update_station_aggregate() {
        let (stations, service) = setup().await;
        // cached catalog must be dropped by the review write
        assert_eq!(stations.catalog().await.unwrap().len(), 3);

        for stars in [5, 4, 4] {
            service.create("u1", review("berlin", stars)).await.unwrap();
        }

        let station = stations.get("berlin").await.unwrap().station;
        assert_eq!(station.total_reviews, 3);
        assert_eq!(station.rating, 4.3);

        let listed = service.for_station("berlin").await.unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].comment.as_deref(), Some("fast and clean"));
    }

    #[tokio::test]
    async fn out_of_range_rating_is_rejected() {
        let (_, service) = setup().await;
        assert!(matches!(
            service.create("u1", review("berlin", 6)).await,
            Err(DomainError::Validation(_))
        ));
        assert!(service.create("u1", review("berlin", 0)).await.is_err());
    }

    #[tokio::test]
    async fn unknown_station_or_booking() {
        let (_, service) = setup().await;
        assert!(matches!(
            service.create("u1", review("atlantis", 3)).await,
            Err(DomainError::NotFound { .. })
        ));

        let mut with_booking = review("berlin", 3);
        with_booking.booking_id = Some("missing".into());
        assert!(matches!(
            service.create("u1", with_booking).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(service.for_station("atlantis").await.is_err());
    }
}
