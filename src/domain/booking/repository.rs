//! Booking repository interface

use async_trait::async_trait;
use chrono::NaiveDate;

use super::model::Booking;
use crate::domain::DomainResult;

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert a new booking. A duplicate `(connector, date, start)` maps to `Conflict`.
    async fn save(&self, booking: Booking) -> DomainResult<()>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Booking>>;

    /// A user's bookings, newest first
    async fn find_for_user(&self, user_id: &str) -> DomainResult<Vec<Booking>>;

    async fn find_all(&self) -> DomainResult<Vec<Booking>>;

    /// Pending or confirmed bookings of a connector on one day
    async fn find_holding_for_connector_on(
        &self,
        connector_id: &str,
        date: NaiveDate,
    ) -> DomainResult<Vec<Booking>>;
}
