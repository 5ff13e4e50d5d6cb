//! Notification events
//!
//! Everything that can be broadcast to subscribers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    BookingCreated(BookingCreatedEvent),
    ReviewCreated(ReviewCreatedEvent),
    StationsInvalidated(StationsInvalidatedEvent),
}

impl Event {
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::BookingCreated(_) => "booking_created",
            Event::ReviewCreated(_) => "review_created",
            Event::StationsInvalidated(_) => "stations_invalidated",
        }
    }

    pub fn station_id(&self) -> Option<&str> {
        match self {
            Event::BookingCreated(e) => Some(&e.station_id),
            Event::ReviewCreated(e) => Some(&e.station_id),
            Event::StationsInvalidated(e) => e.station_id.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingCreatedEvent {
    pub booking_id: String,
    pub user_id: String,
    pub station_id: String,
    pub connector_id: String,
    pub booking_date: NaiveDate,
    /// `HH:MM`
    pub start_time: String,
    pub end_time: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewCreatedEvent {
    pub review_id: String,
    pub station_id: String,
    pub rating: u8,
    pub station_rating: f64,
    pub total_reviews: i32,
    pub timestamp: DateTime<Utc>,
}

/// Cached station listings were dropped; clients should refetch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationsInvalidatedEvent {
    pub station_id: Option<String>,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

/// Wrapper for sending events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: Event,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_serializes_flat_with_tag() {
        let msg = EventMessage::new(Event::StationsInvalidated(StationsInvalidatedEvent {
            station_id: Some("st-1".into()),
            reason: "booking_created".into(),
            timestamp: Utc::now(),
        }));
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "StationsInvalidated");
        assert_eq!(json["data"]["station_id"], "st-1");
        assert!(json["id"].is_string());
    }
}
