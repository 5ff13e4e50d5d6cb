//! WebSocket event stream for clients that want live station updates

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::select;
use tracing::{debug, error, info, warn};

use crate::application::events::{EventMessage, SharedEventBus};

/// Query parameters narrowing the stream
#[derive(Debug, Default, Deserialize)]
pub struct EventFilter {
    /// Only events about this station. Catalog-wide invalidations always pass.
    pub station_id: Option<String>,
    /// Comma-separated event types, e.g. `booking_created,review_created`
    pub event_types: Option<String>,
}

impl EventFilter {
    pub fn matches(&self, message: &EventMessage) -> bool {
        if let Some(wanted) = &self.station_id {
            match message.event.station_id() {
                Some(station_id) if station_id != wanted => return false,
                _ => {}
            }
        }

        if let Some(types) = &self.event_types {
            let event_type = message.event.event_type();
            if !types.split(',').map(str::trim).any(|t| t == event_type) {
                return false;
            }
        }

        true
    }
}

#[derive(Clone)]
pub struct NotificationState {
    pub event_bus: SharedEventBus,
}

pub fn create_notification_state(event_bus: SharedEventBus) -> NotificationState {
    NotificationState { event_bus }
}

pub async fn ws_notifications_handler(
    ws: WebSocketUpgrade,
    State(state): State<NotificationState>,
    Query(filter): Query<EventFilter>,
) -> impl IntoResponse {
    info!(
        station_id = ?filter.station_id,
        event_types = ?filter.event_types,
        "Notification client connecting"
    );

    ws.on_upgrade(move |socket| handle_notification_socket(socket, state, filter))
}

async fn handle_notification_socket(
    socket: WebSocket,
    state: NotificationState,
    filter: EventFilter,
) {
    let (mut sender, mut receiver) = socket.split();
    let mut subscriber = state.event_bus.subscribe();

    let welcome = serde_json::json!({
        "type": "connected",
        "message": "Connected to station event stream",
        "filter": {
            "station_id": filter.station_id,
            "event_types": filter.event_types,
        }
    });

    if let Err(e) = sender.send(Message::Text(welcome.to_string().into())).await {
        error!("Failed to send welcome message: {}", e);
        return;
    }

    loop {
        select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = sender.send(Message::Pong(data)).await {
                            error!("Failed to send pong: {}", e);
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!("Notification socket error: {}", e);
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }

            event = subscriber.recv() => {
                let Some(message) = event else {
                    warn!("Event bus closed");
                    break;
                };
                if !filter.matches(&message) {
                    continue;
                }
                match serde_json::to_string(&message) {
                    Ok(json) => {
                        if let Err(e) = sender.send(Message::Text(json.into())).await {
                            debug!("Notification client went away: {}", e);
                            break;
                        }
                    }
                    Err(e) => error!("Failed to serialize event: {}", e),
                }
            }
        }
    }

    info!("Notification client disconnected");
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::application::events::{
        BookingCreatedEvent, Event, StationsInvalidatedEvent,
    };

    fn booking_at(station_id: &str) -> EventMessage {
        EventMessage::new(Event::BookingCreated(BookingCreatedEvent {
            booking_id: "b-1".into(),
            user_id: "u-1".into(),
            station_id: station_id.into(),
            connector_id: format!("{}_1", station_id),
            booking_date: NaiveDate::from_ymd_opt(2030, 7, 1).unwrap(),
            start_time: "09:00".into(),
            end_time: "09:30".into(),
            timestamp: Utc::now(),
        }))
    }

    fn global_invalidation() -> EventMessage {
        EventMessage::new(Event::StationsInvalidated(StationsInvalidatedEvent {
            station_id: None,
            reason: "catalog_import".into(),
            timestamp: Utc::now(),
        }))
    }

    #[test]
    fn empty_filter_passes_everything() {
        let filter = EventFilter::default();
        assert!(filter.matches(&booking_at("berlin")));
        assert!(filter.matches(&global_invalidation()));
    }

    #[test]
    fn station_filter_drops_other_stations() {
        let filter = EventFilter {
            station_id: Some("berlin".into()),
            event_types: None,
        };
        assert!(filter.matches(&booking_at("berlin")));
        assert!(!filter.matches(&booking_at("potsdam")));
        assert!(filter.matches(&global_invalidation()));
    }

    #[test]
    fn event_type_filter() {
        let filter = EventFilter {
            station_id: None,
            event_types: Some("review_created, stations_invalidated".into()),
        };
        assert!(!filter.matches(&booking_at("berlin")));
        assert!(filter.matches(&global_invalidation()));
    }
}
