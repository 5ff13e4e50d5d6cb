//! Booking submission
//!
//! A complete form is turned into a single pending booking on the first
//! connector of the requested type that is free for the whole window.
//! Creation is serialized per connector inside the process; the unique
//! slot index catches duplicates from other processes.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::events::{BookingCreatedEvent, Event, SharedEventBus, StationsInvalidatedEvent};
use super::stations::StationService;
use crate::domain::booking::{
    Booking, BookingFlow, BookingForm, BookingStatus, CompleteForm, PricingPolicy, SessionDuration,
};
use crate::domain::station::{Connector, StationWithConnectors};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};

/// Price and times for a form, without booking anything
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub station_id: String,
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration: SessionDuration,
    pub price_per_kwh: f64,
    pub draw_kw: f64,
    pub estimated_price: f64,
}

#[derive(Debug, Clone)]
pub struct BookingConfirmation {
    pub booking: Booking,
    pub connector: Connector,
}

pub struct BookingService {
    repos: Arc<dyn RepositoryProvider>,
    stations: Arc<StationService>,
    events: SharedEventBus,
    pricing: PricingPolicy,
    connector_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl BookingService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        stations: Arc<StationService>,
        events: SharedEventBus,
        pricing: PricingPolicy,
    ) -> Self {
        Self {
            repos,
            stations,
            events,
            pricing,
            connector_locks: DashMap::new(),
        }
    }

    pub fn pricing(&self) -> PricingPolicy {
        self.pricing
    }

    fn quote_for(&self, station: &StationWithConnectors, form: &CompleteForm) -> Quote {
        Quote {
            station_id: station.station.id.clone(),
            booking_date: form.date,
            start_time: form.start_time,
            end_time: form.end_time,
            duration: form.duration,
            price_per_kwh: station.station.price_per_kwh,
            draw_kw: self.pricing.draw_for(&form.vehicle_type),
            estimated_price: self.pricing.estimate(
                station.station.price_per_kwh,
                form.duration,
                &form.vehicle_type,
            ),
        }
    }

    pub async fn quote(&self, form: &BookingForm, today: NaiveDate) -> DomainResult<Quote> {
        let station = self.stations.get(&form.station_id).await?;
        let complete = form.complete(today)?;
        Ok(self.quote_for(&station, &complete))
    }

    pub async fn my_bookings(&self, user_id: &str) -> DomainResult<Vec<Booking>> {
        self.repos.bookings().find_for_user(user_id).await
    }

    /// Run the submission state machine for one form.
    pub async fn create(
        &self,
        user_id: &str,
        form: BookingForm,
        today: NaiveDate,
    ) -> DomainResult<BookingConfirmation> {
        let station = self.stations.get(&form.station_id).await?;

        let mut flow = BookingFlow::new();
        let complete = flow.begin_submit(&form, &station, today)?;

        match self.submit(user_id, &station, &complete).await {
            Ok(confirmation) => {
                flow.confirm(confirmation.booking.id.clone());
                Ok(confirmation)
            }
            Err(e) => {
                flow.fail(e.to_string());
                if let Some(reason) = flow.take_error() {
                    warn!(
                        user_id,
                        station_id = %station.station.id,
                        reason = %reason,
                        "Booking submission failed"
                    );
                }
                Err(e)
            }
        }
    }

    async fn submit(
        &self,
        user_id: &str,
        station: &StationWithConnectors,
        form: &CompleteForm,
    ) -> DomainResult<BookingConfirmation> {
        let quote = self.quote_for(station, form);

        for connector in station.bookable_connectors(form.connector_type) {
            let lock = self
                .connector_locks
                .entry(connector.id.clone())
                .or_default()
                .clone();
            let _guard = lock.lock().await;

            let holding = self
                .repos
                .bookings()
                .find_holding_for_connector_on(&connector.id, form.date)
                .await?;
            if holding
                .iter()
                .any(|b| b.overlaps(form.date, form.start_time, form.end_time))
            {
                debug!(connector_id = %connector.id, "Connector already booked for window");
                continue;
            }

            let now = Utc::now();
            let booking = Booking {
                id: uuid::Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                station_id: station.station.id.clone(),
                connector_id: connector.id.clone(),
                booking_date: form.date,
                start_time: form.start_time,
                end_time: form.end_time,
                duration_hours: form.duration.hours(),
                total_price: quote.estimated_price,
                status: BookingStatus::Pending,
                special_requests: form.special_requests.clone(),
                created_at: now,
                updated_at: now,
            };

            match self.repos.bookings().save(booking.clone()).await {
                Ok(()) => {}
                Err(DomainError::Conflict(detail)) => {
                    debug!(
                        connector_id = %connector.id,
                        detail = %detail,
                        "Slot taken by another writer"
                    );
                    continue;
                }
                Err(e) => return Err(e),
            }

            self.after_create(&booking);
            return Ok(BookingConfirmation {
                booking,
                connector: connector.clone(),
            });
        }

        Err(DomainError::Conflict(format!(
            "No {} connector is free on {} from {} to {}",
            form.connector_type,
            form.date,
            form.start_time.format("%H:%M"),
            form.end_time.format("%H:%M"),
        )))
    }

    fn after_create(&self, booking: &Booking) {
        info!(
            booking_id = %booking.id,
            station_id = %booking.station_id,
            connector_id = %booking.connector_id,
            date = %booking.booking_date,
            total_price = booking.total_price,
            "Booking created"
        );
        metrics::counter!("bookings_created_total").increment(1);

        self.stations.invalidate();
        let now = Utc::now();
        self.events.publish(Event::BookingCreated(BookingCreatedEvent {
            booking_id: booking.id.clone(),
            user_id: booking.user_id.clone(),
            station_id: booking.station_id.clone(),
            connector_id: booking.connector_id.clone(),
            booking_date: booking.booking_date,
            start_time: booking.start_time.format("%H:%M").to_string(),
            end_time: booking.end_time.format("%H:%M").to_string(),
            timestamp: now,
        }));
        self.events
            .publish(Event::StationsInvalidated(StationsInvalidatedEvent {
                station_id: Some(booking.station_id.clone()),
                reason: "booking_created".into(),
                timestamp: now,
            }));
    }
}
