use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::{BookingConfirmation, Quote};
use crate::domain::booking::{Booking, BookingForm, SessionDuration, TimeSlot, VehicleType};
use crate::domain::station::ConnectorType;
use crate::interfaces::http::modules::stations::ConnectorDto;
use crate::shared::errors::DomainError;

const TIME_FORMAT: &str = "%H:%M";

/// The booking form as submitted. Every selection is optional on the wire so
/// an incomplete form is reported by name rather than as a parse error.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BookingFormRequest {
    pub station_id: String,
    /// `YYYY-MM-DD`
    pub booking_date: Option<String>,
    /// 12-hour slot, e.g. `01:00 PM`
    pub time_slot: Option<String>,
    /// 30, 60, 90 or 120; default 30
    pub duration_minutes: Option<u32>,
    pub vehicle_type: Option<String>,
    pub connector_type: Option<String>,
    pub special_requests: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl BookingFormRequest {
    pub fn to_form(&self) -> Result<BookingForm, DomainError> {
        let mut form = BookingForm::for_station(self.station_id.trim());

        form.date = present(&self.booking_date)
            .map(|d| {
                NaiveDate::parse_from_str(d, "%Y-%m-%d").map_err(|_| {
                    DomainError::Validation(format!("booking_date must be YYYY-MM-DD (got {})", d))
                })
            })
            .transpose()?;
        form.time_slot = present(&self.time_slot)
            .map(str::parse::<TimeSlot>)
            .transpose()?;
        if let Some(minutes) = self.duration_minutes {
            form.duration = SessionDuration::from_minutes(minutes)?;
        }
        form.vehicle_type = present(&self.vehicle_type).map(VehicleType::new).transpose()?;
        form.connector_type = present(&self.connector_type)
            .map(str::parse::<ConnectorType>)
            .transpose()?;
        form.special_requests = self.special_requests.clone();

        Ok(form)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingDto {
    pub id: String,
    pub user_id: String,
    pub station_id: String,
    pub connector_id: String,
    pub booking_date: String,
    /// 24-hour `HH:MM`
    pub start_time: String,
    pub end_time: String,
    pub duration_hours: f64,
    pub total_price: f64,
    pub status: String,
    pub special_requests: Option<String>,
    pub created_at: String,
}

impl From<Booking> for BookingDto {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            user_id: b.user_id,
            station_id: b.station_id,
            connector_id: b.connector_id,
            booking_date: b.booking_date.to_string(),
            start_time: b.start_time.format(TIME_FORMAT).to_string(),
            end_time: b.end_time.format(TIME_FORMAT).to_string(),
            duration_hours: b.duration_hours,
            total_price: b.total_price,
            status: b.status.to_string(),
            special_requests: b.special_requests,
            created_at: b.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingConfirmationDto {
    pub booking: BookingDto,
    pub connector: ConnectorDto,
}

impl From<BookingConfirmation> for BookingConfirmationDto {
    fn from(c: BookingConfirmation) -> Self {
        Self {
            booking: c.booking.into(),
            connector: c.connector.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuoteDto {
    pub station_id: String,
    pub booking_date: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: u32,
    pub price_per_kwh: f64,
    pub draw_kw: f64,
    pub estimated_price: f64,
}

impl From<Quote> for QuoteDto {
    fn from(q: Quote) -> Self {
        Self {
            station_id: q.station_id,
            booking_date: q.booking_date.to_string(),
            start_time: q.start_time.format(TIME_FORMAT).to_string(),
            end_time: q.end_time.format(TIME_FORMAT).to_string(),
            duration_minutes: q.duration.minutes(),
            price_per_kwh: q.price_per_kwh,
            draw_kw: q.draw_kw,
            estimated_price: q.estimated_price,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DurationOption {
    pub minutes: u32,
    pub label: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingOptionsDto {
    pub time_slots: Vec<String>,
    pub durations: Vec<DurationOption>,
    pub default_duration_minutes: u32,
    pub connector_types: Vec<String>,
    pub default_draw_kw: f64,
    pub tesla_draw_kw: f64,
}
