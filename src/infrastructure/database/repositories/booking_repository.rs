//! SeaORM implementation of BookingRepository

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::db_err;
use crate::domain::booking::{Booking, BookingRepository, BookingStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::booking;

const TIME_FORMAT: &str = "%H:%M";

pub struct SeaOrmBookingRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn parse_time(id: &str, value: &str) -> DomainResult<NaiveTime> {
    NaiveTime::parse_from_str(value, TIME_FORMAT).map_err(|e| {
        DomainError::Storage(format!("booking {} has bad time {:?}: {}", id, value, e))
    })
}

fn model_to_domain(m: booking::Model) -> DomainResult<Booking> {
    let start_time = parse_time(&m.id, &m.start_time)?;
    let end_time = parse_time(&m.id, &m.end_time)?;
    let status: BookingStatus = m
        .status
        .parse()
        .map_err(|e: DomainError| DomainError::Storage(e.to_string()))?;

    Ok(Booking {
        id: m.id,
        user_id: m.user_id,
        station_id: m.station_id,
        connector_id: m.connector_id,
        booking_date: m.booking_date,
        start_time,
        end_time,
        duration_hours: m.duration_hours,
        total_price: m.total_price,
        status,
        special_requests: m.special_requests,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn models_to_domain(models: Vec<booking::Model>) -> DomainResult<Vec<Booking>> {
    models.into_iter().map(model_to_domain).collect()
}

// ── BookingRepository impl ──────────────────────────────────────

#[async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn save(&self, b: Booking) -> DomainResult<()> {
        debug!(
            "Saving booking {} on connector {} at {} {}",
            b.id, b.connector_id, b.booking_date, b.start_time
        );

        let model = booking::ActiveModel {
            id: Set(b.id),
            user_id: Set(b.user_id),
            station_id: Set(b.station_id),
            connector_id: Set(b.connector_id),
            booking_date: Set(b.booking_date),
            start_time: Set(b.start_time.format(TIME_FORMAT).to_string()),
            end_time: Set(b.end_time.format(TIME_FORMAT).to_string()),
            duration_hours: Set(b.duration_hours),
            total_price: Set(b.total_price),
            status: Set(b.status.as_str().to_string()),
            special_requests: Set(b.special_requests),
            created_at: Set(b.created_at),
            updated_at: Set(b.updated_at),
        };
        model.insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Booking>> {
        let model = booking::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(model_to_domain).transpose()
    }

    async fn find_for_user(&self, user_id: &str) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::UserId.eq(user_id))
            .order_by_desc(booking::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn find_all(&self) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .order_by_desc(booking::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn find_holding_for_connector_on(
        &self,
        connector_id: &str,
        date: NaiveDate,
    ) -> DomainResult<Vec<Booking>> {
        let models = booking::Entity::find()
            .filter(booking::Column::ConnectorId.eq(connector_id))
            .filter(booking::Column::BookingDate.eq(date))
            .filter(
                booking::Column::Status.is_in([
                    BookingStatus::Pending.as_str(),
                    BookingStatus::Confirmed.as_str(),
                ]),
            )
            .order_by_asc(booking::Column::StartTime)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }
}
