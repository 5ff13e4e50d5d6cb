//! SeaORM implementation of ReviewRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::db_err;
use crate::domain::review::{Rating, Review, ReviewRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::review;

pub struct SeaOrmReviewRepository {
    db: DatabaseConnection,
}

impl SeaOrmReviewRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: review::Model) -> DomainResult<Review> {
    let rating =
        Rating::new(m.rating).map_err(|e| DomainError::Storage(format!("review {}: {}", m.id, e)))?;
    Ok(Review {
        id: m.id,
        user_id: m.user_id,
        station_id: m.station_id,
        booking_id: m.booking_id,
        rating,
        comment: m.comment,
        created_at: m.created_at,
    })
}

#[async_trait]
impl ReviewRepository for SeaOrmReviewRepository {
    async fn save(&self, r: Review) -> DomainResult<()> {
        debug!("Saving review {} for station {}", r.id, r.station_id);

        let model = review::ActiveModel {
            id: Set(r.id),
            user_id: Set(r.user_id),
            station_id: Set(r.station_id),
            booking_id: Set(r.booking_id),
            rating: Set(r.rating.value() as i32),
            comment: Set(r.comment),
            created_at: Set(r.created_at),
        };
        model.insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_for_station(&self, station_id: &str) -> DomainResult<Vec<Review>> {
        let models = review::Entity::find()
            .filter(review::Column::StationId.eq(station_id))
            .order_by_desc(review::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(model_to_domain).collect()
    }
}
