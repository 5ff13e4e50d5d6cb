//! SeaORM implementation of StationRepository

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use super::db_err;
use crate::domain::station::{Connector, ConnectorType, Station, StationRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{station, station_connector};

pub struct SeaOrmStationRepository {
    db: DatabaseConnection,
}

impl SeaOrmStationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn station_to_domain(m: station::Model) -> Station {
    Station {
        id: m.id,
        name: m.name,
        address: m.address,
        latitude: m.latitude,
        longitude: m.longitude,
        price_per_kwh: m.price_per_kwh,
        available: m.available,
        rating: m.rating,
        total_reviews: m.total_reviews,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn connector_to_domain(m: station_connector::Model) -> DomainResult<Connector> {
    let connector_type: ConnectorType = m.connector_type.parse().map_err(|_| {
        DomainError::Storage(format!(
            "connector {} has unknown type {:?}",
            m.id, m.connector_type
        ))
    })?;
    Ok(Connector {
        id: m.id,
        station_id: m.station_id,
        connector_type,
        power_output: m.power_output,
        available: m.available,
        created_at: m.created_at,
    })
}

fn station_to_active(s: Station) -> station::ActiveModel {
    station::ActiveModel {
        id: Set(s.id),
        name: Set(s.name),
        address: Set(s.address),
        latitude: Set(s.latitude),
        longitude: Set(s.longitude),
        price_per_kwh: Set(s.price_per_kwh),
        available: Set(s.available),
        rating: Set(s.rating),
        total_reviews: Set(s.total_reviews),
        created_at: Set(s.created_at),
        updated_at: Set(s.updated_at),
    }
}

fn connector_to_active(c: Connector) -> station_connector::ActiveModel {
    station_connector::ActiveModel {
        id: Set(c.id),
        station_id: Set(c.station_id),
        connector_type: Set(c.connector_type.as_str().to_string()),
        power_output: Set(c.power_output),
        available: Set(c.available),
        created_at: Set(c.created_at),
    }
}

fn connectors_to_domain(models: Vec<station_connector::Model>) -> DomainResult<Vec<Connector>> {
    models.into_iter().map(connector_to_domain).collect()
}

// ── StationRepository impl ──────────────────────────────────────

#[async_trait]
impl StationRepository for SeaOrmStationRepository {
    async fn find_all(&self) -> DomainResult<Vec<Station>> {
        let models = station::Entity::find()
            .order_by_asc(station::Column::Name)
            .order_by_asc(station::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(station_to_domain).collect())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Station>> {
        let model = station::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(station_to_domain))
    }

    async fn find_all_connectors(&self) -> DomainResult<Vec<Connector>> {
        let models = station_connector::Entity::find()
            .order_by_asc(station_connector::Column::CreatedAt)
            .order_by_asc(station_connector::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        connectors_to_domain(models)
    }

    async fn find_connectors_for_station(&self, station_id: &str) -> DomainResult<Vec<Connector>> {
        let models = station_connector::Entity::find()
            .filter(station_connector::Column::StationId.eq(station_id))
            .order_by_asc(station_connector::Column::CreatedAt)
            .order_by_asc(station_connector::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        connectors_to_domain(models)
    }

    async fn save(&self, s: Station) -> DomainResult<()> {
        debug!("Saving station: {}", s.id);
        station_to_active(s).insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn save_connector(&self, c: Connector) -> DomainResult<()> {
        debug!("Saving connector {} for station {}", c.id, c.station_id);
        connector_to_active(c).insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn save_with_connectors(
        &self,
        s: Station,
        connectors: Vec<Connector>,
    ) -> DomainResult<()> {
        debug!("Saving station {} with {} connectors", s.id, connectors.len());

        let txn = self.db.begin().await.map_err(db_err)?;
        let inserted = async {
            station_to_active(s).insert(&txn).await?;
            for c in connectors {
                connector_to_active(c).insert(&txn).await?;
            }
            Ok::<_, sea_orm::DbErr>(())
        }
        .await;

        match inserted {
            Ok(()) => txn.commit().await.map_err(db_err),
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    debug!("Rollback after failed station insert failed: {}", rollback);
                }
                Err(db_err(e))
            }
        }
    }

    async fn update_rating(
        &self,
        station_id: &str,
        rating: f64,
        total_reviews: i32,
    ) -> DomainResult<()> {
        debug!(
            "Updating rating of station {}: {} over {} reviews",
            station_id, rating, total_reviews
        );

        let existing = station::Entity::find_by_id(station_id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Station", "id", station_id))?;

        let mut model: station::ActiveModel = existing.into();
        model.rating = Set(rating);
        model.total_reviews = Set(total_reviews);
        model.updated_at = Set(Utc::now());
        model.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::test_db;

    #[tokio::test]
    async fn stations_are_listed_by_name() {
        let db = test_db().await;
        let repo = SeaOrmStationRepository::new(db);

        repo.save(Station::new("b", "Zeta Park", "1 Road", 1.0, 1.0, 0.3))
            .await
            .unwrap();
        repo.save(Station::new("a", "Alpha Hub", "2 Road", 2.0, 2.0, 0.5))
            .await
            .unwrap();

        let names: Vec<String> = repo
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Alpha Hub", "Zeta Park"]);
    }

    #[tokio::test]
    async fn connectors_round_trip_with_type_labels() {
        let db = test_db().await;
        let repo = SeaOrmStationRepository::new(db);
        repo.save(Station::new("s1", "Hub", "Road", 0.0, 0.0, 0.4))
            .await
            .unwrap();
        repo.save_connector(Connector::new("c1", "s1", ConnectorType::Chademo, 50.0))
            .await
            .unwrap();
        repo.save_connector(Connector::new("c2", "s1", ConnectorType::Type2, 22.0))
            .await
            .unwrap();

        let connectors = repo.find_connectors_for_station("s1").await.unwrap();
        assert_eq!(connectors.len(), 2);
        assert!(connectors
            .iter()
            .any(|c| c.id == "c1" && c.connector_type == ConnectorType::Chademo));
        assert!(repo.find_connectors_for_station("nope").await.unwrap().is_empty());
        assert_eq!(repo.find_all_connectors().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_rating_overwrites_aggregate() {
        let db = test_db().await;
        let repo = SeaOrmStationRepository::new(db);
        repo.save(Station::new("s1", "Hub", "Road", 0.0, 0.0, 0.4))
            .await
            .unwrap();

        repo.update_rating("s1", 4.5, 2).await.unwrap();
        let s = repo.find_by_id("s1").await.unwrap().unwrap();
        assert_eq!(s.rating, 4.5);
        assert_eq!(s.total_reviews, 2);

        let err = repo.update_rating("missing", 1.0, 1).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn failed_connector_insert_rolls_back_station() {
        let db = test_db().await;
        let repo = SeaOrmStationRepository::new(db);

        let err = repo
            .save_with_connectors(
                Station::new("s1", "Hub", "Road", 0.0, 0.0, 0.4),
                vec![
                    Connector::new("same", "s1", ConnectorType::Ccs, 50.0),
                    Connector::new("same", "s1", ConnectorType::Type2, 22.0),
                ],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert!(repo.find_by_id("s1").await.unwrap().is_none());
        assert!(repo.find_all_connectors().await.unwrap().is_empty());

        repo.save_with_connectors(
            Station::new("s1", "Hub", "Road", 0.0, 0.0, 0.4),
            vec![
                Connector::new("s1_1", "s1", ConnectorType::Ccs, 50.0),
                Connector::new("s1_2", "s1", ConnectorType::Type2, 22.0),
            ],
        )
        .await
        .unwrap();
        assert_eq!(repo.find_connectors_for_station("s1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn duplicate_station_id_is_conflict() {
        let db = test_db().await;
        let repo = SeaOrmStationRepository::new(db);
        repo.save(Station::new("s1", "Hub", "Road", 0.0, 0.0, 0.4))
            .await
            .unwrap();
        let err = repo
            .save(Station::new("s1", "Other", "Road", 0.0, 0.0, 0.4))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }
}
