pub mod entities;
pub mod migrator;
pub mod repositories;

pub use repositories::SeaOrmRepositoryProvider;

use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use migrator::Migrator;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// e.g. `sqlite://./evcharge.db?mode=rwc`
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./evcharge.db?mode=rwc".to_string(),
        }
    }
}

impl DatabaseConfig {
    pub fn sqlite(path: &str) -> Self {
        Self {
            url: format!("sqlite://{}?mode=rwc", path),
        }
    }
}

pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    info!("Connecting to database: {}", config.url);
    let db = Database::connect(&config.url).await?;
    info!("Database connected successfully");
    Ok(db)
}

/// Apply pending migrations
pub async fn migrate(db: &DatabaseConnection) -> Result<(), DbErr> {
    Migrator::up(db, None).await?;
    info!("Database migrations applied");
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

/// Insert station `id` priced at 0.45 with connectors `<id>-c1` (CCS 50 kW)
/// and `<id>-c2` (Type 2 22 kW)
#[cfg(test)]
pub(crate) async fn seed_station(db: &DatabaseConnection, id: &str) {
    use crate::domain::station::{Connector, ConnectorType, Station, StationRepository};
    use repositories::station_repository::SeaOrmStationRepository;

    let repo = SeaOrmStationRepository::new(db.clone());
    repo.save(Station::new(id, format!("Station {}", id), "1 Test Road", 52.52, 13.405, 0.45))
        .await
        .unwrap();
    repo.save_connector(Connector::new(format!("{}-c1", id), id, ConnectorType::Ccs, 50.0))
        .await
        .unwrap();
    repo.save_connector(Connector::new(format!("{}-c2", id), id, ConnectorType::Type2, 22.0))
        .await
        .unwrap();
}
