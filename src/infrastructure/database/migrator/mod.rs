//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_stations;
mod m20250101_000002_create_station_connectors;
mod m20250101_000003_create_auth_users;
mod m20250101_000004_create_profiles;
mod m20250101_000005_create_bookings;
mod m20250101_000006_create_reviews;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_stations::Migration),
            Box::new(m20250101_000002_create_station_connectors::Migration),
            Box::new(m20250101_000003_create_auth_users::Migration),
            Box::new(m20250101_000004_create_profiles::Migration),
            Box::new(m20250101_000005_create_bookings::Migration),
            Box::new(m20250101_000006_create_reviews::Migration),
        ]
    }
}
