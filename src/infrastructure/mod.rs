//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod location_store;
pub mod places;

pub use database::{init_database, migrate, DatabaseConfig, SeaOrmRepositoryProvider};
pub use location_store::LocationStore;
pub use places::{GooglePlacesClient, GooglePlacesConfig};
