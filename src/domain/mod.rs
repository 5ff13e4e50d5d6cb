//! Domain layer: entities, value objects and repository interfaces

pub mod booking;
pub mod geo;
pub mod location;
pub mod profile;
pub mod repositories;
pub mod review;
pub mod station;
pub mod user;

pub use booking::{Booking, BookingStatus};
pub use geo::Coordinates;
pub use profile::Profile;
pub use repositories::{DomainResult, RepositoryProvider};
pub use review::Review;
pub use station::{Connector, ConnectorType, Station, StationWithConnectors};
pub use user::AuthUser;

pub use crate::shared::errors::DomainError;
