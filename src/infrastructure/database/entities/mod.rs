//! Database entities module

pub mod auth_user;
pub mod booking;
pub mod profile;
pub mod review;
pub mod station;
pub mod station_connector;

pub use auth_user::Entity as AuthUser;
pub use booking::Entity as Booking;
pub use profile::Entity as Profile;
pub use review::Entity as Review;
pub use station::Entity as Station;
pub use station_connector::Entity as StationConnector;
