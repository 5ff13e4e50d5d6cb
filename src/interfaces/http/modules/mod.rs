pub mod auth;
pub mod bookings;
pub mod health;
pub mod location;
pub mod metrics;
pub mod profiles;
pub mod request_id;
pub mod reviews;
pub mod stations;
