//! User positions
//!
//! Client-reported fixes and the browser-style geolocation failures a
//! client may report instead.

mod error;
mod model;

pub use error::GeolocationError;
pub use model::{LastKnownLocation, PositionReport};
