//! Outbound ports
//!
//! Interfaces the application needs from the outside world. The production
//! places client lives in `infrastructure::places`.

mod places;

pub use places::{
    NearbyQuery, PlaceResult, PlacesClient, PlacesError, PlacesResponse, STATUS_OK,
    STATUS_ZERO_RESULTS,
};
