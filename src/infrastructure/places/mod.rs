//! Places search backends

mod google;

pub use google::{GooglePlacesClient, GooglePlacesConfig, DEFAULT_BASE_URL};
