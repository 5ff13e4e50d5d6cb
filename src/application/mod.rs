//! Application layer: use-case services over the domain

pub mod bookings;
pub mod events;
pub mod identity;
pub mod location;
pub mod nearby;
pub mod ports;
pub mod reviews;
pub mod stations;

pub use bookings::{BookingConfirmation, BookingService, Quote};
pub use events::{create_event_bus, Event, EventBus, EventSubscriber, SharedEventBus};
pub use identity::{AuthResult, IdentityService, SignUp};
pub use location::LocationService;
pub use nearby::{NearbyOutcome, NearbyService};
pub use ports::{PlacesClient, PlacesError};
pub use reviews::{NewReview, ReviewService};
pub use stations::{CatalogEntry, ListedStation, Proximity, StationQuery, StationService};
