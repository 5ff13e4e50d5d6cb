//! Booking aggregate
//!
//! The booking entity, the multi-step booking form, the submission state
//! machine, price estimation and the repository interface.

pub mod flow;
pub mod form;
pub mod model;
pub mod pricing;
pub mod repository;

pub use flow::{BookingFlow, BookingPhase};
pub use form::{BookingForm, CompleteForm, SessionDuration, TimeSlot, VehicleType};
pub use model::{Booking, BookingStatus};
pub use pricing::PricingPolicy;
pub use repository::BookingRepository;
