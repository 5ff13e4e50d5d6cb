//! Booking form options, quotes and booking creation

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
