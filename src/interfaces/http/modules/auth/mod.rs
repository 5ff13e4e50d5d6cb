//! Sign-up, login and the current identity

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
