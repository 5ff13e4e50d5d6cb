//! User profile aggregate

mod model;
mod repository;

pub use model::{Profile, ProfileUpdate};
pub use repository::ProfileRepository;
