//! Station reviews

mod model;
mod repository;

pub use model::{aggregate_rating, Rating, Review};
pub use repository::ReviewRepository;
