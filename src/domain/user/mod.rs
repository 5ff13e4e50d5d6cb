//! Auth identity aggregate
//!
//! Login credentials. Each user has exactly one profile with the same id.

pub mod model;
pub mod repository;

mod dto_create;

pub use dto_create::CreateUserDto;
pub use model::AuthUser;
pub use repository::UserRepository;
