//! Repository access for the domain layer
//!
//! `RepositoryProvider` hands out the per-aggregate repositories; consumers
//! ask only for the one they need:
//!
//! ```ignore
//! async fn handle(repos: &dyn RepositoryProvider) {
//!     let station = repos.stations().find_by_id("st-1").await?;
//!     let bookings = repos.bookings().find_for_user("u-1").await?;
//! }
//! ```

use super::booking::BookingRepository;
use super::profile::ProfileRepository;
use super::review::ReviewRepository;
use super::station::StationRepository;
use super::user::UserRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

pub trait RepositoryProvider: Send + Sync {
    fn stations(&self) -> &dyn StationRepository;
    fn bookings(&self) -> &dyn BookingRepository;
    fn profiles(&self) -> &dyn ProfileRepository;
    fn reviews(&self) -> &dyn ReviewRepository;
    fn users(&self) -> &dyn UserRepository;
}
