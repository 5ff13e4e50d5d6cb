//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::booking::BookingRepository;
use crate::domain::profile::ProfileRepository;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::review::ReviewRepository;
use crate::domain::station::StationRepository;
use crate::domain::user::UserRepository;

use super::booking_repository::SeaOrmBookingRepository;
use super::profile_repository::SeaOrmProfileRepository;
use super::review_repository::SeaOrmReviewRepository;
use super::station_repository::SeaOrmStationRepository;
use super::user_repository::SeaOrmUserRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
pub struct SeaOrmRepositoryProvider {
    stations: SeaOrmStationRepository,
    bookings: SeaOrmBookingRepository,
    profiles: SeaOrmProfileRepository,
    reviews: SeaOrmReviewRepository,
    users: SeaOrmUserRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            stations: SeaOrmStationRepository::new(db.clone()),
            bookings: SeaOrmBookingRepository::new(db.clone()),
            profiles: SeaOrmProfileRepository::new(db.clone()),
            reviews: SeaOrmReviewRepository::new(db.clone()),
            users: SeaOrmUserRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn stations(&self) -> &dyn StationRepository {
        &self.stations
    }

    fn bookings(&self) -> &dyn BookingRepository {
        &self.bookings
    }

    fn profiles(&self) -> &dyn ProfileRepository {
        &self.profiles
    }

    fn reviews(&self) -> &dyn ReviewRepository {
        &self.reviews
    }

    fn users(&self) -> &dyn UserRepository {
        &self.users
    }
}
